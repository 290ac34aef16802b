//! Operation-name alias table

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Maps catalog operation names to the names the simulator understands.
///
/// Lookups fall back to the name itself, so an empty table is the identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasTable {
    aliases: BTreeMap<String, String>,
}

impl AliasTable {
    /// Create an empty (identity) table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an alias, returning the table for chaining.
    #[must_use]
    pub fn with(mut self, op: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.aliases.insert(op.into(), canonical.into());
        self
    }

    /// Canonical simulator name for `op`.
    #[must_use]
    pub fn canonical_name<'a>(&'a self, op: &'a str) -> &'a str {
        self.aliases.get(op).map_or(op, String::as_str)
    }

    /// Number of aliases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Whether the table is the identity mapping.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for AliasTable
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            aliases: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_fallback() {
        let table = AliasTable::new();
        assert_eq!(table.canonical_name("Softmax"), "Softmax");
    }

    #[test]
    fn test_alias_lookup() {
        let table = AliasTable::new().with("DotProduct", "Matmul");
        assert_eq!(table.canonical_name("DotProduct"), "Matmul");
        assert_eq!(table.canonical_name("Matmul"), "Matmul");
    }

    #[test]
    fn test_json_is_a_plain_object() {
        let table: AliasTable = serde_json::from_str(r#"{"DotProduct": "Matmul"}"#).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.canonical_name("DotProduct"), "Matmul");
    }
}
