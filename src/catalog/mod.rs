//! Workload Catalog
//!
//! Static description of what gets simulated: named workloads, each either a
//! list of independent operations ([`WorkloadSpec::Simple`]) or a list of
//! fused pipelines ([`WorkloadSpec::Composite`]).
//!
//! ## Ordering
//!
//! ```text
//! WorkloadCatalog (insertion order)
//!   ├── Workload "Matmul"  ── Simple    ──< WorkloadEntry
//!   └── Workload "ResNet"  ── Composite ──< CompositeStage ──< WorkloadEntry
//! ```
//!
//! Iteration order is the order workloads were added. Downstream comparison
//! against reference data is positional, so this order is part of the contract.
//!
//! ## Usage
//!
//! ```rust
//! use sim_harness::catalog::{WorkloadCatalog, WorkloadSpec};
//!
//! let mut catalog = WorkloadCatalog::new();
//! catalog.push(
//!     "Softmax",
//!     WorkloadSpec::simple("Softmax", [vec![8, 4096], vec![8, 1024]]),
//! )?;
//!
//! let spec = catalog.entries_for("Softmax").unwrap();
//! assert_eq!(spec.invocation_count(), 2);
//! # Ok::<(), sim_harness::Error>(())
//! ```

mod alias;
pub mod builtin;
mod file;

pub use alias::AliasTable;
pub use file::CatalogFile;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Dimension counts the simulator input format accepts.
pub const SUPPORTED_DIM_COUNTS: [usize; 3] = [2, 3, 4];

/// One operation with concrete shape parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadEntry {
    name: String,
    dims: Vec<u64>,
}

impl WorkloadEntry {
    /// Create a new entry.
    ///
    /// The dimension count is not checked here; encoding rejects counts
    /// outside [`SUPPORTED_DIM_COUNTS`] so the failure is recorded per item.
    #[must_use]
    pub fn new(name: impl Into<String>, dims: Vec<u64>) -> Self {
        Self {
            name: name.into(),
            dims,
        }
    }

    /// Operation name as written in the catalog (before alias resolution).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shape parameters.
    #[must_use]
    pub fn dims(&self) -> &[u64] {
        &self.dims
    }

    /// Whether the dimension count fits the simulator input format.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        SUPPORTED_DIM_COUNTS.contains(&self.dims.len())
    }

    /// Dimensions as a parenthesized tuple, e.g. `(4096, 320, 320)`.
    #[must_use]
    pub fn dims_text(&self) -> String {
        let parts: Vec<String> = self.dims.iter().map(ToString::to_string).collect();
        format!("({})", parts.join(", "))
    }
}

/// Operations fused into a single timed unit.
///
/// Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<WorkloadEntry>", into = "Vec<WorkloadEntry>")]
pub struct CompositeStage {
    entries: Vec<WorkloadEntry>,
}

impl CompositeStage {
    /// Create a stage from its operations, in pipeline order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `entries` is empty.
    pub fn new(entries: Vec<WorkloadEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::Config(
                "composite stage must contain at least one operation".to_string(),
            ));
        }
        Ok(Self { entries })
    }

    /// Operations in pipeline order.
    #[must_use]
    pub fn entries(&self) -> &[WorkloadEntry] {
        &self.entries
    }

    /// Number of fused operations (the simulator's `-c` value).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<Vec<WorkloadEntry>> for CompositeStage {
    type Error = Error;

    fn try_from(entries: Vec<WorkloadEntry>) -> Result<Self> {
        Self::new(entries)
    }
}

impl From<CompositeStage> for Vec<WorkloadEntry> {
    fn from(stage: CompositeStage) -> Self {
        stage.entries
    }
}

/// How a workload is submitted to the simulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkloadSpec {
    /// Each entry is simulated on its own (`-c 1`).
    Simple(Vec<WorkloadEntry>),
    /// Each stage is simulated as one fused pipeline (`-c <stage length>`).
    Composite(Vec<CompositeStage>),
}

impl WorkloadSpec {
    /// Build a simple workload where every entry shares the operation `name`.
    #[must_use]
    pub fn simple<I>(name: &str, dims: I) -> Self
    where
        I: IntoIterator<Item = Vec<u64>>,
    {
        Self::Simple(
            dims.into_iter()
                .map(|d| WorkloadEntry::new(name, d))
                .collect(),
        )
    }

    /// Number of simulator invocations this workload produces.
    #[must_use]
    pub fn invocation_count(&self) -> usize {
        match self {
            Self::Simple(entries) => entries.len(),
            Self::Composite(stages) => stages.len(),
        }
    }

    /// Whether this is a fused-pipeline workload.
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(self, Self::Composite(_))
    }
}

/// A named workload in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    name: String,
    spec: WorkloadSpec,
}

impl Workload {
    /// Workload kind name, e.g. `Matmul`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// What to simulate.
    #[must_use]
    pub const fn spec(&self) -> &WorkloadSpec {
        &self.spec
    }
}

/// Ordered mapping from workload name to [`WorkloadSpec`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkloadCatalog {
    workloads: Vec<Workload>,
}

impl WorkloadCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a workload. Names must be unique.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a workload with the same name exists.
    pub fn push(&mut self, name: impl Into<String>, spec: WorkloadSpec) -> Result<()> {
        let name = name.into();
        if self.entries_for(&name).is_some() {
            return Err(Error::Config(format!("duplicate workload '{name}'")));
        }
        self.workloads.push(Workload { name, spec });
        Ok(())
    }

    /// Look up a workload by name.
    #[must_use]
    pub fn entries_for(&self, name: &str) -> Option<&WorkloadSpec> {
        self.workloads
            .iter()
            .find(|w| w.name == name)
            .map(|w| &w.spec)
    }

    /// Workloads in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Workload> {
        self.workloads.iter()
    }

    /// Workload names in insertion order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.workloads.iter().map(|w| w.name.as_str()).collect()
    }

    /// Number of workloads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.workloads.len()
    }

    /// Whether the catalog has no workloads.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workloads.is_empty()
    }

    /// Total number of simulator invocations a full pass makes.
    #[must_use]
    pub fn invocation_count(&self) -> usize {
        self.workloads
            .iter()
            .map(|w| w.spec.invocation_count())
            .sum()
    }
}

impl<'a> IntoIterator for &'a WorkloadCatalog {
    type Item = &'a Workload;
    type IntoIter = std::slice::Iter<'a, Workload>;

    fn into_iter(self) -> Self::IntoIter {
        self.workloads.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dims_text_matches_tuple_format() {
        let entry = WorkloadEntry::new("Matmul", vec![4096, 320, 320]);
        assert_eq!(entry.dims_text(), "(4096, 320, 320)");
    }

    #[test]
    fn test_well_formed_dim_counts() {
        assert!(!WorkloadEntry::new("Op", vec![1]).is_well_formed());
        assert!(WorkloadEntry::new("Op", vec![1, 2]).is_well_formed());
        assert!(WorkloadEntry::new("Op", vec![1, 2, 3, 4]).is_well_formed());
        assert!(!WorkloadEntry::new("Op", vec![1, 2, 3, 4, 5]).is_well_formed());
    }

    #[test]
    fn test_empty_stage_rejected() {
        assert!(CompositeStage::new(vec![]).is_err());
    }

    #[test]
    fn test_catalog_preserves_insertion_order() {
        let mut catalog = WorkloadCatalog::new();
        catalog
            .push("Softmax", WorkloadSpec::simple("Softmax", [vec![8, 64]]))
            .unwrap();
        catalog
            .push("Conv", WorkloadSpec::simple("Conv", [vec![64, 11520, 1280]]))
            .unwrap();
        catalog
            .push("Activation", WorkloadSpec::simple("Activation", [vec![64, 1280]]))
            .unwrap();
        assert_eq!(catalog.names(), vec!["Softmax", "Conv", "Activation"]);
    }

    #[test]
    fn test_duplicate_workload_rejected() {
        let mut catalog = WorkloadCatalog::new();
        catalog
            .push("Matmul", WorkloadSpec::simple("Matmul", [vec![1, 2, 3]]))
            .unwrap();
        let err = catalog
            .push("Matmul", WorkloadSpec::simple("Matmul", [vec![4, 5, 6]]))
            .unwrap_err();
        assert!(err.to_string().contains("duplicate workload"));
    }

    #[test]
    fn test_invocation_count() {
        let stage = CompositeStage::new(vec![
            WorkloadEntry::new("LayerNorm", vec![32, 64, 1280]),
            WorkloadEntry::new("Activation", vec![64, 1280]),
        ])
        .unwrap();
        let mut catalog = WorkloadCatalog::new();
        catalog
            .push("Matmul", WorkloadSpec::simple("Matmul", [vec![1, 2, 3], vec![4, 5, 6]]))
            .unwrap();
        catalog
            .push("Block", WorkloadSpec::Composite(vec![stage.clone(), stage]))
            .unwrap();
        assert_eq!(catalog.invocation_count(), 4);
        assert!(catalog.entries_for("Block").unwrap().is_composite());
    }
}
