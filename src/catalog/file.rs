//! JSON catalog files
//!
//! The workload kind is an explicit tag rather than inferred from nesting:
//!
//! ```json
//! {
//!   "aliases": { "DotProduct": "Matmul" },
//!   "workloads": [
//!     { "kind": "simple", "name": "Matmul", "dims": [[4096, 320, 320]] },
//!     { "kind": "composite", "name": "ResNet",
//!       "stages": [[["LayerNorm", [32, 64, 1280]], ["Activation", [64, 1280]]]] }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{AliasTable, CompositeStage, WorkloadCatalog, WorkloadEntry, WorkloadSpec};
use crate::Result;

/// One operation inside a composite stage: `[name, dims]`.
type StageOp = (String, Vec<u64>);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum WorkloadDef {
    Simple { name: String, dims: Vec<Vec<u64>> },
    Composite { name: String, stages: Vec<Vec<StageOp>> },
}

/// On-disk form of a catalog plus its alias table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    aliases: AliasTable,
    workloads: Vec<WorkloadDef>,
}

impl CatalogFile {
    /// Read a catalog file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Parse a catalog from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Json`] on malformed input.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Snapshot an in-memory catalog and alias table.
    #[must_use]
    pub fn from_catalog(catalog: &WorkloadCatalog, aliases: &AliasTable) -> Self {
        let workloads = catalog
            .iter()
            .map(|w| match w.spec() {
                WorkloadSpec::Simple(entries) => WorkloadDef::Simple {
                    name: w.name().to_string(),
                    dims: entries.iter().map(|e| e.dims().to_vec()).collect(),
                },
                WorkloadSpec::Composite(stages) => WorkloadDef::Composite {
                    name: w.name().to_string(),
                    stages: stages
                        .iter()
                        .map(|s| {
                            s.entries()
                                .iter()
                                .map(|e| (e.name().to_string(), e.dims().to_vec()))
                                .collect()
                        })
                        .collect(),
                },
            })
            .collect();
        Self {
            aliases: aliases.clone(),
            workloads,
        }
    }

    /// Serialize as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Json`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build the catalog and alias table.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] for duplicate workload names or empty
    /// composite stages.
    pub fn into_parts(self) -> Result<(WorkloadCatalog, AliasTable)> {
        let mut catalog = WorkloadCatalog::new();
        for def in self.workloads {
            match def {
                WorkloadDef::Simple { name, dims } => {
                    let spec = WorkloadSpec::simple(&name, dims);
                    catalog.push(name, spec)?;
                }
                WorkloadDef::Composite { name, stages } => {
                    let stages = stages
                        .into_iter()
                        .map(|ops| {
                            CompositeStage::new(
                                ops.into_iter()
                                    .map(|(op, dims)| WorkloadEntry::new(op, dims))
                                    .collect(),
                            )
                        })
                        .collect::<Result<Vec<_>>>()?;
                    catalog.push(name, WorkloadSpec::Composite(stages))?;
                }
            }
        }
        Ok((catalog, self.aliases))
    }
}
