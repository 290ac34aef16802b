//! Built-in TPU v3 evaluation catalog
//!
//! Shapes follow the diffusion-model layer sweep the simulator was validated
//! against: four resolutions per operation, largest first.

use super::{AliasTable, CompositeStage, Workload, WorkloadCatalog, WorkloadEntry, WorkloadSpec};

/// (M, K, N) per resolution for the residual block convolutions.
const RESNET_SHAPES: [(u64, u64, u64); 4] = [
    (4096, 2880, 320),
    (1024, 5760, 640),
    (256, 11520, 1280),
    (64, 11520, 1280),
];

/// Default alias table: `DotProduct` runs on the simulator's matmul unit.
#[must_use]
pub fn default_aliases() -> AliasTable {
    AliasTable::new()
        .with("DotProduct", "Matmul")
        .with("Conv", "Conv")
}

/// The full evaluation catalog, in reference-data order.
#[must_use]
pub fn tpu_v3_catalog() -> WorkloadCatalog {
    let workloads = vec![
        simple(
            "Matmul",
            &[
                &[4096, 320, 320],
                &[1024, 640, 640],
                &[256, 1280, 1280],
                &[64, 1280, 1280],
            ],
        ),
        simple(
            "DotProduct",
            &[
                &[8, 4096, 40, 4096],
                &[8, 1024, 80, 1024],
                &[8, 256, 160, 256],
                &[8, 64, 160, 64],
            ],
        ),
        simple(
            "Conv",
            &[
                &[4096, 2880, 320],
                &[1024, 5760, 640],
                &[256, 11520, 1280],
                &[64, 11520, 1280],
            ],
        ),
        simple("Softmax", &[&[8, 4096], &[8, 1024], &[8, 256], &[8, 64]]),
        Workload {
            name: "ResNet".to_string(),
            spec: WorkloadSpec::Composite(
                RESNET_SHAPES.iter().map(|&s| resnet_stage(s)).collect(),
            ),
        },
        simple(
            "SelfAttention",
            &[
                &[8, 4096, 320, 320],
                &[8, 1024, 640, 640],
                &[8, 256, 1280, 1280],
                &[8, 64, 1280, 1280],
            ],
        ),
    ];
    WorkloadCatalog { workloads }
}

fn simple(name: &str, dims: &[&[u64]]) -> Workload {
    Workload {
        name: name.to_string(),
        spec: WorkloadSpec::simple(name, dims.iter().map(|d| d.to_vec())),
    }
}

/// norm -> conv -> activation, twice.
fn resnet_stage((m, k, n): (u64, u64, u64)) -> CompositeStage {
    let half = [
        WorkloadEntry::new("LayerNorm", vec![32, m, n]),
        WorkloadEntry::new("Conv", vec![m, k, n]),
        WorkloadEntry::new("Activation", vec![m, n]),
    ];
    CompositeStage {
        entries: half.iter().chain(half.iter()).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order() {
        let catalog = tpu_v3_catalog();
        assert_eq!(
            catalog.names(),
            vec!["Matmul", "DotProduct", "Conv", "Softmax", "ResNet", "SelfAttention"]
        );
    }

    #[test]
    fn test_catalog_size_matches_reference() {
        assert_eq!(tpu_v3_catalog().invocation_count(), 24);
    }

    #[test]
    fn test_resnet_stages_are_six_ops() {
        let catalog = tpu_v3_catalog();
        let Some(WorkloadSpec::Composite(stages)) = catalog.entries_for("ResNet") else {
            panic!("ResNet must be composite");
        };
        assert_eq!(stages.len(), 4);
        for stage in stages {
            assert_eq!(stage.len(), 6);
            assert!(stage.entries().iter().all(WorkloadEntry::is_well_formed));
        }
        assert_eq!(stages[0].entries()[0].dims(), &[32, 4096, 320]);
    }

    #[test]
    fn test_every_entry_is_well_formed() {
        for workload in &tpu_v3_catalog() {
            if let WorkloadSpec::Simple(entries) = workload.spec() {
                assert!(entries.iter().all(WorkloadEntry::is_well_formed));
            }
        }
    }
}
