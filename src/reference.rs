//! Reference latency data
//!
//! Measured hardware latencies the simulator is compared against. The series
//! is positional: entry `i` corresponds to the `i`-th record extracted from
//! the run log.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// One reference measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    /// Workload name, e.g. `Matmul`
    pub operation: String,
    /// Shape description, e.g. `(4096, 320, 320)`
    pub shape: String,
    /// Measured latency in microseconds
    pub latency_us: f64,
}

impl ReferencePoint {
    /// Create a reference point.
    #[must_use]
    pub fn new(operation: impl Into<String>, shape: impl Into<String>, latency_us: f64) -> Self {
        Self {
            operation: operation.into(),
            shape: shape.into(),
            latency_us,
        }
    }

    /// Display label, e.g. `Matmul (4096, 320, 320)`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.operation, self.shape)
    }
}

/// Ordered reference measurements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceSeries {
    points: Vec<ReferencePoint>,
}

impl ReferenceSeries {
    /// Wrap an ordered list of points.
    #[must_use]
    pub const fn new(points: Vec<ReferencePoint>) -> Self {
        Self { points }
    }

    /// Load a JSON array of points.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Points in order.
    #[must_use]
    pub fn points(&self) -> &[ReferencePoint] {
        &self.points
    }

    /// Latencies in order.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.latency_us).collect()
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// TPU v3 latencies (µs) for the built-in catalog, in catalog order.
const TPU_V3: [(&str, &str, f64); 24] = [
    ("Matmul", "(4096, 320, 320)", 92.8),
    ("Matmul", "(1024, 640, 640)", 74.0),
    ("Matmul", "(256, 1280, 1280)", 86.0),
    ("Matmul", "(64, 1280, 1280)", 41.6),
    ("DotProduct", "(8, 4096, 40, 4096)", 944.0),
    ("DotProduct", "(8, 1024, 80, 1024)", 55.0),
    ("DotProduct", "(8, 256, 160, 256)", 42.4),
    ("DotProduct", "(8, 64, 160, 64)", 2.2),
    ("Conv", "(4096, 2880, 320)", 238.0),
    ("Conv", "(1024, 5760, 640)", 142.0),
    ("Conv", "(256, 11520, 1280)", 168.0),
    ("Conv", "(64, 11520, 1280)", 89.0),
    ("Softmax", "(8, 4096)", 665.0),
    ("Softmax", "(8, 1024)", 43.0),
    ("Softmax", "(8, 256)", 4.022),
    ("Softmax", "(8, 64)", 1.08),
    ("ResNet", "(4096, 2880, 320)", 515.2),
    ("ResNet", "(1024, 5760, 640)", 324.4),
    ("ResNet", "(256, 11520, 1280)", 327.2),
    ("ResNet", "(64, 11520, 1280)", 203.6),
    ("SelfAttention", "(8, 4096, 320, 320)", 2536.0),
    ("SelfAttention", "(8, 1024, 640, 640)", 255.0),
    ("SelfAttention", "(8, 256, 1280, 1280)", 161.0),
    ("SelfAttention", "(8, 64, 1280, 1280)", 82.0),
];

/// Reference series matching [`crate::catalog::builtin::tpu_v3_catalog`].
#[must_use]
pub fn tpu_v3() -> ReferenceSeries {
    ReferenceSeries::new(
        TPU_V3
            .iter()
            .map(|&(op, shape, us)| ReferencePoint::new(op, shape, us))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin::tpu_v3_catalog;

    #[test]
    fn test_tpu_v3_aligns_with_catalog() {
        let reference = tpu_v3();
        assert_eq!(reference.len(), tpu_v3_catalog().invocation_count());

        let mut ops: Vec<&str> = reference.points().iter().map(|p| p.operation.as_str()).collect();
        ops.dedup();
        assert_eq!(ops, tpu_v3_catalog().names());
    }

    #[test]
    fn test_label() {
        assert_eq!(tpu_v3().points()[0].label(), "Matmul (4096, 320, 320)");
    }

    #[test]
    fn test_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.json");
        std::fs::write(
            &path,
            r#"[{"operation": "Matmul", "shape": "(64, 1280, 1280)", "latency_us": 41.6}]"#,
        )
        .unwrap();
        let reference = ReferenceSeries::load(&path).unwrap();
        assert_eq!(reference.values(), vec![41.6]);
    }
}
