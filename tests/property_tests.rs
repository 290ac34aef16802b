//! Property-based tests for sim-harness
//!
//! - Encoding shape: one line, `1 + len(dims)` tokens, alias-resolved name
//! - Per-item isolation: malformed items never stop the pass
//! - Extraction: exactly one record per data line, in file order
//! - Run with ProptestConfig::with_cases(100)

use proptest::prelude::*;
use sim_harness::analyzer::{latency_series, relative_error, Analyzer, ParsedRecord};
use sim_harness::catalog::{AliasTable, WorkloadCatalog, WorkloadEntry, WorkloadSpec};
use sim_harness::config::HarnessConfig;
use sim_harness::driver::ExperimentDriver;
use sim_harness::encoder::RecordEncoder;
use sim_harness::runlog::Outcome;
use sim_harness::Result;

// ============================================================================
// Strategies
// ============================================================================

fn arb_op() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "Matmul",
        "DotProduct",
        "Conv",
        "Softmax",
        "LayerNorm",
        "Activation",
        "SelfAttention",
    ])
    .prop_map(str::to_string)
}

fn arb_dims(len: std::ops::RangeInclusive<usize>) -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(1u64..100_000, len)
}

/// A data line or a line the analyzer must skip.
#[derive(Debug, Clone)]
enum LogLine {
    Data(String, Vec<u64>, u64),
    Error(String, Vec<u64>),
    Header(String),
    Noise(f64),
}

fn arb_log_line() -> impl Strategy<Value = LogLine> {
    prop_oneof![
        (arb_op(), arb_dims(2..=4), 0u64..10_000_000).prop_map(|(o, d, c)| LogLine::Data(o, d, c)),
        (arb_op(), arb_dims(2..=4)).prop_map(|(o, d)| LogLine::Error(o, d)),
        arb_op().prop_map(LogLine::Header),
        (0.0f64..1.0).prop_map(LogLine::Noise),
    ]
}

fn render(line: &LogLine) -> String {
    match line {
        LogLine::Data(op, dims, cycles) => {
            let dims_text = WorkloadEntry::new(op.as_str(), dims.clone()).dims_text();
            format!("  {op} {dims_text} -> Cycles {cycles}")
        }
        LogLine::Error(op, dims) => {
            let dims_text = WorkloadEntry::new(op.as_str(), dims.clone()).dims_text();
            format!(
                "  {op} {dims_text} -> ERROR: simulator exited with exit status: 1: \
                 partial: {op} {dims_text} -> Cycles 12; abort"
            )
        }
        LogLine::Header(op) => format!("Running {op} workload:"),
        LogLine::Noise(x) => format!("SA {x}"),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: well-formed entries encode to one line of 1 + len(dims) tokens
    #[test]
    fn prop_encode_token_count(op in arb_op(), dims in arb_dims(2..=4)) {
        let aliases = AliasTable::new().with("DotProduct", "Matmul");
        let encoded = RecordEncoder::new(&aliases)
            .encode_entry(&WorkloadEntry::new(op.as_str(), dims.clone()))
            .unwrap();

        prop_assert_eq!(encoded.text().lines().count(), 1);
        let tokens: Vec<&str> = encoded.text().split_whitespace().collect();
        prop_assert_eq!(tokens.len(), 1 + dims.len());
        prop_assert_eq!(tokens[0], aliases.canonical_name(&op));
        for (token, dim) in tokens[1..].iter().zip(&dims) {
            prop_assert_eq!(token.parse::<u64>().unwrap(), *dim);
        }
    }

    /// Property: malformed shapes fail encoding
    #[test]
    fn prop_encode_rejects_bad_lengths(
        op in arb_op(),
        dims in prop_oneof![arb_dims(0..=1), arb_dims(5..=8)]
    ) {
        let aliases = AliasTable::new();
        let err = RecordEncoder::new(&aliases)
            .encode_entry(&WorkloadEntry::new(op.as_str(), dims))
            .unwrap_err();
        prop_assert!(err.is_item_level());
    }

    /// Property: every item gets exactly one result, in order, whatever fails
    #[test]
    fn prop_driver_isolates_failures(
        shapes in prop::collection::vec(prop_oneof![arb_dims(2..=4), arb_dims(5..=6)], 1..20),
        fail_mask in prop::collection::vec(any::<bool>(), 20)
    ) {
        let mut catalog = WorkloadCatalog::new();
        catalog.push("Conv", WorkloadSpec::simple("Conv", shapes.clone())).unwrap();

        let mut call = 0usize;
        let stub = |_: &str, _: usize| -> Result<Outcome> {
            let fail = fail_mask[call % fail_mask.len()];
            call += 1;
            Ok(if fail { Outcome::failure("rejected") } else { Outcome::success("Cycles 1") })
        };
        let mut driver = ExperimentDriver::new(HarnessConfig::default(), AliasTable::new(), stub);
        let log = driver.run_all(&catalog).unwrap();

        let expected: Vec<String> = shapes
            .iter()
            .map(|d| format!("Conv {}", WorkloadEntry::new("Conv", d.clone()).dims_text()))
            .collect();
        prop_assert_eq!(log.labels(), expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    /// Property: M data lines among P others yield exactly M records, in order
    #[test]
    fn prop_extract_counts_data_lines(lines in prop::collection::vec(arb_log_line(), 0..60)) {
        let text: String = lines.iter().map(|l| render(l) + "\n").collect();
        let records = Analyzer::new(940.0).unwrap().extract(&text);

        let expected: Vec<(String, u64)> = lines
            .iter()
            .filter_map(|l| match l {
                LogLine::Data(op, _, cycles) => Some((op.clone(), *cycles)),
                _ => None,
            })
            .collect();
        let actual: Vec<(String, u64)> =
            records.iter().map(|r| (r.operation.clone(), r.cycles)).collect();
        prop_assert_eq!(actual, expected);
    }

    /// Property: latency is cycles / clock, positionally
    #[test]
    fn prop_latency_is_cycles_over_clock(
        cycles in prop::collection::vec(0u64..1_000_000_000, 0..50),
        clock in 1.0f64..5000.0
    ) {
        let records: Vec<ParsedRecord> = cycles
            .iter()
            .map(|&c| ParsedRecord { operation: "Op".into(), dims_text: "1, 2".into(), cycles: c })
            .collect();
        let series = latency_series(&records, clock);
        prop_assert_eq!(series.len(), cycles.len());
        for (value, &c) in series.values().iter().zip(&cycles) {
            #[allow(clippy::cast_precision_loss)]
            let expected = c as f64 / clock;
            prop_assert!((value - expected).abs() <= expected.abs() * 1e-12);
        }
    }

    /// Property: relative error is zero on the diagonal and scales linearly
    #[test]
    fn prop_relative_error_scaling(reference in 0.01f64..10_000.0, pct in 0.0f64..100.0) {
        prop_assert!(relative_error(reference, reference).abs() < 1e-12);
        let measured = reference * (1.0 + pct / 100.0);
        prop_assert!((relative_error(measured, reference) - pct).abs() < 1e-6);
    }
}
