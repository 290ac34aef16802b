//! Shared helpers: stand-in simulator scripts and the Matmul catalog.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use sim_harness::catalog::{WorkloadCatalog, WorkloadSpec};

/// Serializes script creation and execution within a test binary, so no
/// concurrently forked child holds a script open for writing while it is
/// exec'd (ETXTBSY).
static SCRIPT_LOCK: Mutex<()> = Mutex::new(());

/// Hold for the whole duration of a test that runs scripts.
pub fn script_guard() -> MutexGuard<'static, ()> {
    SCRIPT_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Argument parsing prelude for stand-in simulators: sets `count`, `input`,
/// `output` and `args`.
const PRELUDE: &str = r#"#!/bin/sh
args="$*"
while [ $# -gt 0 ]; do
  case "$1" in
    -c) count="$2"; shift 2 ;;
    -i) input="$2"; shift 2 ;;
    -o) output="$2"; shift 2 ;;
    *) shift ;;
  esac
done
"#;

/// Write an executable stand-in simulator into `dir`.
#[cfg(unix)]
pub fn write_simulator(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake_perf_model.sh");
    std::fs::write(&path, format!("{PRELUDE}{body}\n")).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

/// Always reports `Cycles 100`.
pub const ALWAYS_100: &str = r#"echo "Cycles 100" > "$output""#;

/// Fails (exit 3) on its second invocation, `Cycles 100` otherwise.
pub const FAIL_SECOND: &str = r#"
calls_file="$(dirname "$input")/calls"
n=$(cat "$calls_file" 2>/dev/null || echo 0)
n=$((n + 1))
echo "$n" > "$calls_file"
if [ "$n" -eq 2 ]; then
  echo "unsupported layer shape" >&2
  exit 3
fi
echo "Cycles 100" > "$output"
"#;

/// The two-entry Matmul catalog used by the end-to-end scenarios.
pub fn matmul_catalog() -> WorkloadCatalog {
    let mut catalog = WorkloadCatalog::new();
    catalog
        .push(
            "Matmul",
            WorkloadSpec::simple("Matmul", [vec![4096, 320, 320], vec![1024, 640, 640]]),
        )
        .unwrap();
    catalog
}
