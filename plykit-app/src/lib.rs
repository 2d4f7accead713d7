//! Shared plumbing for the plykit command-line tools.
//!
//! Both binaries follow the same batch contract: every input is processed
//! independently, failures are reported per file without aborting the rest
//! of the batch, and an explicit output path is only meaningful for a
//! single input.

use plykit_data::PlyError;
use std::path::{Path, PathBuf};
use tracing::error;

/// Derive the default output path: `<stem><suffix>.ply` next to the input.
pub fn derive_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    input.with_file_name(format!("{stem}{suffix}.ply"))
}

/// Initialize tracing for a CLI run; `RUST_LOG` overrides the default
/// `info` level.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

/// Run `convert` over every input, reporting failures without aborting the
/// batch. Returns the number of files that failed.
pub fn run_batch<F>(inputs: &[PathBuf], mut convert: F) -> usize
where
    F: FnMut(&Path) -> Result<(), PlyError>,
{
    let mut failures = 0;
    for input in inputs {
        if let Err(e) = convert(input) {
            error!("failed to convert {}: {e}", input.display());
            failures += 1;
        }
    }
    failures
}

/// File size in MiB, for progress reporting.
pub fn file_size_mib(path: &Path) -> Option<f64> {
    std::fs::metadata(path)
        .ok()
        .map(|m| m.len() as f64 / (1024.0 * 1024.0))
}
