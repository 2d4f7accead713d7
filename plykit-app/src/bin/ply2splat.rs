//! Convert COLMAP/GloMAP PLY point clouds to Gaussian-splat PLY.
//!
//! The output loads in SuperSplat, PlayCanvas, and other Gaussian-splatting
//! viewers: each input point becomes a tiny near-opaque splat.

use clap::Parser;
use plykit_app::{derive_output_path, file_size_mib, init_tracing, run_batch};
use plykit_data::splat::convert_ply_to_splat;
use std::path::PathBuf;
use tracing::info;

/// Convert COLMAP PLY point clouds to Gaussian-splat PLY
#[derive(Parser, Debug)]
#[command(name = "ply2splat")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input PLY file(s)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output file path (single input only)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    init_tracing();
    let args = Args::parse();

    if args.inputs.len() > 1 && args.output.is_some() {
        eprintln!("error: cannot use --output with multiple input files");
        std::process::exit(1);
    }

    let failures = run_batch(&args.inputs, |input| {
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| derive_output_path(input, "_splat"));
        let points = convert_ply_to_splat(input, &output)?;
        if let (Some(in_mib), Some(out_mib)) = (file_size_mib(input), file_size_mib(&output)) {
            info!(
                "{}: {points} points, {in_mib:.2} MiB -> {} ({out_mib:.2} MiB)",
                input.display(),
                output.display()
            );
        }
        Ok(())
    });

    if failures > 0 {
        std::process::exit(1);
    }
}
