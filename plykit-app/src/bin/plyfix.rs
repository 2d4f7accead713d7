//! Repair PLY files for viewer compatibility.
//!
//! Re-emits COLMAP/GloMAP output in canonical ASCII (default) or binary
//! form, collapsing type aliases and downcasting doubles in binary mode.

use clap::{Parser, ValueEnum};
use plykit_app::{derive_output_path, file_size_mib, init_tracing, run_batch};
use plykit_data::fixer::{OutputFormat, fix_ply_file};
use std::path::PathBuf;
use tracing::info;

/// Fix PLY files for better compatibility with viewers
#[derive(Parser, Debug)]
#[command(name = "plyfix")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input PLY file(s)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output file path (single input only)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "ascii")]
    format: FormatArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// ASCII output, the most widely compatible
    Ascii,
    /// Binary little-endian output, smaller files
    Binary,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Ascii => OutputFormat::Ascii,
            FormatArg::Binary => OutputFormat::Binary,
        }
    }
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
            .unwrap_or_else(|| derive_output_path(input, "_fixed"));
        let records = fix_ply_file(input, &output, args.format.into())?;
        if let (Some(in_mib), Some(out_mib)) = (file_size_mib(input), file_size_mib(&output)) {
            info!(
                "{}: {records} vertices, {in_mib:.2} MiB -> {} ({out_mib:.2} MiB)",
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
