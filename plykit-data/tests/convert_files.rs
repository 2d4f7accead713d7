//! File-level conversion tests.
//!
//! Exercise the path-based entry points end to end: write a fixture PLY to
//! a temp directory, convert it, and re-read the result.

use plykit_data::fixer::{OutputFormat, fix_ply_file};
use plykit_data::ply::{PlyFormat, ScalarType, read_vertex_ply};
use plykit_data::splat::convert_ply_to_splat;
use std::fs;
use std::path::PathBuf;

const ASCII_CLOUD: &str = "ply\n\
format ascii 1.0\n\
comment exported by COLMAP\n\
element vertex 3\n\
property float x\n\
property float y\n\
property float z\n\
property uchar red\n\
property uchar green\n\
property uchar blue\n\
end_header\n\
0 0 0 255 0 0\n\
1 0 0 0 255 0\n\
0 1 0 0 0 255\n";

fn write_fixture(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    fs::write(&path, ASCII_CLOUD).expect("Failed to write fixture");
    path
}

#[test]
fn test_convert_ply_to_splat_file() {
    let input = write_fixture("plykit_splat_input.ply");
    let output = std::env::temp_dir().join("plykit_splat_output.ply");

    let points = convert_ply_to_splat(&input, &output).expect("Conversion failed");
    assert_eq!(points, 3);

    let (schema, records) = read_vertex_ply(&output).expect("Failed to re-read output");
    assert_eq!(schema.format, PlyFormat::BinaryLittleEndian);
    assert_eq!(schema.vertex_count, 3);
    assert_eq!(schema.properties.len(), 17);
    assert!(schema.properties.iter().all(|p| p.ty == ScalarType::Float32));
    assert_eq!(records.len(), 3);

    // Positions pass through unchanged.
    assert_eq!(&records[1][0..3], &[1.0, 0.0, 0.0]);

    fs::remove_file(&input).ok();
    fs::remove_file(&output).ok();
}

#[test]
fn test_fix_ply_file_binary_then_ascii() {
    let input = write_fixture("plykit_fix_input.ply");
    let binary = std::env::temp_dir().join("plykit_fix_binary.ply");
    let ascii = std::env::temp_dir().join("plykit_fix_ascii.ply");

    let written = fix_ply_file(&input, &binary, OutputFormat::Binary).expect("Binary fix failed");
    assert_eq!(written, 3);

    // Chain the fixer onto its own output to cover both directions.
    let written = fix_ply_file(&binary, &ascii, OutputFormat::Ascii).expect("ASCII fix failed");
    assert_eq!(written, 3);

    let (schema, records) = read_vertex_ply(&ascii).expect("Failed to re-read output");
    assert_eq!(schema.format, PlyFormat::Ascii);
    assert_eq!(schema.properties.len(), 6);
    assert_eq!(records.len(), 3);
    assert_eq!(records[0], vec![0.0, 0.0, 0.0, 255.0, 0.0, 0.0]);

    fs::remove_file(&input).ok();
    fs::remove_file(&binary).ok();
    fs::remove_file(&ascii).ok();
}

#[test]
fn test_missing_input_reports_io_error() {
    let input = std::env::temp_dir().join("plykit_does_not_exist.ply");
    let output = std::env::temp_dir().join("plykit_unused_output.ply");
    let result = convert_ply_to_splat(&input, &output);
    assert!(matches!(result, Err(plykit_data::PlyError::Io(_))));
}
