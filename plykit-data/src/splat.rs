//! Gaussian-splat PLY export.
//!
//! Converts plain colored point clouds (COLMAP / GloMAP output) into the
//! 17-property binary PLY layout that SuperSplat, PlayCanvas, and other
//! Gaussian-splatting viewers load. Each point becomes a tiny near-opaque
//! splat: the splat-specific fields carry fixed log/logit-space defaults
//! and only position and color come from the input.

use crate::error::PlyError;
use crate::ply::{ScalarType, VertexRecord, VertexSchema, decode_vertices, parse_header};
use glam::Vec3;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Zeroth-order spherical harmonic normalization constant.
///
/// Viewers decode the DC color term as `color = SH_C0 * f_dc + 0.5`; the
/// encoder below applies the exact inverse.
pub const SH_C0: f32 = 0.28209479177387814;

/// Property names of the splat layout, in wire order.
///
/// Viewers identify these fields by name and position, so the order must
/// not change.
const SPLAT_PROPERTIES: [&str; 17] = [
    "x", "y", "z", "nx", "ny", "nz", "f_dc_0", "f_dc_1", "f_dc_2", "opacity", "scale_0",
    "scale_1", "scale_2", "rot_0", "rot_1", "rot_2", "rot_3",
];

/// Normal assigned to every splat; raw point clouds carry no orientation.
const SPLAT_NORMAL: [f32; 3] = [0.0, 0.0, 1.0];

/// Logit-space opacity; the viewer's sigmoid maps 2.2 to roughly 0.90.
const SPLAT_OPACITY: f32 = 2.2;

/// Log-space scale; exp(-7) is roughly 0.0009 world units, so splats read
/// as point-cloud dots rather than blobs.
const SPLAT_LOG_SCALE: f32 = -7.0;

/// Identity quaternion in (w, x, y, z) order.
const SPLAT_ROTATION: [f32; 4] = [1.0, 0.0, 0.0, 0.0];

/// A point ready for splat conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplatPoint {
    /// Position in world space.
    pub position: Vec3,
    /// RGB color (linear, 0-1 range).
    pub color: Vec3,
}

/// Build splat points from decoded vertex records.
///
/// Positions are looked up by property name; colors accept both the
/// `red/green/blue` and `r/g/b` conventions, with byte-typed channels
/// normalized to the 0-1 range. Clouds without color fall back to light
/// gray.
pub fn splat_points(
    schema: &VertexSchema,
    records: &[VertexRecord],
) -> Result<Vec<SplatPoint>, PlyError> {
    let ix = schema
        .index_of("x")
        .ok_or(PlyError::MissingProperty { name: "x" })?;
    let iy = schema
        .index_of("y")
        .ok_or(PlyError::MissingProperty { name: "y" })?;
    let iz = schema
        .index_of("z")
        .ok_or(PlyError::MissingProperty { name: "z" })?;

    let color = color_channels(schema);
    if color.is_none() {
        warn!("no color properties found, using default light gray");
    }

    let mut points = Vec::with_capacity(records.len());
    for record in records {
        let position = Vec3::new(record[ix] as f32, record[iy] as f32, record[iz] as f32);
        let color = match color {
            Some([ir, ig, ib]) => Vec3::new(
                channel_value(schema, record, ir),
                channel_value(schema, record, ig),
                channel_value(schema, record, ib),
            ),
            None => Vec3::splat(0.8),
        };
        points.push(SplatPoint { position, color });
    }
    Ok(points)
}

fn color_channels(schema: &VertexSchema) -> Option<[usize; 3]> {
    for names in [["red", "green", "blue"], ["r", "g", "b"]] {
        if let (Some(r), Some(g), Some(b)) = (
            schema.index_of(names[0]),
            schema.index_of(names[1]),
            schema.index_of(names[2]),
        ) {
            return Some([r, g, b]);
        }
    }
    None
}

fn channel_value(schema: &VertexSchema, record: &VertexRecord, index: usize) -> f32 {
    let value = record[index] as f32;
    match schema.properties[index].ty {
        ScalarType::UInt8 => value / 255.0,
        _ => value,
    }
}

/// Write `points` as a binary Gaussian-splat PLY.
///
/// The 17 float32 fields are packed per vertex, little-endian, no padding,
/// in the exact order the header declares them.
pub fn write_gaussian_splat_ply<W: Write>(
    writer: &mut W,
    points: &[SplatPoint],
) -> Result<(), PlyError> {
    writeln!(writer, "ply")?;
    writeln!(writer, "format binary_little_endian 1.0")?;
    writeln!(
        writer,
        "comment Converted from COLMAP point cloud to Gaussian splat format"
    )?;
    writeln!(writer, "element vertex {}", points.len())?;
    for name in SPLAT_PROPERTIES {
        writeln!(writer, "property float {name}")?;
    }
    writeln!(writer, "end_header")?;

    for point in points {
        for value in splat_fields(point) {
            writer.write_all(&value.to_le_bytes())?;
        }
    }
    Ok(())
}

/// The 17 per-vertex floats for one point, in wire order.
fn splat_fields(point: &SplatPoint) -> [f32; 17] {
    let f_dc_0 = (point.color.x - 0.5) / SH_C0;
    let f_dc_1 = (point.color.y - 0.5) / SH_C0;
    let f_dc_2 = (point.color.z - 0.5) / SH_C0;
    [
        point.position.x,
        point.position.y,
        point.position.z,
        SPLAT_NORMAL[0],
        SPLAT_NORMAL[1],
        SPLAT_NORMAL[2],
        f_dc_0,
        f_dc_1,
        f_dc_2,
        SPLAT_OPACITY,
        SPLAT_LOG_SCALE,
        SPLAT_LOG_SCALE,
        SPLAT_LOG_SCALE,
        SPLAT_ROTATION[0],
        SPLAT_ROTATION[1],
        SPLAT_ROTATION[2],
        SPLAT_ROTATION[3],
    ]
}

/// Convert the PLY point cloud at `input` into a Gaussian-splat PLY at
/// `output`. Returns the number of points written.
#[tracing::instrument(skip_all, fields(path = %input.display()))]
pub fn convert_ply_to_splat(input: &Path, output: &Path) -> Result<usize, PlyError> {
    debug!("reading point cloud: {}", input.display());
    let mut reader = BufReader::new(File::open(input)?);
    let schema = parse_header(&mut reader)?;
    let records = decode_vertices(&mut reader, &schema)?;
    let points = splat_points(&schema, &records)?;
    info!("read {} points from {}", points.len(), input.display());

    let mut writer = BufWriter::new(File::create(output)?);
    write_gaussian_splat_ply(&mut writer, &points)?;
    writer.flush()?;
    info!("wrote Gaussian splat PLY: {}", output.display());
    Ok(points.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const ASCII_TRIANGLE: &str = "ply\n\
format ascii 1.0\n\
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

    fn convert_bytes(input: &str) -> Vec<u8> {
        let mut reader = Cursor::new(input);
        let schema = parse_header(&mut reader).unwrap();
        let records = decode_vertices(&mut reader, &schema).unwrap();
        let points = splat_points(&schema, &records).unwrap();
        let mut out = Vec::new();
        write_gaussian_splat_ply(&mut Cursor::new(&mut out), &points).unwrap();
        out
    }

    fn decode_splat_output(bytes: &[u8]) -> (VertexSchema, Vec<VertexRecord>) {
        let mut reader = Cursor::new(bytes);
        let schema = parse_header(&mut reader).unwrap();
        let records = decode_vertices(&mut reader, &schema).unwrap();
        (schema, records)
    }

    #[test]
    fn test_splat_header_property_order() {
        let bytes = convert_bytes(ASCII_TRIANGLE);
        let header_end = bytes
            .windows(11)
            .position(|w| w == b"end_header\n")
            .unwrap();
        let header = std::str::from_utf8(&bytes[..header_end]).unwrap();

        let declared: Vec<&str> = header
            .lines()
            .filter_map(|l| l.strip_prefix("property float "))
            .collect();
        assert_eq!(declared, SPLAT_PROPERTIES);
        assert!(header.contains("format binary_little_endian 1.0"));
        assert!(header.contains("element vertex 3"));
        assert!(header.lines().any(|l| l.starts_with("comment ")));
    }

    #[test]
    fn test_red_green_blue_triangle() {
        // First point is pure red: f_dc_0 = (1.0 - 0.5) / SH_C0, the green
        // and blue channels sit at (0.0 - 0.5) / SH_C0.
        let (schema, records) = decode_splat_output(&convert_bytes(ASCII_TRIANGLE));
        assert_eq!(records.len(), 3);
        assert_eq!(schema.record_width(), 17 * 4);

        let hi = ((1.0f32 - 0.5) / SH_C0) as f64;
        let lo = ((0.0f32 - 0.5) / SH_C0) as f64;
        assert!((hi - 1.7725).abs() < 1e-3);

        let red = &records[0];
        assert!((red[6] - hi).abs() < 1e-6);
        assert!((red[7] - lo).abs() < 1e-6);
        assert!((red[8] - lo).abs() < 1e-6);

        let green = &records[1];
        assert!((green[7] - hi).abs() < 1e-6);
        let blue = &records[2];
        assert!((blue[8] - hi).abs() < 1e-6);
    }

    #[test]
    fn test_fixed_splat_fields() {
        let (_, records) = decode_splat_output(&convert_bytes(ASCII_TRIANGLE));
        for record in &records {
            assert_eq!(&record[3..6], &[0.0, 0.0, 1.0], "normal");
            assert!((record[9] - 2.2f32 as f64).abs() < 1e-9, "opacity");
            assert_eq!(&record[10..13], &[-7.0, -7.0, -7.0], "scale");
            assert_eq!(&record[13..17], &[1.0, 0.0, 0.0, 0.0], "rotation");
        }
    }

    #[test]
    fn test_color_roundtrip_law() {
        // color = SH_C0 * f_dc + 0.5 must reproduce the input to f32
        // precision for any normalized channel value.
        for c in [0.0f32, 0.1, 0.25, 0.5, 0.73, 0.999, 1.0] {
            let point = SplatPoint {
                position: Vec3::ZERO,
                color: Vec3::splat(c),
            };
            let fields = splat_fields(&point);
            let decoded = SH_C0 * fields[6] + 0.5;
            assert!(
                (decoded - c).abs() < 1e-6,
                "channel {c} decoded as {decoded}"
            );
        }
    }

    #[test]
    fn test_rgb_short_names_and_missing_color() {
        let short_named = "ply\nformat ascii 1.0\nelement vertex 1\n\
property float x\nproperty float y\nproperty float z\n\
property uchar r\nproperty uchar g\nproperty uchar b\nend_header\n\
1 2 3 255 255 255\n";
        let mut reader = Cursor::new(short_named);
        let schema = parse_header(&mut reader).unwrap();
        let records = decode_vertices(&mut reader, &schema).unwrap();
        let points = splat_points(&schema, &records).unwrap();
        assert_eq!(points[0].color, Vec3::ONE);

        let colorless = "ply\nformat ascii 1.0\nelement vertex 1\n\
property float x\nproperty float y\nproperty float z\nend_header\n1 2 3\n";
        let mut reader = Cursor::new(colorless);
        let schema = parse_header(&mut reader).unwrap();
        let records = decode_vertices(&mut reader, &schema).unwrap();
        let points = splat_points(&schema, &records).unwrap();
        assert_eq!(points[0].color, Vec3::splat(0.8));
        assert_eq!(points[0].position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_missing_position_is_fatal() {
        let no_x = "ply\nformat ascii 1.0\nelement vertex 1\n\
property float y\nproperty float z\nend_header\n2 3\n";
        let mut reader = Cursor::new(no_x);
        let schema = parse_header(&mut reader).unwrap();
        let records = decode_vertices(&mut reader, &schema).unwrap();
        assert!(matches!(
            splat_points(&schema, &records),
            Err(PlyError::MissingProperty { name: "x" })
        ));
    }

    #[test]
    fn test_float_colors_pass_through() {
        let float_colors = "ply\nformat ascii 1.0\nelement vertex 1\n\
property float x\nproperty float y\nproperty float z\n\
property float red\nproperty float green\nproperty float blue\nend_header\n\
0 0 0 0.25 0.5 0.75\n";
        let mut reader = Cursor::new(float_colors);
        let schema = parse_header(&mut reader).unwrap();
        let records = decode_vertices(&mut reader, &schema).unwrap();
        let points = splat_points(&schema, &records).unwrap();
        assert_eq!(points[0].color, Vec3::new(0.25, 0.5, 0.75));
    }
}
