//! PLY format repair.
//!
//! Rewrites a PLY file in canonical ASCII or binary form while preserving
//! its property list. Type aliases are collapsed (`uint8` to `uchar`,
//! `float32` to `float`) and, in binary output, doubles are downcast to
//! float for viewers that reject 64-bit fields.

use crate::error::PlyError;
use crate::ply::{PropertyDecl, ScalarType, VertexRecord, VertexSchema, read_vertex_ply};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Output flavor for the fixer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain-text output, the most widely compatible.
    Ascii,
    /// Little-endian binary output, smaller files.
    Binary,
}

/// Canonical header token for a scalar type.
///
/// Binary output downcasts doubles on write, so its header must already
/// say `float`; ASCII output keeps the full `double` declaration.
fn canonical_type_name(ty: ScalarType, binary: bool) -> &'static str {
    match ty {
        ScalarType::Float32 => "float",
        ScalarType::Float64 => {
            if binary {
                "float"
            } else {
                "double"
            }
        }
        ScalarType::UInt8 => "uchar",
        ScalarType::UInt32 => "uint",
        ScalarType::Int32 => "int",
    }
}

/// Color channels and byte-typed columns print as integers; everything
/// else prints with six decimals.
fn is_integer_column(prop: &PropertyDecl) -> bool {
    prop.ty == ScalarType::UInt8 || matches!(prop.name.as_str(), "red" | "green" | "blue")
}

fn write_header<W: Write>(
    writer: &mut W,
    schema: &VertexSchema,
    record_count: usize,
    binary: bool,
) -> Result<(), PlyError> {
    writeln!(writer, "ply")?;
    if binary {
        writeln!(writer, "format binary_little_endian 1.0")?;
    } else {
        writeln!(writer, "format ascii 1.0")?;
    }
    writeln!(writer, "comment Repaired for viewer compatibility")?;
    writeln!(writer, "element vertex {record_count}")?;
    for prop in &schema.properties {
        writeln!(
            writer,
            "property {} {}",
            canonical_type_name(prop.ty, binary),
            prop.name
        )?;
    }
    writeln!(writer, "end_header")?;
    Ok(())
}

/// Re-emit decoded records as canonical ASCII PLY, preserving the original
/// property list.
pub fn write_ascii_ply<W: Write>(
    writer: &mut W,
    schema: &VertexSchema,
    records: &[VertexRecord],
) -> Result<(), PlyError> {
    write_header(writer, schema, records.len(), false)?;

    let mut fields = Vec::with_capacity(schema.properties.len());
    for record in records {
        fields.clear();
        for (value, prop) in record.iter().zip(&schema.properties) {
            if is_integer_column(prop) {
                fields.push(format!("{}", *value as i64));
            } else {
                fields.push(format!("{value:.6}"));
            }
        }
        writeln!(writer, "{}", fields.join(" "))?;
    }
    Ok(())
}

/// Re-emit decoded records as canonical little-endian binary PLY,
/// preserving the original property list. Doubles are packed as float32.
pub fn write_binary_ply<W: Write>(
    writer: &mut W,
    schema: &VertexSchema,
    records: &[VertexRecord],
) -> Result<(), PlyError> {
    write_header(writer, schema, records.len(), true)?;

    for record in records {
        for (value, prop) in record.iter().zip(&schema.properties) {
            write_scalar(writer, *value, prop.ty)?;
        }
    }
    Ok(())
}

fn write_scalar<W: Write>(writer: &mut W, value: f64, ty: ScalarType) -> Result<(), PlyError> {
    match ty {
        ScalarType::UInt8 => writer.write_all(&[value as u8])?,
        ScalarType::UInt32 => writer.write_all(&(value as u32).to_le_bytes())?,
        ScalarType::Int32 => writer.write_all(&(value as i32).to_le_bytes())?,
        ScalarType::Float32 => writer.write_all(&(value as f32).to_le_bytes())?,
        // Doubles pack as float32 to match the header declaration above.
        ScalarType::Float64 => writer.write_all(&(value as f32).to_le_bytes())?,
    }
    Ok(())
}

/// Repair the PLY file at `input`, writing the normalized result to
/// `output`. Returns the number of records written.
#[tracing::instrument(skip_all, fields(path = %input.display()))]
pub fn fix_ply_file(input: &Path, output: &Path, format: OutputFormat) -> Result<usize, PlyError> {
    let (schema, records) = read_vertex_ply(input)?;
    info!(
        "read {} of {} declared vertices ({} properties, {:?})",
        records.len(),
        schema.vertex_count,
        schema.properties.len(),
        schema.format
    );

    let mut writer = BufWriter::new(File::create(output)?);
    match format {
        OutputFormat::Ascii => write_ascii_ply(&mut writer, &schema, &records)?,
        OutputFormat::Binary => write_binary_ply(&mut writer, &schema, &records)?,
    }
    writer.flush()?;
    info!("wrote {:?} PLY: {}", format, output.display());
    Ok(records.len())
}
