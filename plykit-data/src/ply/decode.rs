//! Vertex record decoding for ASCII and binary PLY data.

use crate::error::PlyError;
use crate::ply::header::{PlyFormat, ScalarType, VertexSchema, parse_header};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{debug, warn};

/// One decoded vertex: numeric fields positionally aligned to the schema.
///
/// `f64` carries every supported scalar domain exactly, so integer columns
/// survive the round trip bit-for-bit.
pub type VertexRecord = Vec<f64>;

/// Decode the vertex records declared by `schema`.
///
/// `reader` must be positioned at the first data byte, which is where
/// [`parse_header`] leaves it. At most `schema.vertex_count` records are
/// returned; fewer indicates truncated input (binary) or skipped malformed
/// lines (ASCII), both recovered from rather than raised.
pub fn decode_vertices<R: BufRead>(
    reader: &mut R,
    schema: &VertexSchema,
) -> Result<Vec<VertexRecord>, PlyError> {
    match schema.format {
        PlyFormat::BinaryLittleEndian => decode_binary(reader, schema),
        PlyFormat::Ascii => decode_ascii(reader, schema),
    }
}

/// Parse the header and decode every vertex record of the PLY file at `path`.
pub fn read_vertex_ply<P: AsRef<Path>>(
    path: P,
) -> Result<(VertexSchema, Vec<VertexRecord>), PlyError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let schema = parse_header(&mut reader)?;
    let records = decode_vertices(&mut reader, &schema)?;
    Ok((schema, records))
}

fn decode_binary<R: Read>(
    reader: &mut R,
    schema: &VertexSchema,
) -> Result<Vec<VertexRecord>, PlyError> {
    let width = schema.record_width();
    let mut buf = vec![0u8; width];
    let mut records = Vec::with_capacity(schema.vertex_count);

    // Exactly vertex_count records; trailing bytes (face data, other
    // elements) are not ours to interpret.
    for _ in 0..schema.vertex_count {
        match reader.read_exact(&mut buf) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }
        let mut record = Vec::with_capacity(schema.properties.len());
        let mut offset = 0;
        for prop in &schema.properties {
            record.push(read_scalar(&buf[offset..], prop.ty));
            offset += prop.ty.width();
        }
        records.push(record);
    }

    if records.len() < schema.vertex_count {
        warn!(
            "binary vertex data truncated: decoded {} of {} declared records",
            records.len(),
            schema.vertex_count
        );
    }
    debug!("decoded {} binary vertex records", records.len());
    Ok(records)
}

fn decode_ascii<R: BufRead>(
    reader: &mut R,
    schema: &VertexSchema,
) -> Result<Vec<VertexRecord>, PlyError> {
    let arity = schema.properties.len();
    let mut records = Vec::with_capacity(schema.vertex_count);
    let mut line = String::new();

    while records.len() < schema.vertex_count {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        // Blank lines and lines with the wrong field count are skipped, not
        // fatal; this keeps hand-edited or concatenated files readable.
        if tokens.len() != arity {
            continue;
        }
        let mut record = Vec::with_capacity(arity);
        for token in &tokens {
            let value = token
                .parse::<f64>()
                .map_err(|_| PlyError::InvalidAsciiValue {
                    line: line.trim().to_string(),
                })?;
            record.push(value);
        }
        records.push(record);
    }

    debug!("decoded {} ASCII vertex records", records.len());
    Ok(records)
}

fn read_scalar(bytes: &[u8], ty: ScalarType) -> f64 {
    match ty {
        ScalarType::UInt8 => bytes[0] as f64,
        ScalarType::UInt32 => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
        ScalarType::Int32 => i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
        ScalarType::Float32 => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
        ScalarType::Float64 => f64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]),
    }
}
