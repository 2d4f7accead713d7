//! PLY header parsing.
//!
//! A PLY file opens with an ASCII header that declares the storage format,
//! the vertex count, and an ordered list of typed vertex properties. The
//! order of `property` lines defines the field layout of every vertex
//! record, in both ASCII and binary storage.

use crate::error::PlyError;
use std::io::BufRead;
use tracing::debug;

/// Scalar types that can appear in a vertex property declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Float32,
    Float64,
    UInt8,
    UInt32,
    Int32,
}

impl ScalarType {
    /// Parse a header type token, collapsing the aliases PLY writers use.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "float" | "float32" => Some(Self::Float32),
            "double" | "float64" => Some(Self::Float64),
            "uchar" | "uint8" => Some(Self::UInt8),
            "uint" | "uint32" => Some(Self::UInt32),
            "int" | "int32" => Some(Self::Int32),
            _ => None,
        }
    }

    /// Packed width of one value in binary storage.
    pub fn width(&self) -> usize {
        match self {
            Self::Float32 | Self::UInt32 | Self::Int32 => 4,
            Self::Float64 => 8,
            Self::UInt8 => 1,
        }
    }
}

/// Storage format of the data section following the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlyFormat {
    Ascii,
    BinaryLittleEndian,
}

/// A single `property <type> <name>` declaration, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDecl {
    pub name: String,
    pub ty: ScalarType,
}

/// Parsed vertex schema: storage format, declared count, and the ordered
/// property list.
#[derive(Debug, Clone)]
pub struct VertexSchema {
    pub format: PlyFormat,
    pub vertex_count: usize,
    pub properties: Vec<PropertyDecl>,
}

impl VertexSchema {
    /// Byte width of one binary vertex record.
    ///
    /// Both decoding and encoding derive their layout from this sum;
    /// computing it anywhere else risks the two sides silently disagreeing.
    pub fn record_width(&self) -> usize {
        self.properties.iter().map(|p| p.ty.width()).sum()
    }

    /// Position of a property by name, if declared.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name == name)
    }
}

/// Parse a PLY header from `reader`.
///
/// Consumes bytes up to and including the `end_header` newline, so for
/// binary files the reader is left positioned at the first data byte and
/// for ASCII files the next line read is the first data line.
///
/// Only the vertex element contributes properties to the schema; property
/// lines of later elements (e.g. `face` lists) are ignored, since this
/// codec is vertex-only. An unrecognized scalar type inside the vertex
/// element is an error naming the offending line.
pub fn parse_header<R: BufRead>(reader: &mut R) -> Result<VertexSchema, PlyError> {
    let mut format = PlyFormat::Ascii;
    let mut vertex_count: Option<usize> = None;
    let mut properties = Vec::new();
    let mut in_vertex_element = false;
    let mut saw_end = false;

    let mut raw = Vec::new();
    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw)? == 0 {
            break;
        }
        // Stray non-UTF-8 bytes in comments should not kill the parse.
        let decoded = String::from_utf8_lossy(&raw);
        let line = decoded.trim();
        if line == "end_header" {
            saw_end = true;
            break;
        }

        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("format") => {
                // Only little-endian binary is recognized; a big-endian
                // file would be mis-read. COLMAP and GloMAP never emit one.
                let token = tokens.next().unwrap_or("");
                format = if token.contains("binary") {
                    PlyFormat::BinaryLittleEndian
                } else {
                    PlyFormat::Ascii
                };
            }
            Some("element") => {
                in_vertex_element = tokens.next() == Some("vertex");
                if in_vertex_element {
                    let count = tokens
                        .next()
                        .and_then(|t| t.parse::<usize>().ok())
                        .ok_or_else(|| PlyError::MalformedHeader {
                            line: line.to_string(),
                        })?;
                    vertex_count = Some(count);
                }
            }
            Some("property") if in_vertex_element => {
                let ty = tokens
                    .next()
                    .and_then(ScalarType::parse)
                    .ok_or_else(|| PlyError::UnknownPropertyType {
                        line: line.to_string(),
                    })?;
                let name = tokens.next().ok_or_else(|| PlyError::MalformedHeader {
                    line: line.to_string(),
                })?;
                properties.push(PropertyDecl {
                    name: name.to_string(),
                    ty,
                });
            }
            // "ply" magic, comments, obj_info, other elements' properties
            _ => {}
        }
    }

    if !saw_end {
        return Err(PlyError::MissingEndHeader);
    }
    let vertex_count = vertex_count.ok_or(PlyError::MissingVertexElement)?;

    let schema = VertexSchema {
        format,
        vertex_count,
        properties,
    };
    debug!(
        "parsed PLY header: {:?}, {} vertices, {} properties",
        schema.format,
        schema.vertex_count,
        schema.properties.len()
    );
    Ok(schema)
}
