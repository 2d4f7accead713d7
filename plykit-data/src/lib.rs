//! Plykit Data Crate
//!
//! PLY point-cloud parsing and re-encoding for photogrammetry output.
//! This crate is renderer-agnostic and focuses on the codec: header
//! parsing, vertex decoding, Gaussian-splat export, and format repair.

pub mod error;
pub mod fixer;
pub mod ply;
pub mod splat;

pub use error::PlyError;
pub use fixer::{OutputFormat, fix_ply_file, write_ascii_ply, write_binary_ply};
pub use ply::{
    PlyFormat, PropertyDecl, ScalarType, VertexRecord, VertexSchema, decode_vertices,
    parse_header, read_vertex_ply,
};
pub use splat::{SH_C0, SplatPoint, convert_ply_to_splat, splat_points, write_gaussian_splat_ply};
