//! PLY schema parsing and vertex decoding.

mod decode;
mod header;

pub use decode::{VertexRecord, decode_vertices, read_vertex_ply};
pub use header::{PlyFormat, PropertyDecl, ScalarType, VertexSchema, parse_header};
