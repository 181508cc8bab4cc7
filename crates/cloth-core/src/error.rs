//! Error types for cloth construction.
//!
//! Only building or replacing a cloth can fail. A simulation step never
//! returns an error: degenerate geometry degrades to a skipped correction.

use thiserror::Error;

/// Errors raised while validating mesh input.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClothError {
    /// Position buffer length is not a multiple of 3.
    #[error("position buffer length {0} is not a multiple of 3")]
    PositionsNotTriples(usize),

    /// Mesh has no triangles.
    #[error("mesh has no triangles")]
    EmptyIndices,

    /// Index buffer length is not a multiple of 3.
    #[error("index buffer length {0} is not a multiple of 3")]
    IndicesNotTriangles(usize),

    /// A triangle references a vertex that does not exist.
    #[error("vertex index {index} out of range (vertex count: {count})")]
    IndexOutOfRange { index: u32, count: usize },

    /// An attach pair references a vertex that does not exist.
    #[error("attach pair ({0}, {1}) references a missing vertex")]
    AttachmentOutOfRange(u32, u32),

    /// Collision thickness must be positive and finite.
    #[error("invalid thickness: {0} (must be positive and finite)")]
    InvalidThickness(f32),
}

/// Result type for cloth construction.
pub type ClothResult<T> = std::result::Result<T, ClothError>;
