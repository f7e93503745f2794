use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    #[error("recursion level must be at least 1, got {0}")]
    InvalidLevel(u32),

    #[error("side length must be finite and positive, got {0}")]
    InvalidSide(f32),

    #[error("level {0} would produce more faces than fit in a 32-bit index")]
    TooDeep(u32),
}
