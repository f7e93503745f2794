pub mod error;
pub mod mesh;
pub mod sierpinski;

pub use error::MeshError;
pub use mesh::Mesh;
pub use sierpinski::{build, canonical_origin};
