pub mod cache;
pub mod driver;
pub mod graph;
pub mod object;

pub use cache::{CacheKey, MeshCache, MeshSource};
pub use driver::{LevelError, SceneDriver};
pub use graph::{PointLight, Scene, SceneNode};
pub use object::{Material, MeshObject};
