use std::collections::HashMap;
use std::rc::Rc;

use crate::math::{MeshError, build, canonical_origin};
use crate::scene::object::{Material, MeshObject};

/// Structural `(level, side)` key. The side is compared by bit pattern so two
/// keys are equal exactly when the builder would see identical input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub level: u32,
    side_bits: u32,
}

impl CacheKey {
    pub fn new(level: u32, side: f32) -> Self {
        Self {
            level,
            side_bits: side.to_bits(),
        }
    }

    pub fn side(&self) -> f32 {
        f32::from_bits(self.side_bits)
    }
}

/// Anything that can hand out a fractal object for `(level, side)`.
pub trait MeshSource {
    fn get_or_build(&mut self, level: u32, side: f32) -> Result<Rc<MeshObject>, MeshError>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Unbounded memo of built fractal objects. Entries live as long as the cache.
pub struct MeshCache {
    entries: HashMap<CacheKey, Rc<MeshObject>>,
    material: Material,
    hits: u64,
    misses: u64,
}

impl MeshCache {
    pub fn new(material: Material) -> Self {
        Self {
            entries: HashMap::new(),
            material,
            hits: 0,
            misses: 0,
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}

impl Default for MeshCache {
    fn default() -> Self {
        Self::new(Material::FRACTAL)
    }
}

impl MeshSource for MeshCache {
    fn get_or_build(&mut self, level: u32, side: f32) -> Result<Rc<MeshObject>, MeshError> {
        let key = CacheKey::new(level, side);

        if let Some(object) = self.entries.get(&key) {
            self.hits += 1;
            log::debug!("mesh cache hit for level {level}, side {side}");
            return Ok(Rc::clone(object));
        }

        let mesh = build(level, side, canonical_origin(side))?;
        log::info!(
            "built level {level} fractal: {} vertices, {} faces",
            mesh.vertex_count(),
            mesh.face_count()
        );

        let object = Rc::new(MeshObject::new(key, mesh, self.material));
        self.entries.insert(key, Rc::clone(&object));
        self.misses += 1;
        Ok(object)
    }
}
