use glam::Vec3;

use crate::math::Mesh;
use crate::scene::cache::CacheKey;

/// Physically shaded surface parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// sRGB hex color, e.g. `0xaa8844`.
    pub color: u32,
    pub clearcoat: f32,
    pub metalness: f32,
    pub roughness: f32,
}

impl Material {
    pub const FRACTAL: Self = Self {
        color: 0xaa8844,
        clearcoat: 1.0,
        metalness: 1.0,
        roughness: 0.5,
    };

    pub fn base_color_linear(&self) -> [f32; 3] {
        let channel = |shift: u32| srgb_to_linear(((self.color >> shift) & 0xff) as f32 / 255.0);
        [channel(16), channel(8), channel(0)]
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::FRACTAL
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// A finished, renderable fractal. Shared read-only once cached.
#[derive(Debug)]
pub struct MeshObject {
    pub key: CacheKey,
    pub mesh: Mesh,
    pub face_normals: Vec<Vec3>,
    pub material: Material,
}

impl MeshObject {
    pub fn new(key: CacheKey, mesh: Mesh, material: Material) -> Self {
        let face_normals = mesh.face_normals();
        Self {
            key,
            mesh,
            face_normals,
            material,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_color_unpacks_in_order() {
        let material = Material {
            color: 0xff0000,
            ..Material::FRACTAL
        };
        let [r, g, b] = material.base_color_linear();
        assert!((r - 1.0).abs() < 1e-6);
        assert_eq!(g, 0.0);
        assert_eq!(b, 0.0);
    }

    #[test]
    fn fractal_material_is_dimmer_in_linear_space() {
        let [r, g, b] = Material::FRACTAL.base_color_linear();
        assert!(r > g && g > b);
        assert!(r < 0xaa as f32 / 255.0);
    }
}
