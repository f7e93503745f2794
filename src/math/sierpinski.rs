//! Recursive Sierpinski tetrahedron subdivision.
//!
//! Every level replaces a tetrahedron by four half-size copies anchored at
//! its base corner and at the midpoints of the three edges leaving that
//! corner. Only the leaves emit geometry, four unshared vertices and four
//! faces each, so a build at level `n` holds `4^n` vertices and `4^n` faces.

use glam::Vec3;

use crate::math::error::MeshError;
use crate::math::mesh::{Face, Mesh};

/// sin(π/3), the height of an equilateral triangle with unit side.
pub const SIN_PI_3: f32 = 0.866_025_4;

/// Deepest level whose vertex count still fits a `u32` index.
pub const MAX_BUILD_LEVEL: u32 = 15;

// Outward winding for corners [v0, v1, v2 (apex), v3].
const LEAF_FACES: [[u32; 3]; 4] = [[0, 2, 1], [1, 2, 3], [3, 2, 0], [0, 1, 3]];

/// The four corners of a tetrahedron whose base corner sits at `origin`.
pub fn corners(side: f32, origin: Vec3) -> [Vec3; 4] {
    let v1 = origin + Vec3::new(side, 0.0, 0.0);
    let v2 = origin + Vec3::new(side / 2.0, side * SIN_PI_3, side / (SIN_PI_3 * 4.0));
    let v3 = origin + Vec3::new(side / 2.0, 0.0, side * SIN_PI_3);
    [origin, v1, v2, v3]
}

/// Base corner that centres the root tetrahedron's footprint on the Y axis.
pub fn canonical_origin(side: f32) -> Vec3 {
    Vec3::new(-side / 2.0, 0.0, -side / (SIN_PI_3 * 4.0))
}

fn half(a: Vec3, b: Vec3) -> Vec3 {
    (a + b) / 2.0
}

pub fn leaf_count(level: u32) -> usize {
    4usize.pow(level.saturating_sub(1))
}

/// Append-only accumulator for one subdivision run.
pub struct MeshBuilder {
    mesh: Mesh,
}

impl MeshBuilder {
    pub fn for_level(level: u32) -> Self {
        let leaves = leaf_count(level);
        Self {
            mesh: Mesh::with_capacity(leaves * 4, leaves * 4),
        }
    }

    pub fn subdivide(&mut self, level: u32, side: f32, origin: Vec3) {
        let [v0, v1, v2, v3] = corners(side, origin);

        if level <= 1 {
            self.push_leaf([v0, v1, v2, v3]);
            return;
        }

        let half_side = side / 2.0;
        for child in [v0, half(v0, v1), half(v0, v2), half(v0, v3)] {
            self.subdivide(level - 1, half_side, child);
        }
    }

    fn push_leaf(&mut self, corners: [Vec3; 4]) {
        let base = self.mesh.vertices.len() as u32;
        self.mesh.vertices.extend_from_slice(&corners);
        self.mesh.faces.extend(
            LEAF_FACES
                .iter()
                .map(|&[a, b, c]| Face::offset(base, a, b, c)),
        );
    }

    pub fn finish(self) -> Mesh {
        self.mesh
    }
}

/// Builds the fractal mesh for `level` with root edge `side` anchored at
/// `origin`. Pure: identical inputs produce identical meshes.
pub fn build(level: u32, side: f32, origin: Vec3) -> Result<Mesh, MeshError> {
    if level == 0 {
        return Err(MeshError::InvalidLevel(level));
    }
    if level > MAX_BUILD_LEVEL {
        return Err(MeshError::TooDeep(level));
    }
    if !side.is_finite() || side <= 0.0 {
        return Err(MeshError::InvalidSide(side));
    }

    let mut builder = MeshBuilder::for_level(level);
    builder.subdivide(level, side, origin);
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    #[test]
    fn sin_constant_matches_trig() {
        assert!((SIN_PI_3 - std::f32::consts::FRAC_PI_3.sin()).abs() < 1e-7);
    }

    #[test]
    fn level_one_is_a_single_tetrahedron() {
        let origin = Vec3::new(-250.0, 0.0, -144.34);
        let mesh = build(1, 500.0, origin).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 4);
        assert_eq!(mesh.vertices[0], origin);
        assert!((mesh.vertices[1].x - 250.0).abs() < EPS);
        assert!((mesh.vertices[2].y - 500.0 * SIN_PI_3).abs() < EPS);
    }

    #[test]
    fn counts_quadruple_per_level() {
        for level in 1..=6 {
            let mesh = build(level, 10.0, Vec3::ZERO).unwrap();
            let expected = 4usize.pow(level);
            assert_eq!(mesh.vertex_count(), expected, "vertices at level {level}");
            assert_eq!(mesh.face_count(), expected, "faces at level {level}");
            assert_eq!(leaf_count(level) * 4, expected);
        }
    }

    #[test]
    fn faces_index_inside_their_own_leaf() {
        let mesh = build(3, 1.0, Vec3::ZERO).unwrap();
        for (i, face) in mesh.faces.iter().enumerate() {
            let leaf = (i / 4) as u32;
            assert!(face.0.iter().all(|&v| v / 4 == leaf));
        }
    }

    #[test]
    fn normals_point_away_from_each_leaf() {
        let mesh = build(3, 500.0, canonical_origin(500.0)).unwrap();
        let normals = mesh.face_normals();

        for (leaf, chunk) in mesh.vertices.chunks(4).enumerate() {
            let centroid = chunk.iter().copied().sum::<Vec3>() / 4.0;
            for f in leaf * 4..leaf * 4 + 4 {
                let [a, _, _] = mesh.triangle(mesh.faces[f]);
                assert!(normals[f].dot(a - centroid) > 0.0, "face {f} points inward");
            }
        }
    }

    #[test]
    fn builds_are_deterministic() {
        let origin = canonical_origin(300.0);
        let first = build(4, 300.0, origin).unwrap();
        let second = build(4, 300.0, origin).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn children_fill_the_parent_bounds() {
        let side = 8.0;
        let parent = build(1, side, Vec3::ZERO).unwrap();
        let children = build(2, side, Vec3::ZERO).unwrap();

        let (pmin, pmax) = parent.bounds().unwrap();
        let (cmin, cmax) = children.bounds().unwrap();
        assert!(pmin.abs_diff_eq(cmin, EPS));
        assert!(pmax.abs_diff_eq(cmax, EPS));

        // second child starts halfway along the v0-v1 edge
        assert!(children.vertices[4].abs_diff_eq(Vec3::new(side / 2.0, 0.0, 0.0), EPS));
    }

    #[test]
    fn canonical_origin_centres_the_base() {
        let side = 500.0;
        let origin = canonical_origin(side);
        assert!((origin.x + 250.0).abs() < EPS);
        assert!((origin.z + 144.34).abs() < 0.01);

        let [v0, v1, _, v3] = corners(side, origin);
        let base_centroid = (v0 + v1 + v3) / 3.0;
        assert!(base_centroid.x.abs() < EPS);
        assert!(base_centroid.z.abs() < EPS);
    }

    #[test]
    fn rejects_invalid_input() {
        assert_eq!(build(0, 1.0, Vec3::ZERO), Err(MeshError::InvalidLevel(0)));
        assert_eq!(build(1, 0.0, Vec3::ZERO), Err(MeshError::InvalidSide(0.0)));
        assert_eq!(build(1, -3.0, Vec3::ZERO), Err(MeshError::InvalidSide(-3.0)));
        assert!(matches!(build(1, f32::NAN, Vec3::ZERO), Err(MeshError::InvalidSide(_))));
        assert_eq!(build(16, 1.0, Vec3::ZERO), Err(MeshError::TooDeep(16)));
    }
}
