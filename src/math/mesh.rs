use glam::Vec3;

pub type Vertex = Vec3;

/// Triangle as three indices into [`Mesh::vertices`]. Counter-clockwise
/// winding seen from outside the solid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Face(pub [u32; 3]);

impl Face {
    pub fn offset(base: u32, a: u32, b: u32, c: u32) -> Self {
        Self([base + a, base + b, base + c])
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub faces: Vec<Face>,
}

impl Mesh {
    pub fn with_capacity(vertices: usize, faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            faces: Vec::with_capacity(faces),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn triangle(&self, face: Face) -> [Vec3; 3] {
        let [a, b, c] = face.0;
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.faces.iter().map(|&face| self.triangle(face))
    }

    /// One unit normal per face, following the winding order.
    pub fn face_normals(&self) -> Vec<Vec3> {
        self.triangles()
            .map(|[a, b, c]| (b - a).cross(c - a).normalize_or_zero())
            .collect()
    }
}

#[cfg(test)]
impl Mesh {
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.vertices.first()?;
        Some(
            self.vertices
                .iter()
                .fold((first, first), |(min, max), v| (min.min(*v), max.max(*v))),
        )
    }
}
