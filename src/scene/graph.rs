use std::rc::Rc;

use glam::{Mat4, Quat, Vec3};

use crate::scene::object::MeshObject;

/// A placed fractal. The transform belongs to the node, never to the shared
/// object.
#[derive(Clone, Debug)]
pub struct SceneNode {
    pub object: Rc<MeshObject>,
    pub rotation: Quat,
}

impl SceneNode {
    pub fn new(object: Rc<MeshObject>, rotation: Quat) -> Self {
        Self { object, rotation }
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.rotation)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl PointLight {
    /// Strong key light above the fractal and a faint fill light below it.
    pub fn default_rig() -> [PointLight; 2] {
        [
            PointLight {
                position: Vec3::new(0.0, 1000.0, 0.0),
                color: Vec3::ONE,
                intensity: 10.0,
            },
            PointLight {
                position: Vec3::new(0.0, -1000.0, 0.0),
                color: Vec3::ONE,
                intensity: 1.0,
            },
        ]
    }
}

#[derive(Default)]
pub struct Scene {
    nodes: Vec<SceneNode>,
    lights: Vec<PointLight>,
}

impl Scene {
    pub fn with_lights(lights: impl IntoIterator<Item = PointLight>) -> Self {
        Self {
            nodes: Vec::new(),
            lights: lights.into_iter().collect(),
        }
    }

    pub fn add(&mut self, node: SceneNode) {
        self.nodes.push(node);
    }

    /// Removes every node showing `object`. Returns whether anything was removed.
    pub fn remove(&mut self, object: &Rc<MeshObject>) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|node| !Rc::ptr_eq(&node.object, object));
        self.nodes.len() != before
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [SceneNode] {
        &mut self.nodes
    }

    pub fn lights(&self) -> &[PointLight] {
        &self.lights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MeshCache, MeshSource};

    #[test]
    fn remove_matches_by_identity() {
        let mut cache = MeshCache::default();
        let a = cache.get_or_build(1, 10.0).unwrap();
        let b = cache.get_or_build(2, 10.0).unwrap();

        let mut scene = Scene::default();
        scene.add(SceneNode::new(Rc::clone(&a), Quat::IDENTITY));
        scene.add(SceneNode::new(Rc::clone(&b), Quat::IDENTITY));

        assert!(scene.remove(&a));
        assert!(!scene.remove(&a));
        assert_eq!(scene.nodes().len(), 1);
        assert!(Rc::ptr_eq(&scene.nodes()[0].object, &b));
    }

    #[test]
    fn model_matrix_applies_rotation() {
        let mut cache = MeshCache::default();
        let object = cache.get_or_build(1, 10.0).unwrap();
        let node = SceneNode::new(object, Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));

        let rotated = node.model_matrix().transform_vector3(Vec3::X);
        assert!(rotated.abs_diff_eq(-Vec3::Z, 1e-6));
    }

    #[test]
    fn default_rig_has_key_light_above() {
        let scene = Scene::with_lights(PointLight::default_rig());
        assert_eq!(scene.lights().len(), 2);
        assert!(scene.lights()[0].position.y > 0.0);
        assert!(scene.lights()[0].intensity > scene.lights()[1].intensity);
    }
}
