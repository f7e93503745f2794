//! Owns the live scene and the state the control panel manipulates: current
//! recursion level, rotation flag, and the injected mesh source.

use std::rc::Rc;

use glam::Quat;
use thiserror::Error;

use crate::config::FractalConfig;
use crate::math::MeshError;
use crate::scene::cache::MeshSource;
use crate::scene::graph::{PointLight, Scene, SceneNode};
use crate::scene::object::MeshObject;

pub const MIN_LEVEL: u32 = 1;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LevelError {
    #[error("Level cannot be less than 0")]
    AtFloor,

    #[error("level {0} is the configured maximum")]
    AtCeiling(u32),

    #[error(transparent)]
    Build(#[from] MeshError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverPhase {
    Initializing,
    Running,
}

pub struct SceneDriver<S: MeshSource> {
    phase: DriverPhase,
    scene: Scene,
    source: S,
    current: Rc<MeshObject>,
    level: u32,
    max_level: u32,
    side: f32,
    rotating: bool,
    initial_rotation: Quat,
    rotation_speed: f64,
}

impl<S: MeshSource> SceneDriver<S> {
    pub fn new(config: &FractalConfig, mut source: S) -> Result<Self, LevelError> {
        let max_level = config.max_level.max(MIN_LEVEL);
        let level = config.initial_level.clamp(MIN_LEVEL, max_level);
        let initial_rotation = Quat::from_rotation_y(config.initial_rotation_deg.to_radians());

        let current = source.get_or_build(level, config.side)?;
        let mut scene = Scene::with_lights(PointLight::default_rig());
        scene.add(SceneNode::new(Rc::clone(&current), initial_rotation));

        Ok(Self {
            phase: DriverPhase::Initializing,
            scene,
            source,
            current,
            level,
            max_level,
            side: config.side,
            rotating: config.rotating,
            initial_rotation,
            rotation_speed: config.rotation_speed as f64,
        })
    }

    /// Marks one-time setup as done. Further calls are no-ops.
    pub fn start(&mut self) {
        if self.phase == DriverPhase::Initializing {
            log::info!("scene running at level {}", self.display_level());
            self.phase = DriverPhase::Running;
        }
    }

    /// Per-frame update. Spins every top-level node about Y when rotation is on.
    pub fn tick(&mut self, wall_clock_ms: f64) {
        if self.phase != DriverPhase::Running || !self.rotating {
            return;
        }

        let angle = (wall_clock_ms * self.rotation_speed).rem_euclid(std::f64::consts::TAU) as f32;
        let rotation = Quat::from_rotation_y(angle);
        for node in self.scene.nodes_mut() {
            node.rotation = rotation;
        }
    }

    pub fn increase_level(&mut self) -> Result<u32, LevelError> {
        if self.level >= self.max_level {
            return Err(LevelError::AtCeiling(self.display_level()));
        }
        self.switch_to(self.level + 1)
    }

    pub fn decrease_level(&mut self) -> Result<u32, LevelError> {
        if self.level <= MIN_LEVEL {
            return Err(LevelError::AtFloor);
        }
        self.switch_to(self.level - 1)
    }

    /// Lowers the ceiling to what the renderer can draw. The current level
    /// is kept even when it is above the new ceiling.
    pub fn cap_max_level(&mut self, deepest: u32) {
        let capped = self.max_level.min(deepest.max(MIN_LEVEL));
        if capped != self.max_level {
            log::warn!(
                "max level lowered from {} to {} to fit the device",
                self.max_level - 1,
                capped - 1
            );
            self.max_level = capped;
        }
    }

    pub fn toggle_rotation(&mut self) -> bool {
        self.rotating = !self.rotating;
        self.rotating
    }

    // Builds before touching the scene so a failed build leaves it intact.
    fn switch_to(&mut self, level: u32) -> Result<u32, LevelError> {
        let next = self.source.get_or_build(level, self.side)?;

        self.scene.remove(&self.current);
        self.scene
            .add(SceneNode::new(Rc::clone(&next), self.initial_rotation));
        self.current = next;
        self.level = level;

        log::debug!("switched to level {}", self.display_level());
        Ok(level)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn current(&self) -> &Rc<MeshObject> {
        &self.current
    }

    /// The counter shown to the user starts at zero.
    pub fn display_level(&self) -> u32 {
        self.level - MIN_LEVEL
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    pub fn is_rotating(&self) -> bool {
        self.rotating
    }

    pub fn at_floor(&self) -> bool {
        self.level <= MIN_LEVEL
    }

    pub fn at_ceiling(&self) -> bool {
        self.level >= self.max_level
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::scene::MeshCache;

    /// Counts calls while delegating to a real cache.
    pub(crate) struct CountingSource {
        pub inner: MeshCache,
        pub calls: Vec<u32>,
    }

    impl CountingSource {
        pub fn new() -> Self {
            Self {
                inner: MeshCache::default(),
                calls: Vec::new(),
            }
        }
    }

    impl MeshSource for CountingSource {
        fn get_or_build(&mut self, level: u32, side: f32) -> Result<Rc<MeshObject>, MeshError> {
            self.calls.push(level);
            self.inner.get_or_build(level, side)
        }
    }

    impl<S: MeshSource> SceneDriver<S> {
        pub(crate) fn phase(&self) -> DriverPhase {
            self.phase
        }

        pub(crate) fn level(&self) -> u32 {
            self.level
        }
    }

    pub(crate) fn config(initial_level: u32) -> FractalConfig {
        FractalConfig {
            initial_level,
            ..FractalConfig::default()
        }
    }

    #[test]
    fn starts_initializing_with_one_node() {
        let driver = SceneDriver::new(&config(2), MeshCache::default()).unwrap();

        assert_eq!(driver.phase(), DriverPhase::Initializing);
        assert_eq!(driver.level(), 2);
        assert_eq!(driver.display_level(), 1);
        assert_eq!(driver.scene().nodes().len(), 1);
        assert_eq!(driver.scene().lights().len(), 2);
        assert!(Rc::ptr_eq(&driver.scene().nodes()[0].object, driver.current()));
    }

    #[test]
    fn new_node_gets_initial_rotation() {
        let driver = SceneDriver::new(&config(1), MeshCache::default()).unwrap();
        let expected = Quat::from_rotation_y(60f32.to_radians());
        assert!(driver.scene().nodes()[0].rotation.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn increase_then_decrease_reuses_cached_mesh() {
        let mut driver = SceneDriver::new(&config(2), MeshCache::default()).unwrap();
        let level_two = Rc::clone(driver.current());

        assert_eq!(driver.increase_level(), Ok(3));
        assert_eq!(driver.source().stats().misses, 2);
        assert_eq!(driver.source().stats().hits, 0);
        assert_eq!(driver.scene().nodes().len(), 1);
        assert_eq!(driver.current().mesh.face_count(), 64);

        assert_eq!(driver.decrease_level(), Ok(2));
        assert_eq!(driver.source().stats().misses, 2);
        assert_eq!(driver.source().stats().hits, 1);
        assert!(Rc::ptr_eq(driver.current(), &level_two));
        assert!(Rc::ptr_eq(&driver.scene().nodes()[0].object, &level_two));
    }

    #[test]
    fn decrease_at_floor_changes_nothing() {
        let mut driver = SceneDriver::new(&config(1), CountingSource::new()).unwrap();
        let before = Rc::clone(driver.current());

        assert_eq!(driver.decrease_level(), Err(LevelError::AtFloor));
        assert_eq!(driver.level(), 1);
        assert!(Rc::ptr_eq(driver.current(), &before));
        assert_eq!(driver.scene().nodes().len(), 1);
        assert_eq!(driver.source().calls, vec![1]);
    }

    #[test]
    fn increase_stops_at_max_level() {
        let cfg = FractalConfig {
            initial_level: 2,
            max_level: 3,
            ..FractalConfig::default()
        };
        let mut driver = SceneDriver::new(&cfg, CountingSource::new()).unwrap();

        assert_eq!(driver.increase_level(), Ok(3));
        assert!(driver.at_ceiling());
        assert_eq!(driver.increase_level(), Err(LevelError::AtCeiling(2)));
        assert_eq!(driver.level(), 3);
        assert_eq!(driver.source().calls, vec![2, 3]);
    }

    #[test]
    fn device_cap_lowers_the_ceiling_only() {
        let cfg = FractalConfig {
            initial_level: 3,
            max_level: 8,
            ..FractalConfig::default()
        };
        let mut driver = SceneDriver::new(&cfg, MeshCache::default()).unwrap();

        driver.cap_max_level(12);
        assert_eq!(driver.max_level(), 8);

        driver.cap_max_level(4);
        assert_eq!(driver.max_level(), 4);
        assert_eq!(driver.increase_level(), Ok(4));
        assert_eq!(driver.increase_level(), Err(LevelError::AtCeiling(3)));

        driver.cap_max_level(0);
        assert_eq!(driver.max_level(), MIN_LEVEL);
        assert_eq!(driver.level(), 4);
    }

    #[test]
    fn initial_level_is_clamped() {
        let cfg = FractalConfig {
            initial_level: 12,
            max_level: 4,
            ..FractalConfig::default()
        };
        let driver = SceneDriver::new(&cfg, MeshCache::default()).unwrap();
        assert_eq!(driver.level(), 4);
    }

    #[test]
    fn build_failure_surfaces_and_keeps_scene() {
        let cfg = FractalConfig {
            side: -5.0,
            ..FractalConfig::default()
        };
        let err = SceneDriver::new(&cfg, MeshCache::default()).err();
        assert_eq!(err, Some(LevelError::Build(MeshError::InvalidSide(-5.0))));
    }

    #[test]
    fn tick_rotates_only_while_running_and_enabled() {
        let mut driver = SceneDriver::new(&config(1), MeshCache::default()).unwrap();
        let initial = driver.scene().nodes()[0].rotation;

        driver.toggle_rotation();
        driver.tick(1000.0);
        assert_eq!(driver.scene().nodes()[0].rotation, initial);

        driver.start();
        assert_eq!(driver.phase(), DriverPhase::Running);
        driver.tick(1000.0);
        let expected = Quat::from_rotation_y(0.4);
        assert!(driver.scene().nodes()[0].rotation.abs_diff_eq(expected, 1e-6));

        assert!(!driver.toggle_rotation());
        driver.tick(2000.0);
        assert!(driver.scene().nodes()[0].rotation.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn toggle_rotation_leaves_mesh_alone() {
        let mut driver = SceneDriver::new(&config(2), CountingSource::new()).unwrap();
        let before = Rc::clone(driver.current());

        assert!(driver.toggle_rotation());
        assert!(!driver.toggle_rotation());
        assert!(Rc::ptr_eq(driver.current(), &before));
        assert_eq!(driver.source().calls.len(), 1);
    }
}
