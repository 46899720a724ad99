//! Everything that changes while the scene runs.
//!
//! [`SceneState`] is owned by the app and handed by reference to input handling, the
//! per-frame update and [`crate::render::render_frame`]. It holds no GPU objects.

use cgmath::Deg;
use instant::Duration;

use crate::{
    camera::{Camera, Projection, ViewModel},
    config::SceneConfig,
    data_structures::scene_graph::SceneGraph,
    input::SceneCommand,
};

pub const FOVY: Deg<f32> = Deg(45.0);
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 1000.0;

/// Step sizes applied per key press or repeat.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Controls {
    pub camera_speed: f32,
    pub look_step: f32,
    pub root_step: f32,
    pub spin_boost: f32,
}

impl From<&SceneConfig> for Controls {
    fn from(config: &SceneConfig) -> Self {
        Self {
            camera_speed: config.camera_speed,
            look_step: config.look_step,
            root_step: config.root_step,
            spin_boost: config.spin_boost,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SceneState {
    pub camera: Camera,
    pub projection: Projection,
    /// Node handles are indices into the app's per-node GPU resources.
    pub graph: SceneGraph<usize>,
    pub view_model: ViewModel,
    pub clear_colour: wgpu::Color,
    pub controls: Controls,
}

impl SceneState {
    pub fn new(config: &SceneConfig) -> Self {
        let graph = SceneGraph::windmill(0, 1, config.spin_rate);
        Self {
            camera: Camera::default(),
            projection: Projection::new(config.width, config.height, FOVY, Z_NEAR, Z_FAR),
            graph,
            view_model: config.view_model,
            clear_colour: config.clear_colour(),
            controls: Controls::from(config),
        }
    }

    pub fn apply(&mut self, command: SceneCommand) {
        match command {
            SceneCommand::TranslateRoot(direction) => {
                self.graph
                    .translate_root(direction * self.controls.root_step);
            }
            SceneCommand::MoveCamera(movement) => {
                self.camera
                    .apply_translation(movement, self.controls.camera_speed);
            }
            SceneCommand::Look { yaw, pitch } => {
                let step = self.controls.look_step;
                self.camera.apply_look_delta(yaw * step, pitch * step);
            }
            SceneCommand::SpinBoost => self.graph.spin_boost(self.controls.spin_boost),
            // The event loop owns shutdown
            SceneCommand::Exit => {}
        }
    }

    pub fn update(&mut self, dt: Duration) {
        self.graph.advance(dt.as_secs_f32());
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
    }
}

#[cfg(test)]
mod tests {
    use cgmath::InnerSpace;

    use super::*;

    fn state() -> SceneState {
        SceneState::new(&SceneConfig::default())
    }

    #[test]
    fn j_turns_yaw_and_keeps_front() {
        let mut state = state();
        let front = state.camera.front();
        state.apply(SceneCommand::Look {
            yaw: -1.0,
            pitch: 0.0,
        });
        assert!((state.camera.yaw() - -90.15).abs() < 1e-4);
        assert_eq!(state.camera.pitch(), 0.0);
        assert_eq!(state.camera.front(), front);
    }

    #[test]
    fn each_spin_boost_adds_two_degrees() {
        let mut state = state();
        state.apply(SceneCommand::SpinBoost);
        state.apply(SceneCommand::SpinBoost);
        assert_eq!(state.graph.spin_angle(), Some(4.0));
    }

    #[test]
    fn root_moves_by_root_step() {
        let mut state = state();
        state.apply(SceneCommand::TranslateRoot(cgmath::Vector3::new(-1.0, 0.0, 0.0)));
        state.apply(SceneCommand::TranslateRoot(cgmath::Vector3::new(0.0, 1.0, 0.0)));
        let translation = state.graph.root_translation().unwrap();
        assert_eq!(translation, cgmath::Vector3::new(-1.0, 1.0, 0.0));
    }

    #[test]
    fn camera_moves_by_camera_speed() {
        let mut state = state();
        let start = state.camera.position;
        state.apply(SceneCommand::MoveCamera(crate::camera::Movement::Forward));
        assert!(((state.camera.position - start).magnitude() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn update_spins_blades_backwards() {
        let mut state = state();
        state.update(Duration::from_millis(500));
        assert!((state.graph.spin_angle().unwrap() - -10.0).abs() < 1e-4);
    }
}
