//! Keyboard bindings.
//!
//! | key       | command                          |
//! |-----------|----------------------------------|
//! | G / V     | move windmill up / down          |
//! | C / B     | move windmill +x / -x            |
//! | W/S/A/D   | camera forward/back/left/right   |
//! | J / L     | yaw -step / +step                |
//! | I / K     | pitch +step / -step              |
//! | P         | +2° blade spin per press/repeat  |
//! | Escape    | quit                             |

use cgmath::Vector3;
use winit::{
    event::{ElementState, KeyEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::camera::Movement;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SceneCommand {
    /// Unit direction, scaled by the configured root step.
    TranslateRoot(Vector3<f32>),
    MoveCamera(Movement),
    /// Signs of the yaw and pitch change, scaled by the configured look step.
    Look { yaw: f32, pitch: f32 },
    SpinBoost,
    Exit,
}

/// Map a key transition to a command. Presses and auto-repeats act the same; releases do
/// nothing, so letting go of `P` ends the boost without touching the blade angle.
pub fn command_for(key: KeyCode, state: ElementState) -> Option<SceneCommand> {
    if state == ElementState::Released {
        return None;
    }
    let command = match key {
        KeyCode::KeyG => SceneCommand::TranslateRoot(Vector3::new(0.0, 1.0, 0.0)),
        KeyCode::KeyV => SceneCommand::TranslateRoot(Vector3::new(0.0, -1.0, 0.0)),
        KeyCode::KeyC => SceneCommand::TranslateRoot(Vector3::new(1.0, 0.0, 0.0)),
        KeyCode::KeyB => SceneCommand::TranslateRoot(Vector3::new(-1.0, 0.0, 0.0)),
        KeyCode::KeyW => SceneCommand::MoveCamera(Movement::Forward),
        KeyCode::KeyS => SceneCommand::MoveCamera(Movement::Backward),
        KeyCode::KeyA => SceneCommand::MoveCamera(Movement::Left),
        KeyCode::KeyD => SceneCommand::MoveCamera(Movement::Right),
        KeyCode::KeyJ => SceneCommand::Look {
            yaw: -1.0,
            pitch: 0.0,
        },
        KeyCode::KeyL => SceneCommand::Look {
            yaw: 1.0,
            pitch: 0.0,
        },
        KeyCode::KeyI => SceneCommand::Look {
            yaw: 0.0,
            pitch: 1.0,
        },
        KeyCode::KeyK => SceneCommand::Look {
            yaw: 0.0,
            pitch: -1.0,
        },
        KeyCode::KeyP => SceneCommand::SpinBoost,
        KeyCode::Escape => SceneCommand::Exit,
        _ => return None,
    };
    Some(command)
}

pub fn command_for_event(event: &KeyEvent) -> Option<SceneCommand> {
    match event.physical_key {
        PhysicalKey::Code(code) => command_for(code, event.state),
        PhysicalKey::Unidentified(_) => None,
    }
}
