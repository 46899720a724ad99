//! windmill-ngin
//!
//! A small hierarchical scene renderer: a windmill mesh carries a set of spinning blades
//! through a parent-relative transform, and a free-flying camera looks at both.
//!
//! High-level modules
//! - `camera`: free camera, view matrix models and the perspective projection
//! - `config`: scene configuration with demo defaults, loaded from JSON
//! - `context`: window, surface, device and shared bind group layouts
//! - `data_structures`: mesh datasets and GPU meshes, textures, the scene graph
//! - `error`: error types for loading, uploading and rendering
//! - `flow`: startup and the winit event loop
//! - `input`: keyboard bindings
//! - `pipelines`: the per-node render pipeline and its uniform
//! - `render`: the `Renderer` seam and the per-frame draw loop
//! - `resources`: async loading of meshes, textures and shader sources
//! - `state`: the mutable scene state shared by input, update and draw
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod input;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod state;

pub use cgmath;
pub use wgpu;
pub use winit::event::WindowEvent;
pub use winit::keyboard::KeyCode;
