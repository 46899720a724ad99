//! Engine data structures: meshes, textures and the scene graph.
//!
//! - `mesh` holds CPU mesh datasets and their GPU vertex buffers
//! - `texture` holds decoded mip chains and the GPU texture wrapper
//! - `scene_graph` composes node transforms into world matrices

pub mod mesh;
pub mod scene_graph;
pub mod texture;
