//! Scene configuration.
//!
//! Every field has a default that reproduces the classic windmill demo, so an empty JSON
//! object (or no file at all) is a valid configuration. Paths are relative to `asset_root`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::camera::ViewModel;
use crate::error::InitError;

/// Assets for one scene node: the mesh, its texture and the shader that draws it.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct NodeAssets {
    pub mesh: PathBuf,
    pub texture: PathBuf,
    pub shader: PathBuf,
    /// Logical texture unit written into the node's `texture_num` uniform.
    pub texture_unit: u32,
    /// Texture binding the node's shader samples; checked against the shader source at init.
    pub sampler_name: String,
}

impl Default for NodeAssets {
    fn default() -> Self {
        Self {
            mesh: PathBuf::new(),
            texture: PathBuf::new(),
            shader: PathBuf::new(),
            texture_unit: 0,
            sampler_name: String::new(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub asset_root: PathBuf,
    pub root: NodeAssets,
    pub child: NodeAssets,
    pub clear_colour: [f64; 3],
    pub view_model: ViewModel,
    /// Camera units per key press.
    pub camera_speed: f32,
    /// Degrees of yaw/pitch per key press.
    pub look_step: f32,
    /// Root translation per key press.
    pub root_step: f32,
    /// Blade rotation rate in degrees per second (applied as a decrement).
    pub spin_rate: f32,
    /// Extra blade rotation in degrees per `p` press or repeat.
    pub spin_boost: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            title: "Windmill".to_string(),
            width: 800,
            height: 600,
            asset_root: PathBuf::from("assets"),
            root: NodeAssets {
                mesh: "windmill.gltf".into(),
                texture: "brown.jpg".into(),
                shader: "shaders/windmill.wgsl".into(),
                texture_unit: 0,
                sampler_name: "basic_texture".to_string(),
            },
            child: NodeAssets {
                mesh: "arms.gltf".into(),
                texture: "texture3.jpg".into(),
                shader: "shaders/blades.wgsl".into(),
                texture_unit: 1,
                sampler_name: "metal_texture".to_string(),
            },
            clear_colour: [0.5, 0.5, 0.5],
            view_model: ViewModel::EulerApprox,
            camera_speed: 0.5,
            look_step: 0.15,
            root_step: 1.0,
            spin_rate: 20.0,
            spin_boost: 2.0,
        }
    }
}

impl SceneConfig {
    pub fn from_json(text: &str) -> Result<Self, InitError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| InitError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, InitError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| InitError::Config(format!("{}: {e}", path.display())))?;
        log::info!("Loading scene configuration from {}", path.display());
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), InitError> {
        if self.width == 0 || self.height == 0 {
            return Err(InitError::Config(format!(
                "window size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        for (name, node) in [("root", &self.root), ("child", &self.child)] {
            if node.mesh.as_os_str().is_empty() || node.shader.as_os_str().is_empty() {
                return Err(InitError::Config(format!(
                    "{name} node needs both a mesh and a shader"
                )));
            }
            if node.texture.as_os_str().is_empty() {
                return Err(InitError::Config(format!("{name} node needs a texture")));
            }
            if node.sampler_name.is_empty() {
                return Err(InitError::Config(format!("{name} node needs a sampler_name")));
            }
        }
        if self.root.texture_unit == self.child.texture_unit {
            log::warn!(
                "root and child share texture unit {}; texture_num will not distinguish them",
                self.root.texture_unit
            );
        }
        Ok(())
    }

    /// Resolve a node-relative path against the asset root.
    pub fn asset_path(&self, relative: &Path) -> PathBuf {
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            self.asset_root.join(relative)
        }
    }

    pub fn clear_colour(&self) -> wgpu::Color {
        let [r, g, b] = self.clear_colour;
        wgpu::Color { r, g, b, a: 1.0 }
    }
}
