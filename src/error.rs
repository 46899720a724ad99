//! Error taxonomy for loading, uploading and rendering.
//!
//! Every failure during initialization is fatal: the app converts any of these into an
//! [`InitError`] and exits with [`InitError::exit_code`]. Nothing here is retried.

use std::path::PathBuf;

use thiserror::Error;

/// A mesh asset could not be turned into a [`crate::data_structures::mesh::MeshDataset`].
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("could not read mesh asset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse OBJ asset {path}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
    #[error("could not parse glTF asset {path}: {source}")]
    Gltf {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },
    #[error("unsupported mesh format: {0} (expected .obj, .gltf or .glb)")]
    UnsupportedFormat(PathBuf),
    #[error("mesh asset {0} contains no triangles")]
    Empty(PathBuf),
    #[error("mesh asset {path}: {attribute} has {found} entries but the sub-mesh has {expected} vertices")]
    AttributeMismatch {
        path: PathBuf,
        attribute: &'static str,
        expected: usize,
        found: usize,
    },
}

/// An image file could not be decoded into a texture.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("could not read texture {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not decode texture {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("texture {0} has a zero-sized dimension")]
    ZeroSized(PathBuf),
    #[error("texture {path} is {width}x{height}, larger than the device limit of {max}")]
    TooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max: u32,
    },
}

/// A dataset does not fit the fixed three-attribute vertex layout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeshError {
    #[error("mesh has no vertices")]
    Empty,
    #[error("attribute `{attribute}` has {found} entries, expected {expected}")]
    MissingAttribute {
        attribute: &'static str,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("node `{name}` names parent {parent}, but only {len} nodes precede it")]
    ParentOutOfOrder {
        name: String,
        parent: usize,
        len: usize,
    },
}

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("could not read shader source {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("shader `{label}` failed to compile:\n{diagnostics}")]
    Compile { label: String, diagnostics: String },
    #[error("shader `{label}` declares no texture binding named `{texture}`")]
    MissingTexture { label: String, texture: String },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
    #[error("no GPU resources registered for scene node {0}")]
    UnknownNode(usize),
}

/// Anything that stops the app before the event loop starts.
#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Texture(#[from] TextureError),
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error("required GPU capability missing: {0}")]
    ExtensionMissing(String),
    #[error("could not create surface: {0}")]
    Surface(String),
    #[error("could not create device: {0}")]
    Device(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl InitError {
    /// Process exit code for a failed startup.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_init_failure_exits_with_one() {
        let errors = [
            InitError::ExtensionMissing("anisotropic filtering".into()),
            InitError::Shader(ShaderError::Compile {
                label: "windmill".into(),
                diagnostics: "error: expected ';'".into(),
            }),
            InitError::Mesh(MeshError::Empty),
            InitError::Import(ImportError::Empty("arms.obj".into())),
        ];
        for err in errors {
            assert_eq!(err.exit_code(), 1, "{err}");
        }
    }

    #[test]
    fn shader_error_keeps_full_diagnostics() {
        let err = ShaderError::Compile {
            label: "blades".into(),
            diagnostics: "line 3: unknown identifier `vt`\nline 9: type mismatch".into(),
        };
        let text = err.to_string();
        assert!(text.contains("unknown identifier `vt`"));
        assert!(text.contains("type mismatch"));
    }
}
