//! Loading of meshes, textures and shader sources from the asset directory.
//!
//! All file access goes through the async [`load_binary`] / [`load_string`] helpers so the
//! two nodes' assets can be read concurrently during startup.

use std::path::Path;

use crate::{
    data_structures::{
        mesh::MeshDataset,
        texture::{Texture, TextureData},
    },
    error::{ImportError, ShaderError, TextureError},
};

pub mod gltf;
pub mod obj;

pub async fn load_string(path: &Path) -> std::io::Result<String> {
    tokio::fs::read_to_string(path).await
}

pub async fn load_binary(path: &Path) -> std::io::Result<Vec<u8>> {
    tokio::fs::read(path).await
}

/// Import a static triangle mesh, picking the importer from the file extension.
///
/// The result is a flat triangle list with every populated attribute sized `vertex_count`.
pub async fn import_mesh(path: &Path) -> Result<MeshDataset, ImportError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let dataset = match extension.as_deref() {
        Some("obj") => obj::import(path).await?,
        Some("gltf") | Some("glb") => gltf::import(path).await?,
        _ => return Err(ImportError::UnsupportedFormat(path.to_path_buf())),
    };

    if dataset.is_empty() {
        return Err(ImportError::Empty(path.to_path_buf()));
    }
    if let Some((attribute, found)) = dataset.mismatched_attribute() {
        return Err(ImportError::AttributeMismatch {
            path: path.to_path_buf(),
            attribute,
            expected: dataset.vertex_count,
            found,
        });
    }
    Ok(dataset)
}

pub async fn load_texture_data(path: &Path) -> Result<TextureData, TextureError> {
    let bytes = load_binary(path).await.map_err(|source| TextureError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let data = TextureData::decode(path, &bytes)?;
    log::info!(
        "Loaded texture {} ({}x{}, {} mip levels)",
        path.display(),
        data.width(),
        data.height(),
        data.mip_level_count()
    );
    Ok(data)
}

pub async fn load_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    path: &Path,
    unit: u32,
    sampler_name: &str,
) -> Result<Texture, TextureError> {
    let data = load_texture_data(path).await?;
    Texture::from_data(device, queue, &data, unit, sampler_name)
}

pub async fn load_shader(path: &Path) -> Result<String, ShaderError> {
    load_string(path).await.map_err(|source| ShaderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_extension_is_rejected_before_reading() {
        let err = import_mesh(Path::new("does/not/exist.fbx")).await.unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn missing_obj_is_an_io_error() {
        let err = import_mesh(Path::new("does/not/exist.obj")).await.unwrap_err();
        assert!(matches!(err, ImportError::Io { .. }));
    }

    #[tokio::test]
    async fn missing_texture_is_an_io_error() {
        let err = load_texture_data(Path::new("does/not/exist.png")).await.unwrap_err();
        assert!(matches!(err, TextureError::Io { .. }));
    }
}
