use std::io::{BufReader, Cursor};
use std::path::Path;

use crate::{data_structures::mesh::MeshDataset, error::ImportError, resources::load_string};

pub async fn import(path: &Path) -> Result<MeshDataset, ImportError> {
    let text = load_string(path).await.map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(path, &text).await
}

/// Parse OBJ source. Material libraries are resolved next to `path`; a missing one is
/// only a warning since materials do not contribute vertex data.
pub async fn parse(path: &Path, text: &str) -> Result<MeshDataset, ImportError> {
    let mut reader = BufReader::new(Cursor::new(text));
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

    let (models, materials) = tobj::load_obj_buf_async(
        &mut reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        move |p| {
            let mtl_path = dir.join(p);
            async move {
                match load_string(&mtl_path).await {
                    Ok(mtl_text) => tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(mtl_text))),
                    Err(e) => {
                        log::warn!("Material library {} not readable: {e}", mtl_path.display());
                        Err(tobj::LoadError::OpenFileFailed)
                    }
                }
            }
        },
    )
    .await
    .map_err(|source| ImportError::Obj {
        path: path.to_path_buf(),
        source,
    })?;

    let (material_count, texture_count) = match materials {
        Ok(materials) => (
            materials.len(),
            materials
                .iter()
                .filter(|m| m.diffuse_texture.is_some())
                .count(),
        ),
        Err(e) => {
            log::warn!("Ignoring materials of {}: {e}", path.display());
            (0, 0)
        }
    };

    let mut dataset = MeshDataset::new();
    for model in models.iter() {
        append_model(path, model, &mut dataset)?;
    }
    log::info!(
        "Imported {}: {} meshes, {material_count} materials, {texture_count} textures, {} vertices",
        path.display(),
        models.len(),
        dataset.vertex_count
    );
    Ok(dataset)
}

/// Expand one single-indexed model into flat triangle corners.
fn append_model(
    path: &Path,
    model: &tobj::Model,
    dataset: &mut MeshDataset,
) -> Result<(), ImportError> {
    let mesh = &model.mesh;
    let vertex_total = mesh.positions.len() / 3;
    let mismatch = |attribute: &'static str, found: usize| ImportError::AttributeMismatch {
        path: path.to_path_buf(),
        attribute,
        expected: vertex_total,
        found,
    };
    if !mesh.normals.is_empty() && mesh.normals.len() / 3 != vertex_total {
        return Err(mismatch("vertex_normal", mesh.normals.len() / 3));
    }
    if !mesh.texcoords.is_empty() && mesh.texcoords.len() / 2 != vertex_total {
        return Err(mismatch("vt", mesh.texcoords.len() / 2));
    }
    if let Some(&bad) = mesh.indices.iter().find(|&&i| i as usize >= vertex_total) {
        return Err(mismatch("indices", bad as usize));
    }

    let corners = mesh.indices.len();
    let mut positions = Vec::with_capacity(corners);
    let mut normals = Vec::new();
    let mut tex_coords = Vec::new();
    for &index in mesh.indices.iter() {
        let i = index as usize;
        positions.push([
            mesh.positions[i * 3],
            mesh.positions[i * 3 + 1],
            mesh.positions[i * 3 + 2],
        ]);
        if !mesh.normals.is_empty() {
            normals.push([
                mesh.normals[i * 3],
                mesh.normals[i * 3 + 1],
                mesh.normals[i * 3 + 2],
            ]);
        }
        if !mesh.texcoords.is_empty() {
            // OBJ puts v = 0 at the bottom, wgpu samples with v = 0 at the top
            tex_coords.push([mesh.texcoords[i * 2], 1.0 - mesh.texcoords[i * 2 + 1]]);
        }
    }

    log::debug!("Sub-mesh {:?}: {corners} vertices", model.name);
    dataset.append(corners, &positions, &normals, &tex_coords);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[tokio::test]
    async fn quad_is_triangulated_and_expanded() {
        let dataset = parse(Path::new("quad.obj"), QUAD).await.unwrap();
        assert_eq!(dataset.vertex_count, 6);
        assert_eq!(dataset.positions.len(), 6);
        assert_eq!(dataset.normals, vec![[0.0, 0.0, 1.0]; 6]);
        assert_eq!(dataset.tex_coords.len(), 6);
        assert_eq!(dataset.tex_coords[0], [0.0, 1.0]);
        assert!(dataset.check_drawable().is_ok());
    }

    #[tokio::test]
    async fn positions_only_leaves_other_attributes_empty() {
        let dataset = parse(Path::new("bare.obj"), "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n")
            .await
            .unwrap();
        assert_eq!(dataset.vertex_count, 3);
        assert!(dataset.normals.is_empty());
        assert!(dataset.tex_coords.is_empty());
        assert!(dataset.check_drawable().is_err());
    }

    #[tokio::test]
    async fn missing_material_library_is_not_fatal() {
        let text = format!("mtllib nowhere.mtl\nusemtl steel\n{QUAD}");
        let dataset = parse(Path::new("/tmp/none/quad.obj"), &text).await.unwrap();
        assert_eq!(dataset.vertex_count, 6);
    }
}
