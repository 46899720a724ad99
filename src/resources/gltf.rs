//! glTF import with the node hierarchy baked into the vertices.
//!
//! Each mesh is moved into scene space by its node's accumulated world matrix; normals go
//! through the inverse-transpose of that matrix and are renormalized. Only `Triangles`
//! primitives are kept.

use std::path::Path;

use cgmath::{InnerSpace, Matrix, Matrix3, Matrix4, SquareMatrix, Vector3};

use crate::{data_structures::mesh::MeshDataset, error::ImportError, resources::load_binary};

pub async fn import(path: &Path) -> Result<MeshDataset, ImportError> {
    let bytes = load_binary(path).await.map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let gltf_error = |source: ::gltf::Error| ImportError::Gltf {
        path: path.to_path_buf(),
        source,
    };
    let document = ::gltf::Gltf::from_slice(&bytes).map_err(gltf_error)?;

    let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut buffers = Vec::new();
    for buffer in document.buffers() {
        match buffer.source() {
            ::gltf::buffer::Source::Bin => {
                let blob = document.blob.as_deref().ok_or(::gltf::Error::MissingBlob);
                buffers.push(blob.map_err(gltf_error)?.to_vec());
            }
            ::gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                return Err(gltf_error(::gltf::Error::UnsupportedScheme));
            }
            ::gltf::buffer::Source::Uri(uri) => {
                let buffer_path = base.join(uri);
                let bin = load_binary(&buffer_path)
                    .await
                    .map_err(|source| ImportError::Io {
                        path: buffer_path.clone(),
                        source,
                    })?;
                buffers.push(bin);
            }
        }
    }

    let mut dataset = MeshDataset::new();
    let importer = Flattener {
        path,
        buffers: &buffers,
    };
    match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => {
            for node in scene.nodes() {
                importer.visit(&node, Matrix4::identity(), &mut dataset)?;
            }
        }
        None => {
            for mesh in document.meshes() {
                importer.append_mesh(&mesh, Matrix4::identity(), &mut dataset)?;
            }
        }
    }

    log::info!(
        "Imported {}: {} meshes, {} materials, {} textures, {} vertices",
        path.display(),
        document.meshes().count(),
        document.materials().count(),
        document.textures().count(),
        dataset.vertex_count
    );
    Ok(dataset)
}

struct Flattener<'a> {
    path: &'a Path,
    buffers: &'a [Vec<u8>],
}

impl Flattener<'_> {
    fn visit(
        &self,
        node: &::gltf::Node,
        parent: Matrix4<f32>,
        dataset: &mut MeshDataset,
    ) -> Result<(), ImportError> {
        let world = parent * Matrix4::from(node.transform().matrix());
        if let Some(mesh) = node.mesh() {
            self.append_mesh(&mesh, world, dataset)?;
        }
        for child in node.children() {
            self.visit(&child, world, dataset)?;
        }
        Ok(())
    }

    fn mismatch(&self, attribute: &'static str, expected: usize, found: usize) -> ImportError {
        ImportError::AttributeMismatch {
            path: self.path.to_path_buf(),
            attribute,
            expected,
            found,
        }
    }

    fn append_mesh(
        &self,
        mesh: &::gltf::Mesh,
        world: Matrix4<f32>,
        dataset: &mut MeshDataset,
    ) -> Result<(), ImportError> {
        let normal_matrix = normal_matrix(world);
        for primitive in mesh.primitives() {
            let name = mesh.name().unwrap_or("unnamed");
            if primitive.mode() != ::gltf::mesh::Mode::Triangles {
                log::warn!(
                    "Skipping {:?} primitive of mesh {name} in {}",
                    primitive.mode(),
                    self.path.display()
                );
                continue;
            }
            let reader = primitive.reader(|buffer| self.buffers.get(buffer.index()).map(Vec::as_slice));
            let Some(positions) = reader.read_positions() else {
                log::warn!("Mesh {name} has a primitive without positions");
                continue;
            };
            let positions: Vec<[f32; 3]> = positions.collect();
            let normals: Vec<[f32; 3]> = reader.read_normals().map(Iterator::collect).unwrap_or_default();
            let tex_coords: Vec<[f32; 2]> = reader
                .read_tex_coords(0)
                .map(|coords| coords.into_f32().collect())
                .unwrap_or_default();

            let total = positions.len();
            if !normals.is_empty() && normals.len() != total {
                return Err(self.mismatch("vertex_normal", total, normals.len()));
            }
            if !tex_coords.is_empty() && tex_coords.len() != total {
                return Err(self.mismatch("vt", total, tex_coords.len()));
            }

            let mut indices: Vec<usize> = match reader.read_indices() {
                Some(indices) => indices.into_u32().map(|i| i as usize).collect(),
                None => (0..total).collect(),
            };
            if indices.len() % 3 != 0 {
                log::warn!("Mesh {name}: dropping {} trailing indices", indices.len() % 3);
                indices.truncate(indices.len() / 3 * 3);
            }
            if let Some(&bad) = indices.iter().find(|&&i| i >= total) {
                return Err(self.mismatch("indices", total, bad));
            }

            let corners: Vec<[f32; 3]> = indices
                .iter()
                .map(|&i| {
                    let p = world * Vector3::from(positions[i]).extend(1.0);
                    [p.x, p.y, p.z]
                })
                .collect();
            let corner_normals: Vec<[f32; 3]> = if normals.is_empty() {
                Vec::new()
            } else {
                indices
                    .iter()
                    .map(|&i| {
                        let n = normal_matrix * Vector3::from(normals[i]);
                        if n.magnitude2() > 0.0 { n.normalize().into() } else { n.into() }
                    })
                    .collect()
            };
            let corner_tex_coords: Vec<[f32; 2]> = if tex_coords.is_empty() {
                Vec::new()
            } else {
                indices.iter().map(|&i| tex_coords[i]).collect()
            };

            log::debug!("Sub-mesh {name}: {} vertices", indices.len());
            dataset.append(indices.len(), &corners, &corner_normals, &corner_tex_coords);
        }
        Ok(())
    }
}

/// Inverse-transpose of the upper 3x3, or identity for a singular transform.
fn normal_matrix(world: Matrix4<f32>) -> Matrix3<f32> {
    let upper = Matrix3::from_cols(world.x.truncate(), world.y.truncate(), world.z.truncate());
    upper
        .invert()
        .map(|inverse| inverse.transpose())
        .unwrap_or_else(Matrix3::identity)
}
