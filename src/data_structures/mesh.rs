//! CPU mesh datasets and their GPU counterparts.
//!
//! A [`MeshDataset`] is a flat, non-indexed triangle list: three consecutive vertices form one
//! triangle. [`GpuMesh`] uploads it into one vertex buffer per attribute, matching the fixed
//! layout every node shader expects:
//!
//! | slot | location | name              | format      |
//! |------|----------|-------------------|-------------|
//! | 0    | 0        | `vertex_position` | `Float32x3` |
//! | 1    | 1        | `vertex_normal`   | `Float32x3` |
//! | 2    | 2        | `vt`              | `Float32x2` |

use wgpu::util::DeviceExt;

use crate::error::MeshError;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshDataset {
    pub vertex_count: usize,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
}

impl MeshDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one expanded sub-mesh. Missing attributes are passed as empty slices.
    pub fn append(
        &mut self,
        vertex_count: usize,
        positions: &[[f32; 3]],
        normals: &[[f32; 3]],
        tex_coords: &[[f32; 2]],
    ) {
        self.positions.extend_from_slice(positions);
        self.normals.extend_from_slice(normals);
        self.tex_coords.extend_from_slice(tex_coords);
        self.vertex_count += vertex_count;
    }

    pub fn triangle_count(&self) -> usize {
        self.vertex_count / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count == 0
    }

    /// The first attribute that is populated but whose length differs from `vertex_count`.
    pub fn mismatched_attribute(&self) -> Option<(&'static str, usize)> {
        [
            ("vertex_position", self.positions.len()),
            ("vertex_normal", self.normals.len()),
            ("vt", self.tex_coords.len()),
        ]
        .into_iter()
        .find(|&(_, len)| len != 0 && len != self.vertex_count)
    }

    /// Check the dataset can be drawn with the three-attribute layout.
    pub fn check_drawable(&self) -> Result<(), MeshError> {
        if self.vertex_count == 0 {
            return Err(MeshError::Empty);
        }
        let attributes = [
            ("vertex_position", self.positions.len()),
            ("vertex_normal", self.normals.len()),
            ("vt", self.tex_coords.len()),
        ];
        for (attribute, found) in attributes {
            if found != self.vertex_count {
                return Err(MeshError::MissingAttribute {
                    attribute,
                    expected: self.vertex_count,
                    found,
                });
            }
        }
        Ok(())
    }
}

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const NORMAL_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];
const TEX_COORD_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x2];

/// Write-once vertex buffers for one node.
#[derive(Debug)]
pub struct GpuMesh {
    pub name: String,
    positions: wgpu::Buffer,
    normals: wgpu::Buffer,
    tex_coords: wgpu::Buffer,
    vertex_count: u32,
}

impl GpuMesh {
    /// Validate `dataset` and copy each attribute into its own `VERTEX` buffer.
    ///
    /// Nothing is allocated when validation fails.
    pub fn upload(
        device: &wgpu::Device,
        label: &str,
        dataset: &MeshDataset,
    ) -> Result<Self, MeshError> {
        dataset.check_drawable()?;

        let buffer = |attribute: &str, contents: &[u8]| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} {attribute} Buffer")),
                contents,
                usage: wgpu::BufferUsages::VERTEX,
            })
        };
        let positions = buffer("vertex_position", bytemuck::cast_slice(&dataset.positions));
        let normals = buffer("vertex_normal", bytemuck::cast_slice(&dataset.normals));
        let tex_coords = buffer("vt", bytemuck::cast_slice(&dataset.tex_coords));

        log::debug!("Uploaded {label}: {} vertices", dataset.vertex_count);
        Ok(Self {
            name: label.to_string(),
            positions,
            normals,
            tex_coords,
            vertex_count: dataset.vertex_count as u32,
        })
    }

    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.positions.slice(..));
        render_pass.set_vertex_buffer(1, self.normals.slice(..));
        render_pass.set_vertex_buffer(2, self.tex_coords.slice(..));
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn desc() -> [wgpu::VertexBufferLayout<'static>; 3] {
        [
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &POSITION_ATTRIBUTES,
            },
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &NORMAL_ATTRIBUTES,
            },
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &TEX_COORD_ATTRIBUTES,
            },
        ]
    }
}
