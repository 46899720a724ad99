use cgmath::Matrix4;
use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        mesh::GpuMesh,
        texture::{DepthBuffer, Texture},
    },
    error::ShaderError,
    render::DrawCall,
};

/// Per-node uniform block. Field order matches the WGSL `NodeUniform` struct.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NodeUniform {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub texture_num: u32,
    // Uniform structs are sized in multiples of 16 bytes
    _padding: [u32; 3],
}

impl NodeUniform {
    pub fn new(
        model: Matrix4<f32>,
        view: Matrix4<f32>,
        proj: Matrix4<f32>,
        texture_num: u32,
    ) -> Self {
        Self {
            model: model.into(),
            view: view.into(),
            proj: proj.into(),
            texture_num,
            _padding: [0; 3],
        }
    }
}

impl Default for NodeUniform {
    fn default() -> Self {
        use cgmath::SquareMatrix;
        let identity = Matrix4::identity();
        Self::new(identity, identity, identity, 0)
    }
}

pub fn uniform_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("node_uniform_bind_group_layout"),
    })
}

pub fn texture_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("node_texture_bind_group_layout"),
    })
}

/// Compile WGSL and surface every error the compiler reports, with its full text.
pub async fn compile_shader(
    device: &wgpu::Device,
    label: &str,
    source: &str,
) -> Result<wgpu::ShaderModule, ShaderError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    let scope_error = device.pop_error_scope().await;

    let info = module.get_compilation_info().await;
    let mut diagnostics: Vec<String> = info
        .messages
        .iter()
        .filter(|message| message.message_type == wgpu::CompilationMessageType::Error)
        .map(|message| match &message.location {
            Some(location) => format!(
                "{}:{}: {}",
                location.line_number, location.line_position, message.message
            ),
            None => message.message.clone(),
        })
        .collect();
    if diagnostics.is_empty() {
        if let Some(error) = scope_error {
            diagnostics.push(error.to_string());
        }
    }
    if diagnostics.is_empty() {
        Ok(module)
    } else {
        Err(ShaderError::Compile {
            label: label.to_string(),
            diagnostics: diagnostics.join("\n"),
        })
    }
}

/// Names of the `texture_*` globals a WGSL source declares.
pub fn texture_bindings(source: &str) -> Vec<&str> {
    source
        .lines()
        .filter_map(|line| {
            let code = line.split("//").next()?;
            let (at, _) = code.match_indices("var").find(|&(i, _)| {
                let before = code[..i].chars().next_back();
                let after = code[i + 3..].chars().next();
                before.is_none_or(char::is_whitespace)
                    && after.is_some_and(|c| c.is_whitespace() || c == '<')
            })?;
            let decl = code[at + 3..].trim_start();
            let decl = match decl.strip_prefix('<') {
                Some(rest) => rest.split_once('>')?.1,
                None => decl,
            };
            let (name, ty) = decl.split_once(':')?;
            ty.trim_start().starts_with("texture_").then(|| name.trim())
        })
        .collect()
}

/// The configured sampler name must be a texture the shader declares.
pub fn check_texture_binding(label: &str, source: &str, texture: &str) -> Result<(), ShaderError> {
    if texture_bindings(source).contains(&texture) {
        Ok(())
    } else {
        Err(ShaderError::MissingTexture {
            label: label.to_string(),
            texture: texture.to_string(),
        })
    }
}

pub fn mk_node_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    uniform_layout: &wgpu::BindGroupLayout,
    texture_layout: &wgpu::BindGroupLayout,
    shader: &wgpu::ShaderModule,
    label: &str,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{label} Pipeline Layout")),
        bind_group_layouts: &[uniform_layout, texture_layout],
        push_constant_ranges: &[],
    });

    mk_render_pipeline(
        device,
        &layout,
        color_format,
        Some(wgpu::BlendState {
            alpha: wgpu::BlendComponent::REPLACE,
            color: wgpu::BlendComponent::REPLACE,
        }),
        Some(DepthBuffer::FORMAT),
        &GpuMesh::desc(),
        shader,
        label,
    )
}

#[allow(clippy::too_many_arguments)]
pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    depth_format: Option<wgpu::TextureFormat>,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    shader: &wgpu::ShaderModule,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // Imported meshes do not agree on winding
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

/// Everything needed to draw one scene node.
#[derive(Debug)]
pub struct NodeResources {
    pub name: String,
    pub mesh: GpuMesh,
    pub texture: Texture,
    pub pipeline: wgpu::RenderPipeline,
    pub uniform_buffer: wgpu::Buffer,
    pub uniform_bind_group: wgpu::BindGroup,
    pub texture_bind_group: wgpu::BindGroup,
}

impl NodeResources {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        mesh: GpuMesh,
        texture: Texture,
        pipeline: wgpu::RenderPipeline,
        uniform_layout: &wgpu::BindGroupLayout,
        texture_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Uniform Buffer")),
            contents: bytemuck::cast_slice(&[NodeUniform::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some(&format!("{name} uniform_bind_group")),
        });
        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
            label: Some(&format!("{name} {}", texture.sampler_name)),
        });

        Self {
            name: name.to_string(),
            mesh,
            texture,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            texture_bind_group,
        }
    }

    /// The uniform for one draw. `texture_num` always comes from this node's texture unit.
    pub fn uniform_for(&self, call: &DrawCall) -> NodeUniform {
        NodeUniform::new(call.model, call.view, call.proj, self.texture.unit)
    }

    pub fn write_uniform(&self, queue: &wgpu::Queue, uniform: &NodeUniform) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[*uniform]));
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        render_pass.set_bind_group(1, &self.texture_bind_group, &[]);
        self.mesh.bind(render_pass);
        render_pass.draw(0..self.mesh.vertex_count(), 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_is_sixteen_byte_aligned() {
        assert_eq!(std::mem::size_of::<NodeUniform>(), 208);
        assert_eq!(std::mem::size_of::<NodeUniform>() % 16, 0);
    }

    #[test]
    fn uniform_carries_texture_unit() {
        let uniform = NodeUniform::new(
            Matrix4::from_translation((1.0, 2.0, 3.0).into()),
            Matrix4::from_scale(2.0),
            Matrix4::from_scale(3.0),
            1,
        );
        assert_eq!(uniform.texture_num, 1);
        assert_eq!(uniform.model[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(uniform.proj[0][0], 3.0);
    }

    const NODE_SHADER: &str = "
        @group(0) @binding(0)
        var<uniform> node: NodeUniform;
        @group(1) @binding(0) var basic_texture: texture_2d<f32>;
        // var commented_texture: texture_2d<f32>;
        @group(1) @binding(1)
        var basic_sampler: sampler;
        fn fs_main() {
            var invariant_colour: vec4<f32>;
        }
    ";

    #[test]
    fn finds_declared_textures_only() {
        assert_eq!(texture_bindings(NODE_SHADER), vec!["basic_texture"]);
    }

    #[test]
    fn sampler_name_must_match_a_texture_binding() {
        assert!(check_texture_binding("windmill", NODE_SHADER, "basic_texture").is_ok());
        let err = check_texture_binding("windmill", NODE_SHADER, "metal_texture").unwrap_err();
        assert!(matches!(
            err,
            ShaderError::MissingTexture { ref texture, .. } if texture == "metal_texture"
        ));
        assert!(check_texture_binding("windmill", NODE_SHADER, "basic_sampler").is_err());
    }

    #[test]
    fn bundled_shaders_declare_the_default_sampler_names() {
        let config = crate::config::SceneConfig::default();
        let windmill = include_str!("../../assets/shaders/windmill.wgsl");
        let blades = include_str!("../../assets/shaders/blades.wgsl");
        assert!(check_texture_binding("windmill", windmill, &config.root.sampler_name).is_ok());
        assert!(check_texture_binding("blades", blades, &config.child.sampler_name).is_ok());
    }
}
