//! The per-frame draw loop.
//!
//! [`render_frame`] does the transform math and drives a [`Renderer`] through
//! `clear -> draw(node)... -> present`. [`GpuRenderer`] is the wgpu implementation; it never
//! touches a matrix except to copy it into a uniform buffer.

use std::iter;

use cgmath::Matrix4;

use crate::{
    context::Context,
    error::RenderError,
    pipelines::basic::NodeResources,
    state::SceneState,
};

/// One node's draw request, with all matrices already composed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCall {
    pub node: usize,
    pub proj: Matrix4<f32>,
    pub view: Matrix4<f32>,
    pub model: Matrix4<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStage {
    Clear,
    DrawNode(usize),
    Present,
}

pub trait Renderer {
    fn clear(&mut self, colour: wgpu::Color) -> Result<(), RenderError>;
    fn draw(&mut self, call: DrawCall) -> Result<(), RenderError>;
    fn present(&mut self) -> Result<(), RenderError>;
}

/// Render one frame of `state`: the root first, then every node in graph order.
pub fn render_frame<R: Renderer>(state: &SceneState, renderer: &mut R) -> Result<(), RenderError> {
    let proj = state.projection.calc_matrix();
    let view = state.camera.view_matrix(state.view_model);
    let worlds = state.graph.world_matrices();

    renderer.clear(state.clear_colour)?;
    for (node, model) in state.graph.nodes().iter().zip(worlds) {
        renderer.draw(DrawCall {
            node: node.handle,
            proj,
            view,
            model,
        })?;
    }
    renderer.present()
}

/// Draws into the window surface owned by a [`Context`].
pub struct GpuRenderer<'a> {
    ctx: &'a Context,
    nodes: &'a [NodeResources],
    frame: Option<wgpu::SurfaceTexture>,
    clear_colour: wgpu::Color,
    queued: Vec<usize>,
}

impl<'a> GpuRenderer<'a> {
    pub fn new(ctx: &'a Context, nodes: &'a [NodeResources]) -> Self {
        Self {
            ctx,
            nodes,
            frame: None,
            clear_colour: wgpu::Color::BLACK,
            queued: Vec::with_capacity(nodes.len()),
        }
    }
}

impl Renderer for GpuRenderer<'_> {
    fn clear(&mut self, colour: wgpu::Color) -> Result<(), RenderError> {
        self.frame = Some(self.ctx.surface.get_current_texture()?);
        self.clear_colour = colour;
        self.queued.clear();
        Ok(())
    }

    fn draw(&mut self, call: DrawCall) -> Result<(), RenderError> {
        let node = self
            .nodes
            .get(call.node)
            .ok_or(RenderError::UnknownNode(call.node))?;
        node.write_uniform(&self.ctx.queue, &node.uniform_for(&call));
        self.queued.push(call.node);
        Ok(())
    }

    fn present(&mut self) -> Result<(), RenderError> {
        let Some(output) = self.frame.take() else {
            log::warn!("present called without a frame; skipping");
            return Ok(());
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_buffer.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            for &index in self.queued.iter() {
                self.nodes[index].draw(&mut render_pass);
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        self.queued.clear();
        Ok(())
    }
}
