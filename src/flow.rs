//! Application startup and the winit event loop.
//!
//! # Lifecycle
//!
//! 1. `resumed` creates the window and blocks on [`init`]: both nodes' mesh, texture and
//!    shader files are read concurrently, then uploaded. Any failure stops the loop and is
//!    handed back from [`run`].
//! 2. Keyboard events become [`SceneCommand`]s applied to the [`SceneState`].
//! 3. `RedrawRequested` advances the scene by the wall-clock frame time, renders it through
//!    a [`GpuRenderer`] and immediately requests the next frame.

use std::sync::Arc;

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::{
    config::{NodeAssets, SceneConfig},
    context::Context,
    data_structures::{
        mesh::{GpuMesh, MeshDataset},
        texture::{Texture, TextureData},
    },
    error::{InitError, RenderError},
    input::{self, SceneCommand},
    pipelines::basic::{NodeResources, check_texture_binding, compile_shader, mk_node_pipeline},
    render::{GpuRenderer, render_frame},
    resources::{import_mesh, load_shader, load_texture_data},
    state::SceneState,
};

/// Decoded files for one node, before anything touches the GPU.
struct NodeFiles {
    dataset: MeshDataset,
    texture: TextureData,
    shader_source: String,
}

async fn read_node_files(
    config: &SceneConfig,
    name: &str,
    assets: &NodeAssets,
) -> Result<NodeFiles, InitError> {
    let mesh_path = config.asset_path(&assets.mesh);
    let texture_path = config.asset_path(&assets.texture);
    let shader_path = config.asset_path(&assets.shader);
    let (dataset, texture, shader_source) = futures::future::try_join3(
        async { import_mesh(&mesh_path).await.map_err(InitError::from) },
        async { load_texture_data(&texture_path).await.map_err(InitError::from) },
        async { load_shader(&shader_path).await.map_err(InitError::from) },
    )
    .await?;
    check_texture_binding(name, &shader_source, &assets.sampler_name)?;
    Ok(NodeFiles {
        dataset,
        texture,
        shader_source,
    })
}

async fn upload_node(
    ctx: &Context,
    name: &str,
    assets: &NodeAssets,
    files: NodeFiles,
) -> Result<NodeResources, InitError> {
    let mesh = GpuMesh::upload(&ctx.device, name, &files.dataset)?;
    let texture = Texture::from_data(
        &ctx.device,
        &ctx.queue,
        &files.texture,
        assets.texture_unit,
        &assets.sampler_name,
    )?;
    let shader = compile_shader(&ctx.device, name, &files.shader_source).await?;
    let pipeline = mk_node_pipeline(
        &ctx.device,
        ctx.config.format,
        &ctx.uniform_layout,
        &ctx.texture_layout,
        &shader,
        name,
    );
    Ok(NodeResources::new(
        &ctx.device,
        name,
        mesh,
        texture,
        pipeline,
        &ctx.uniform_layout,
        &ctx.texture_layout,
    ))
}

/// Create the GPU context and load both scene nodes. Files are read and validated for both
/// nodes before the first upload.
pub async fn init(window: Arc<Window>, config: &SceneConfig) -> Result<AppState, InitError> {
    let ctx = Context::new(window).await?;
    let (root_files, child_files) = futures::future::try_join(
        read_node_files(config, "windmill", &config.root),
        read_node_files(config, "blades", &config.child),
    )
    .await?;
    let root = upload_node(&ctx, "windmill", &config.root, root_files).await?;
    let child = upload_node(&ctx, "blades", &config.child, child_files).await?;

    let mut scene = SceneState::new(config);
    scene.resize(ctx.config.width, ctx.config.height);
    Ok(AppState {
        ctx,
        nodes: vec![root, child],
        scene,
    })
}

#[derive(Debug)]
pub struct AppState {
    pub ctx: Context,
    pub nodes: Vec<NodeResources>,
    pub scene: SceneState,
}

impl AppState {
    fn resize(&mut self, width: u32, height: u32) {
        self.ctx.resize(width, height);
        self.scene.resize(width, height);
    }

    fn render(&mut self) -> Result<(), RenderError> {
        if !self.ctx.is_surface_configured() {
            return Ok(());
        }
        let mut renderer = GpuRenderer::new(&self.ctx, &self.nodes);
        render_frame(&self.scene, &mut renderer)
    }
}

pub struct App {
    config: SceneConfig,
    async_runtime: tokio::runtime::Runtime,
    state: Option<AppState>,
    init_error: Option<InitError>,
    last_time: Instant,
}

impl App {
    pub fn new(config: SceneConfig) -> anyhow::Result<Self> {
        let async_runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            config,
            async_runtime,
            state: None,
            init_error: None,
            last_time: Instant::now(),
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: InitError) {
        log::error!("Startup failed: {error}");
        self.init_error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.init_error.is_some() {
            return;
        }
        let window_attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, InitError::Surface(e.to_string())),
        };

        match self.async_runtime.block_on(init(window, &self.config)) {
            Ok(state) => {
                log::info!("Scene ready with {} nodes", state.nodes.len());
                state.ctx.window.request_redraw();
                self.state = Some(state);
                self.last_time = Instant::now();
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::KeyboardInput { event, .. } => match input::command_for_event(&event) {
                Some(SceneCommand::Exit) => event_loop.exit(),
                Some(command) => state.scene.apply(command),
                None => {}
            },
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();
                state.scene.update(dt);

                match state.render() {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(RenderError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                        state.ctx.reconfigure();
                    }
                    Err(e) => log::error!("Unable to render {e}"),
                }
                state.ctx.window.request_redraw();
            }
            _ => {}
        }
    }
}

/// Open the window and run until it is closed. Startup failures come back as [`InitError`]
/// inside the returned error.
pub fn run(config: SceneConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config)?;
    event_loop.run_app(&mut app)?;

    match app.init_error.take() {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}
