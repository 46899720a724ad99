#![cfg(feature = "integration-tests")]

mod common;

use cgmath::{Matrix4, SquareMatrix};
use common::test_utils::{TempAssets, headless_device};
use windmill_ngin::{
    data_structures::{
        mesh::{GpuMesh, MeshDataset},
        texture::{DepthBuffer, Texture},
    },
    error::{MeshError, TextureError},
    pipelines::basic::{
        NodeResources, compile_shader, mk_node_pipeline, texture_layout, uniform_layout,
    },
    render::DrawCall,
    resources::{load_shader, load_texture, load_texture_data},
};

fn strip(vertex_count: usize) -> MeshDataset {
    let positions: Vec<[f32; 3]> = (0..vertex_count)
        .map(|i| [i as f32, (i % 3) as f32, 0.0])
        .collect();
    let normals = vec![[0.0, 0.0, 1.0]; vertex_count];
    let tex_coords: Vec<[f32; 2]> = (0..vertex_count)
        .map(|i| [(i % 2) as f32, (i % 3) as f32 / 2.0])
        .collect();
    let mut dataset = MeshDataset::new();
    dataset.append(vertex_count, &positions, &normals, &tex_coords);
    dataset
}

#[tokio::test]
async fn mesh_upload_keeps_the_vertex_count() {
    let (device, _queue) = headless_device().await;
    let dataset = strip(1000);

    let mesh = GpuMesh::upload(&device, "blades", &dataset).unwrap();

    assert_eq!(mesh.vertex_count(), 1000);
    assert_eq!(mesh.name, "blades");
}

#[tokio::test]
async fn mesh_without_texture_coordinates_is_refused() {
    let (device, _queue) = headless_device().await;
    let mut dataset = MeshDataset::new();
    dataset.append(
        3,
        &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        &[[0.0, 0.0, 1.0]; 3],
        &[],
    );

    let err = GpuMesh::upload(&device, "windmill", &dataset).unwrap_err();
    assert!(matches!(err, MeshError::MissingAttribute { attribute: "vt", .. }), "{err}");
}

#[tokio::test]
async fn texture_upload_binds_unit_and_sampler() {
    let (device, queue) = headless_device().await;
    let assets = TempAssets::new("gpu-tex");
    let path = assets.write_png("texture3.png", 64, 64);

    let texture = load_texture(&device, &queue, &path, 1, "metal_texture")
        .await
        .unwrap();

    assert_eq!(texture.unit, 1);
    assert_eq!(texture.sampler_name, "metal_texture");
    assert_eq!(texture.texture.mip_level_count(), 7);
    assert_eq!(texture.texture.width(), 64);
}

#[tokio::test]
async fn texture_beyond_the_device_limit_is_an_error() {
    let (device, queue) = headless_device().await;
    let max = device.limits().max_texture_dimension_2d;
    let assets = TempAssets::new("gpu-wide");
    let path = assets.write_png("wide.png", max + 8, 1);

    let err = load_texture(&device, &queue, &path, 0, "basic_texture")
        .await
        .unwrap_err();

    match err {
        TextureError::TooLarge {
            width, height, max: limit, ..
        } => assert_eq!((width, height, limit), (max + 8, 1, max)),
        other => panic!("expected TooLarge, got {other}"),
    }
}

#[tokio::test]
async fn draw_uniform_takes_the_texture_unit_from_the_texture() {
    let (device, queue) = headless_device().await;
    let assets = TempAssets::new("gpu-node");
    let path = assets.write_png("texture3.png", 16, 16);
    let data = load_texture_data(&path).await.unwrap();
    let texture = Texture::from_data(&device, &queue, &data, 1, "metal_texture").unwrap();

    let shaders = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/shaders");
    let source = load_shader(&shaders.join("blades.wgsl")).await.unwrap();
    let shader = compile_shader(&device, "blades", &source).await.unwrap();
    let (uniforms, textures) = (uniform_layout(&device), texture_layout(&device));
    let pipeline = mk_node_pipeline(
        &device,
        wgpu::TextureFormat::Rgba8UnormSrgb,
        &uniforms,
        &textures,
        &shader,
        "blades",
    );
    let mesh = GpuMesh::upload(&device, "blades", &strip(3)).unwrap();
    let node = NodeResources::new(&device, "blades", mesh, texture, pipeline, &uniforms, &textures);

    let model = Matrix4::from_scale(0.3);
    let uniform = node.uniform_for(&DrawCall {
        node: 1,
        proj: Matrix4::identity(),
        view: Matrix4::identity(),
        model,
    });
    assert_eq!(uniform.texture_num, 1);
    assert_eq!(uniform.model, Into::<[[f32; 4]; 4]>::into(model));
}

#[tokio::test]
async fn depth_buffer_matches_the_surface_size() {
    let (device, _queue) = headless_device().await;
    let depth = DepthBuffer::new(&device, 800, 600);
    assert_eq!(depth.texture.format(), DepthBuffer::FORMAT);
    assert_eq!((depth.texture.width(), depth.texture.height()), (800, 600));
}

#[tokio::test]
async fn bundled_shaders_compile() {
    let (device, _queue) = headless_device().await;
    let shaders = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/shaders");
    for name in ["windmill.wgsl", "blades.wgsl"] {
        let source = load_shader(&shaders.join(name)).await.unwrap();
        compile_shader(&device, name, &source).await.unwrap();
    }
}

#[tokio::test]
async fn broken_shader_reports_diagnostics() {
    let (device, _queue) = headless_device().await;
    let err = compile_shader(&device, "broken", "fn vs_main( -> {")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("broken"), "{err}");
}
