#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

static FIXTURE_COUNTER: AtomicU32 = AtomicU32::new(0);

/// A scratch asset directory under the system temp dir, removed on drop.
pub(crate) struct TempAssets {
    root: PathBuf,
}

impl TempAssets {
    pub fn new(tag: &str) -> Self {
        let id = FIXTURE_COUNTER.fetch_add(1, Ordering::SeqCst);
        let root = std::env::temp_dir().join(format!(
            "windmill-ngin-{tag}-{}-{id}",
            std::process::id()
        ));
        std::fs::create_dir_all(&root).expect("create fixture dir");
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn write(&self, name: &str, bytes: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, bytes).expect("write fixture");
        path
    }

    /// A checkerboard PNG of the given size.
    pub fn write_png(&self, name: &str, width: u32, height: u32) -> PathBuf {
        let img = image::RgbaImage::from_fn(width, height, |x, y| {
            if (x / 8 + y / 8) % 2 == 0 {
                image::Rgba([200, 180, 140, 255])
            } else {
                image::Rgba([40, 30, 20, 255])
            }
        });
        let path = self.path(name);
        img.save(&path).expect("write png fixture");
        path
    }

    /// Two objects: a single triangle and a quad that triangulates into two.
    pub fn write_obj(&self, name: &str) -> PathBuf {
        self.write(
            name,
            "\
o tower
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
vn 0.0 0.0 1.0
f 1/1/1 2/2/1 3/3/1
o roof
v 0.0 2.0 0.0
v 1.0 2.0 0.0
v 1.0 3.0 0.0
v 0.0 3.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
vn 0.0 0.0 1.0
f 4/4/2 5/5/2 6/6/2 7/7/2
",
        )
    }

    /// A glTF file with an external `tri.bin`: node 0 translates by (10, 0, 0) and carries
    /// node 1, which scales its triangle mesh by 2. The mesh also has a `POINTS` primitive.
    pub fn write_gltf(&self, name: &str) -> PathBuf {
        let positions: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let normals: [[f32; 3]; 3] = [[0.0, 0.0, 1.0]; 3];
        let tex_coords: [[f32; 2]; 3] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];

        let mut bin = Vec::with_capacity(96);
        for value in positions.iter().flatten().chain(normals.iter().flatten()) {
            bin.extend_from_slice(&value.to_le_bytes());
        }
        for value in tex_coords.iter().flatten() {
            bin.extend_from_slice(&value.to_le_bytes());
        }
        self.write("tri.bin", &bin);

        let json = serde_json::json!({
            "asset": { "version": "2.0" },
            "scene": 0,
            "scenes": [{ "nodes": [0] }],
            "nodes": [
                { "name": "hub", "translation": [10.0, 0.0, 0.0], "children": [1] },
                { "name": "blade", "mesh": 0, "scale": [2.0, 2.0, 2.0] }
            ],
            "meshes": [{
                "name": "blade",
                "primitives": [
                    { "attributes": { "POSITION": 0, "NORMAL": 1, "TEXCOORD_0": 2 } },
                    { "attributes": { "POSITION": 0 }, "mode": 0 }
                ]
            }],
            "buffers": [{ "uri": "tri.bin", "byteLength": bin.len() }],
            "bufferViews": [
                { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
                { "buffer": 0, "byteOffset": 36, "byteLength": 36 },
                { "buffer": 0, "byteOffset": 72, "byteLength": 24 }
            ],
            "accessors": [
                {
                    "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                    "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]
                },
                { "bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC3" },
                { "bufferView": 2, "componentType": 5126, "count": 3, "type": "VEC2" }
            ]
        });
        self.write(name, serde_json::to_vec_pretty(&json).expect("serialize gltf fixture"))
    }
}

impl Drop for TempAssets {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

pub(crate) fn assert_close(actual: f32, expected: f32, eps: f32) {
    assert!(
        (actual - expected).abs() <= eps,
        "expected {expected} ± {eps}, got {actual}"
    );
}

pub(crate) fn assert_matrix_close(actual: cgmath::Matrix4<f32>, expected: cgmath::Matrix4<f32>) {
    let a: &[f32; 16] = actual.as_ref();
    let e: &[f32; 16] = expected.as_ref();
    for (i, (a, e)) in a.iter().zip(e.iter()).enumerate() {
        assert!((a - e).abs() <= 1e-4, "element {i}: expected {e}, got {a}");
    }
}

/// A device without a surface, for upload tests.
#[cfg(feature = "integration-tests")]
pub(crate) async fn headless_device() -> (wgpu::Device, wgpu::Queue) {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: None,
            force_fallback_adapter: false,
        })
        .await
        .expect("no adapter available for integration tests");
    adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("test device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            ..Default::default()
        })
        .await
        .expect("failed to create test device")
}
