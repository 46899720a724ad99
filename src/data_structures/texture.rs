//! Textures: decoded RGBA8 mip chains on the CPU and their GPU uploads.
//!
//! [`TextureData`] is what the loader produces from an image file. [`Texture`] is the
//! GPU-side handle a node binds at draw time, tagged with the logical texture unit and the
//! sampler slot name the node's shader knows it by. [`DepthBuffer`] is the render target
//! for depth testing and is never sampled.

use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbaImage, imageops::FilterType};

use crate::error::TextureError;

/// Highest anisotropy wgpu accepts.
pub const MAX_ANISOTROPY: u16 = 16;

pub fn is_power_of_two(n: u32) -> bool {
    n.is_power_of_two()
}

/// Number of levels in a full chain down to 1x1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Build every mip level, each one a triangle-filtered half of the previous.
pub fn mip_chain(base: RgbaImage) -> Vec<RgbaImage> {
    let count = mip_level_count(base.width(), base.height());
    let mut levels = Vec::with_capacity(count as usize);
    levels.push(base);
    for level in 1..count {
        let previous = &levels[level as usize - 1];
        let width = (previous.width() / 2).max(1);
        let height = (previous.height() / 2).max(1);
        let next = image::imageops::resize(previous, width, height, FilterType::Triangle);
        levels.push(next);
    }
    levels
}

/// A decoded image expanded to four channels, plus its mip chain.
#[derive(Clone, Debug)]
pub struct TextureData {
    path: PathBuf,
    levels: Vec<RgbaImage>,
    power_of_two_warning: bool,
}

impl TextureData {
    pub fn decode(path: &Path, bytes: &[u8]) -> Result<Self, TextureError> {
        let img = image::load_from_memory(bytes).map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_image(path, img)
    }

    pub fn from_image(path: &Path, img: DynamicImage) -> Result<Self, TextureError> {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(TextureError::ZeroSized(path.to_path_buf()));
        }
        let power_of_two_warning = !(is_power_of_two(width) && is_power_of_two(height));
        if power_of_two_warning {
            log::warn!(
                "Texture {} is {width}x{height}, which is not a power of two",
                path.display()
            );
        }
        Ok(Self {
            path: path.to_path_buf(),
            levels: mip_chain(rgba),
            power_of_two_warning,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Refuse images the device cannot hold in one 2D texture.
    pub fn check_fits(&self, max_dimension: u32) -> Result<(), TextureError> {
        let (width, height) = (self.width(), self.height());
        if width > max_dimension || height > max_dimension {
            return Err(TextureError::TooLarge {
                path: self.path.clone(),
                width,
                height,
                max: max_dimension,
            });
        }
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.levels[0].width()
    }

    pub fn height(&self) -> u32 {
        self.levels[0].height()
    }

    pub fn power_of_two_warning(&self) -> bool {
        self.power_of_two_warning
    }

    pub fn levels(&self) -> &[RgbaImage] {
        &self.levels
    }

    pub fn mip_level_count(&self) -> u32 {
        self.levels.len() as u32
    }
}

/// Depth attachment matching the surface size.
#[derive(Debug)]
pub struct DepthBuffer {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl DepthBuffer {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// A sampled GPU texture bound to a logical unit and a named sampler slot.
#[derive(Clone, Debug)]
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    /// Written into the node uniform's `texture_num` on every draw.
    pub unit: u32,
    /// Name of the texture binding in the node's shader.
    pub sampler_name: String,
}

impl Texture {
    /// Upload every mip level of `data` into an sRGB texture with a repeat/linear/anisotropic
    /// sampler. Images beyond the device's 2D size limit are refused before any allocation.
    pub fn from_data(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &TextureData,
        unit: u32,
        sampler_name: &str,
    ) -> Result<Self, TextureError> {
        data.check_fits(device.limits().max_texture_dimension_2d)?;

        let label = data.path().display().to_string();
        let size = wgpu::Extent3d {
            width: data.width(),
            height: data.height(),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&label),
            size,
            mip_level_count: data.mip_level_count(),
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (mip_level, level) in data.levels().iter().enumerate() {
            let (width, height) = level.dimensions();
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    aspect: wgpu::TextureAspect::All,
                    texture: &texture,
                    mip_level: mip_level as u32,
                    origin: wgpu::Origin3d::ZERO,
                },
                level,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(sampler_name),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            anisotropy_clamp: MAX_ANISOTROPY,
            ..Default::default()
        });

        Ok(Self {
            texture,
            view,
            sampler,
            unit,
            sampler_name: sampler_name.to_string(),
        })
    }
}
