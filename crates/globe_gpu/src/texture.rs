use crate::config::TextureConfig;
use crate::context::GpuContext;
use crate::error::{GpuError, Result};

/// GPU texture wrapper
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    /// Create a texture from RGBA8 bytes with the single-use photo configuration.
    pub fn from_rgba8(ctx: &GpuContext, data: &[u8], width: u32, height: u32) -> Result<Self> {
        Self::from_rgba8_with_config(ctx, data, width, height, TextureConfig::single_use())
    }

    /// Create a texture from RGBA8 bytes with custom configuration.
    pub fn from_rgba8_with_config(
        ctx: &GpuContext,
        data: &[u8],
        width: u32,
        height: u32,
        config: TextureConfig,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(GpuError::Texture(format!(
                "Invalid texture size {}x{}",
                width, height
            )));
        }

        let expected_size = (width as usize) * (height as usize) * 4;
        if data.len() != expected_size {
            return Err(GpuError::Texture(format!(
                "Invalid data size: expected {} bytes for {}x{} RGBA8, got {}",
                expected_size,
                width,
                height,
                data.len()
            )));
        }

        let max_dim = ctx.device.limits().max_texture_dimension_2d;
        if width > max_dim || height > max_dim {
            return Err(GpuError::Texture(format!(
                "Texture {}x{} exceeds device limit {}",
                width, height, max_dim
            )));
        }

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        // Single mip level: thumbnails are never minified far enough to need a chain
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Photo Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: config.texture_format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctx.queue.write_texture(
            texture.as_image_copy(),
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Photo Sampler"),
            address_mode_u: config.address_mode,
            address_mode_v: config.address_mode,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: config.mag_filter,
            min_filter: config.min_filter,
            mipmap_filter: config.mipmap_filter,
            ..Default::default()
        });

        Ok(Self {
            texture,
            view,
            sampler,
            width,
            height,
        })
    }

    /// 1x1 white texture bound by untextured materials (frames, background).
    pub fn white(ctx: &GpuContext) -> Result<Self> {
        Self::from_rgba8_with_config(ctx, &[255, 255, 255, 255], 1, 1, TextureConfig::nearest())
    }

    /// Release the GPU allocation now instead of waiting for the last handle to drop.
    pub fn destroy(self) {
        self.texture.destroy();
    }
}

/// Depth attachment sized to the surface.
pub struct DepthTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl DepthTexture {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn new(ctx: &GpuContext) -> Self {
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: ctx.width(),
                height: ctx.height(),
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

    pub fn destroy(self) {
        self.texture.destroy();
    }
}
