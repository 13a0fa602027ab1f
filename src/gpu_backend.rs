//! wgpu implementation of the scene's render backend.

use glam::Mat4;
use globe_gpu::pipeline::{DrawCall, DrawPass, GpuMaterial};
use globe_gpu::{
    CameraUniform, DepthTexture, GpuContext, MaterialUniform, Mesh, MeshData, MeshPipeline,
    RenderConfig, Texture,
};

use crate::error::GalleryError;
use crate::loader::DecodedImage;
use crate::scene::{Draw, DrawKind, MaterialDesc, RenderBackend};

fn backend_err(e: impl std::fmt::Display) -> GalleryError {
    GalleryError::Backend(e.to_string())
}

pub struct WgpuBackend {
    ctx: GpuContext,
    pipeline: MeshPipeline,
    depth: Option<DepthTexture>,
    /// Bound in place of a texture for flat-coloured materials.
    white: Option<Texture>,
}

impl WgpuBackend {
    pub fn new(ctx: GpuContext, render_config: RenderConfig) -> Result<Self, GalleryError> {
        let pipeline = MeshPipeline::new(&ctx, render_config).map_err(backend_err)?;
        let white = Texture::white(&ctx).map_err(backend_err)?;
        let depth = DepthTexture::new(&ctx);
        Ok(Self {
            ctx,
            pipeline,
            depth: Some(depth),
            white: Some(white),
        })
    }

    pub fn context(&self) -> &GpuContext {
        &self.ctx
    }

    fn pass(kind: DrawKind) -> DrawPass {
        match kind {
            DrawKind::Background => DrawPass::Background,
            DrawKind::Frame => DrawPass::Frame,
            DrawKind::Photo => DrawPass::Photo,
        }
    }
}

impl RenderBackend for WgpuBackend {
    type Geometry = Mesh;
    type Material = GpuMaterial;
    type Texture = Texture;

    fn create_plane(&mut self, width: f32, height: f32, segments: u32) -> Result<Mesh, GalleryError> {
        let data = MeshData::plane(width, height, segments, segments);
        Mesh::upload(&self.ctx, &data, "Photo Plane").map_err(backend_err)
    }

    fn create_sphere(&mut self, radius: f32, segments: u32) -> Result<Mesh, GalleryError> {
        let data = MeshData::uv_sphere(radius, segments, segments);
        Mesh::upload(&self.ctx, &data, "Backdrop Sphere").map_err(backend_err)
    }

    fn upload_texture(&mut self, image: &DecodedImage) -> Result<Texture, GalleryError> {
        Texture::from_rgba8(&self.ctx, &image.rgba, image.width, image.height).map_err(backend_err)
    }

    fn create_material(
        &mut self,
        desc: &MaterialDesc,
        texture: Option<&Texture>,
    ) -> Result<GpuMaterial, GalleryError> {
        let bound = match (texture, self.white.as_ref()) {
            (Some(t), _) => t,
            (None, Some(white)) => white,
            (None, None) => return Err(GalleryError::SurfaceUnavailable),
        };
        let uniform = MaterialUniform::new(
            desc.transform.to_cols_array_2d(),
            desc.color,
            desc.opacity,
            texture.is_some(),
        );
        Ok(self.pipeline.create_material(&self.ctx, uniform, bound))
    }

    fn update_material(&mut self, material: &mut GpuMaterial, transform: Mat4, opacity: f32) {
        material.uniform.model = transform.to_cols_array_2d();
        material.uniform.opacity = opacity;
        material.write(&self.ctx);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.ctx.resize(width, height);
        if let Some(old) = self.depth.replace(DepthTexture::new(&self.ctx)) {
            old.destroy();
        }
    }

    fn render(&mut self, view_proj: Mat4, draws: &[Draw<'_, Self>]) -> Result<(), GalleryError> {
        if self.depth.is_none() {
            return Ok(());
        }

        let frame = match self.ctx.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                let (w, h) = (self.ctx.width(), self.ctx.height());
                self.resize(w, h);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::debug!("Surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => {
                log::error!("Failed to get frame: {:?}", e);
                return Err(backend_err(e));
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let Some(depth) = self.depth.as_ref() else {
            return Ok(());
        };

        self.pipeline
            .update_camera(&self.ctx, CameraUniform::from_cols(view_proj.to_cols_array_2d()));

        let calls: Vec<DrawCall<'_>> = draws
            .iter()
            .map(|d| DrawCall {
                pass: Self::pass(d.kind),
                mesh: d.geometry,
                material: d.material,
            })
            .collect();

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Gallery Encoder"),
            });
        self.pipeline.render(&mut encoder, &view, depth, &calls);
        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn dispose_geometry(&mut self, geometry: Mesh) {
        geometry.destroy();
    }

    fn dispose_material(&mut self, material: GpuMaterial) {
        material.destroy();
    }

    fn dispose_texture(&mut self, texture: Texture) {
        texture.destroy();
    }

    fn release_surface(&mut self) {
        if let Some(depth) = self.depth.take() {
            depth.destroy();
        }
        if let Some(white) = self.white.take() {
            white.destroy();
        }
        log::debug!("GPU surface resources released");
    }
}
