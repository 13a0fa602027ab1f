//! Textured mesh pipeline used for photos, frames and the backdrop sphere.

use wgpu::util::DeviceExt;

use super::{BindGroupLayoutBuilder, PipelineBuilder};
use crate::bindings::*;
use crate::config::RenderConfig;
use crate::context::GpuContext;
use crate::error::{GpuError, Result};
use crate::mesh::Mesh;
use crate::texture::{DepthTexture, Texture};
use crate::uniform::{CameraUniform, MaterialUniform};
use crate::vertex::Vertex;

/// Which pipeline variant a draw uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawPass {
    /// Inside of the backdrop sphere: front faces culled, no depth writes.
    Background,
    /// Opaque frame planes, double sided, depth written.
    Frame,
    /// Fading photo planes, double sided, depth tested but not written.
    Photo,
}

/// Uniform buffer + bind group for one material.
pub struct GpuMaterial {
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub uniform: MaterialUniform,
}

impl GpuMaterial {
    /// Re-upload after changing `uniform`.
    pub fn write(&self, ctx: &GpuContext) {
        ctx.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }

    pub fn destroy(self) {
        self.uniform_buffer.destroy();
    }
}

/// One draw submitted to `MeshPipeline::render`.
pub struct DrawCall<'a> {
    pub pass: DrawPass,
    pub mesh: &'a Mesh,
    pub material: &'a GpuMaterial,
}

/// Mesh rendering pipelines sharing one shader and bind group layouts.
pub struct MeshPipeline {
    background_pipeline: wgpu::RenderPipeline,
    frame_pipeline: wgpu::RenderPipeline,
    photo_pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    material_layout: wgpu::BindGroupLayout,
    pub render_config: RenderConfig,
}

impl MeshPipeline {
    pub fn new(ctx: &GpuContext, render_config: RenderConfig) -> Result<Self> {
        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/mesh.wgsl").into()),
        });

        let camera_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Uniform Buffer"),
            contents: bytemuck::cast_slice(&[CameraUniform::new()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_layout = BindGroupLayoutBuilder::new(&ctx.device)
            .with_label("Camera Bind Group Layout")
            .add_uniform_buffer(CAMERA_BINDING, wgpu::ShaderStages::VERTEX)
            .build();

        let material_layout = BindGroupLayoutBuilder::new(&ctx.device)
            .with_label("Material Bind Group Layout")
            .add_uniform_buffer(
                MATERIAL_UNIFORM_BINDING,
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )
            .add_texture_2d(MATERIAL_TEXTURE_BINDING, wgpu::ShaderStages::FRAGMENT)
            .add_sampler(MATERIAL_SAMPLER_BINDING, wgpu::ShaderStages::FRAGMENT)
            .build();

        let camera_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: CAMERA_BINDING,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let build = |label: &'static str, cull: Option<wgpu::Face>, depth_write: bool| {
            PipelineBuilder::new(&ctx.device, ctx.format())
                .with_label(label)
                .with_shader(&shader, "vs_main", "fs_main")
                .with_vertex_buffer(Vertex::desc())
                .with_bind_group_layouts(&[&camera_layout, &material_layout])
                .with_blend_state(wgpu::BlendState::ALPHA_BLENDING)
                .with_cull_mode(cull)
                .with_depth(
                    DepthTexture::FORMAT,
                    depth_write,
                    wgpu::CompareFunction::LessEqual,
                )
                .build()
                .ok_or_else(|| GpuError::Mesh(format!("{} missing shader", label)))
        };

        let background_pipeline = build("Background Pipeline", Some(wgpu::Face::Front), false)?;
        let frame_pipeline = build("Frame Pipeline", None, true)?;
        let photo_pipeline = build("Photo Pipeline", None, false)?;

        Ok(Self {
            background_pipeline,
            frame_pipeline,
            photo_pipeline,
            camera_buffer,
            camera_bind_group,
            material_layout,
            render_config,
        })
    }

    /// Create a material bound to `texture`.
    pub fn create_material(
        &self,
        ctx: &GpuContext,
        uniform: MaterialUniform,
        texture: &Texture,
    ) -> GpuMaterial {
        let uniform_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material Bind Group"),
            layout: &self.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: MATERIAL_UNIFORM_BINDING,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: MATERIAL_TEXTURE_BINDING,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: MATERIAL_SAMPLER_BINDING,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });

        GpuMaterial {
            uniform_buffer,
            bind_group,
            uniform,
        }
    }

    /// Update the camera uniform
    pub fn update_camera(&self, ctx: &GpuContext, camera: CameraUniform) {
        ctx.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[camera]));
    }

    /// Record one render pass drawing `draws` in order.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        depth: &DepthTexture,
        draws: &[DrawCall<'_>],
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Gallery Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.render_config.clear_color.into()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_bind_group(CAMERA_GROUP, &self.camera_bind_group, &[]);

        let mut current: Option<DrawPass> = None;
        for draw in draws {
            if current != Some(draw.pass) {
                render_pass.set_pipeline(match draw.pass {
                    DrawPass::Background => &self.background_pipeline,
                    DrawPass::Frame => &self.frame_pipeline,
                    DrawPass::Photo => &self.photo_pipeline,
                });
                current = Some(draw.pass);
            }
            render_pass.set_bind_group(MATERIAL_GROUP, &draw.material.bind_group, &[]);
            render_pass.set_vertex_buffer(0, draw.mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(draw.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..draw.mesh.num_indices, 0, 0..1);
        }
    }
}
