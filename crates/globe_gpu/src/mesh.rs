//! CPU-side mesh generation and GPU mesh buffers.
//!
//! Geometry is generated on the CPU (`MeshData`) so it can be unit-tested
//! without a device, then uploaded once into a `Mesh`.

use std::f32::consts::PI;

use wgpu::util::DeviceExt;

use crate::context::GpuContext;
use crate::error::{GpuError, Result};
use crate::vertex::Vertex;

/// Vertex and index data for one mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Flat rectangle in the XY plane centred on the origin, facing +Z.
    ///
    /// `v = 0` is the top edge so image row 0 lands at the top of the plane.
    pub fn plane(width: f32, height: f32, segments_x: u32, segments_y: u32) -> Self {
        let grid_x = segments_x.max(1);
        let grid_y = segments_y.max(1);
        let seg_w = width / grid_x as f32;
        let seg_h = height / grid_y as f32;

        let mut vertices = Vec::with_capacity(((grid_x + 1) * (grid_y + 1)) as usize);
        for iy in 0..=grid_y {
            let y = height / 2.0 - iy as f32 * seg_h;
            for ix in 0..=grid_x {
                let x = -width / 2.0 + ix as f32 * seg_w;
                vertices.push(Vertex {
                    position: [x, y, 0.0],
                    tex_coords: [ix as f32 / grid_x as f32, iy as f32 / grid_y as f32],
                });
            }
        }

        let row = grid_x + 1;
        let mut indices = Vec::with_capacity((grid_x * grid_y * 6) as usize);
        for iy in 0..grid_y {
            for ix in 0..grid_x {
                let a = ix + row * iy;
                let b = ix + row * (iy + 1);
                let c = ix + 1 + row * (iy + 1);
                let d = ix + 1 + row * iy;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Self { vertices, indices }
    }

    /// UV sphere centred on the origin with outward (CCW) winding.
    pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let w = width_segments.max(3);
        let h = height_segments.max(2);

        let mut vertices = Vec::with_capacity(((w + 1) * (h + 1)) as usize);
        for iy in 0..=h {
            let v = iy as f32 / h as f32;
            for ix in 0..=w {
                let u = ix as f32 / w as f32;
                let x = -radius * (u * 2.0 * PI).cos() * (v * PI).sin();
                let y = radius * (v * PI).cos();
                let z = radius * (u * 2.0 * PI).sin() * (v * PI).sin();
                vertices.push(Vertex {
                    position: [x, y, z],
                    tex_coords: [u, v],
                });
            }
        }

        let row = w + 1;
        let mut indices = Vec::new();
        for iy in 0..h {
            for ix in 0..w {
                let a = row * iy + ix + 1;
                let b = row * iy + ix;
                let c = row * (iy + 1) + ix;
                let d = row * (iy + 1) + ix + 1;
                // Pole rows collapse to single triangles
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != h - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self { vertices, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Uploaded mesh buffers.
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
}

impl Mesh {
    pub fn upload(ctx: &GpuContext, data: &MeshData, label: &str) -> Result<Self> {
        if data.indices.is_empty() || data.vertices.is_empty() {
            return Err(GpuError::Mesh(format!("{} has no geometry", label)));
        }

        let vertex_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Ok(Self {
            vertex_buffer,
            index_buffer,
            num_indices: data.indices.len() as u32,
        })
    }

    /// Release both buffers now.
    pub fn destroy(self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
    }
}
