//! Shared uniform types for the mesh pipeline.

use bytemuck::{Pod, Zeroable};

const IDENTITY: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Combined view-projection matrix, column major.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_proj: IDENTITY,
        }
    }

    pub fn from_cols(view_proj: [[f32; 4]; 4]) -> Self {
        Self { view_proj }
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-object material parameters.
///
/// Layout mirrors `Material` in `mesh.wgsl`; the trailing padding keeps the
/// struct a multiple of 16 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MaterialUniform {
    /// Model matrix, column major.
    pub model: [[f32; 4]; 4],
    /// Base colour multiplied with the sampled texel.
    pub color: [f32; 4],
    /// Overall opacity (fade-in).
    pub opacity: f32,
    /// 1.0 samples the bound texture, 0.0 uses `color` alone.
    pub textured: f32,
    pub _pad: [f32; 2],
}

impl MaterialUniform {
    pub fn new(model: [[f32; 4]; 4], color: [f32; 4], opacity: f32, textured: bool) -> Self {
        Self {
            model,
            color,
            opacity,
            textured: if textured { 1.0 } else { 0.0 },
            _pad: [0.0; 2],
        }
    }
}

impl Default for MaterialUniform {
    fn default() -> Self {
        Self::new(IDENTITY, [1.0; 4], 1.0, false)
    }
}
