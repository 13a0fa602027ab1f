//! Render pipeline abstractions.

pub mod builder;
pub mod mesh;

pub use builder::{BindGroupLayoutBuilder, DepthSettings, PipelineBuilder};
pub use mesh::{DrawCall, DrawPass, GpuMaterial, MeshPipeline};
