//! GPU plumbing for the globe gallery: device/surface context, textures,
//! meshes and the textured-mesh render pipeline.

pub mod bindings;
pub mod config;
pub mod context;
pub mod error;
pub mod mesh;
pub mod pipeline;
pub mod texture;
pub mod uniform;
pub mod vertex;

pub use config::{ClearColor, GpuConfig, RenderConfig, TextureConfig};
pub use context::GpuContext;
pub use error::{GpuError, Result};
pub use mesh::{Mesh, MeshData};
pub use pipeline::{MeshPipeline, PipelineBuilder};
pub use texture::{DepthTexture, Texture};
pub use uniform::{CameraUniform, MaterialUniform};
pub use vertex::Vertex;
