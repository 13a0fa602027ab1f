//! Shader binding constants.
//!
//! Binding numbers shared between Rust code and `shaders/mesh.wgsl`.
//!
//! ```wgsl
//! @group(0) @binding(0)  // CAMERA_GROUP, CAMERA_BINDING
//! var<uniform> camera: Camera;
//! ```

/// Group 0: per-frame camera data.
pub const CAMERA_GROUP: u32 = 0;
/// Binding 0 in group 0: view-projection matrix.
pub const CAMERA_BINDING: u32 = 0;

/// Group 1: per-object material.
pub const MATERIAL_GROUP: u32 = 1;
/// Binding 0 in group 1: material uniform.
pub const MATERIAL_UNIFORM_BINDING: u32 = 0;
/// Binding 1 in group 1: texture 2D.
pub const MATERIAL_TEXTURE_BINDING: u32 = 1;
/// Binding 2 in group 1: sampler.
pub const MATERIAL_SAMPLER_BINDING: u32 = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_bindings_are_sequential() {
        assert_eq!(CAMERA_GROUP, 0);
        assert_eq!(MATERIAL_GROUP, 1);
        assert_eq!(MATERIAL_UNIFORM_BINDING, 0);
        assert_eq!(MATERIAL_TEXTURE_BINDING, 1);
        assert_eq!(MATERIAL_SAMPLER_BINDING, 2);
    }
}
