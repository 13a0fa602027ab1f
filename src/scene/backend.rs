//! The seam between the scene graph and whatever draws it.

use glam::Mat4;

use crate::error::GalleryError;
use crate::loader::DecodedImage;

/// Which kind of object a draw belongs to. Backends may use a different
/// pipeline per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawKind {
    /// Inside faces of the backdrop sphere.
    Background,
    /// Opaque backing frame behind a photo.
    Frame,
    /// Photo plane, possibly translucent while fading in.
    Photo,
}

/// Parameters for a new material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialDesc {
    pub color: [f32; 4],
    pub opacity: f32,
    pub transform: Mat4,
}

/// One draw handed to [`RenderBackend::render`].
pub struct Draw<'a, B: RenderBackend + ?Sized> {
    pub kind: DrawKind,
    pub geometry: &'a B::Geometry,
    pub material: &'a B::Material,
}

/// GPU-side resource factory and renderer.
///
/// Every handle returned by a `create_*`/`upload_*` call must be given back
/// to the matching `dispose_*` exactly once.
pub trait RenderBackend {
    type Geometry;
    type Material;
    type Texture;

    /// Plane in the local XY plane facing +Z, centred on the origin.
    fn create_plane(
        &mut self,
        width: f32,
        height: f32,
        segments: u32,
    ) -> Result<Self::Geometry, GalleryError>;

    fn create_sphere(&mut self, radius: f32, segments: u32)
    -> Result<Self::Geometry, GalleryError>;

    /// Upload RGBA8 pixels. No mip chain, linear minification.
    fn upload_texture(&mut self, image: &DecodedImage) -> Result<Self::Texture, GalleryError>;

    /// A material sampling `texture`, or flat `desc.color` when `None`.
    fn create_material(
        &mut self,
        desc: &MaterialDesc,
        texture: Option<&Self::Texture>,
    ) -> Result<Self::Material, GalleryError>;

    fn update_material(&mut self, material: &mut Self::Material, transform: Mat4, opacity: f32);

    fn resize(&mut self, width: u32, height: u32);

    /// Draw `draws` in order with the given camera.
    fn render(&mut self, view_proj: Mat4, draws: &[Draw<'_, Self>]) -> Result<(), GalleryError>;

    fn dispose_geometry(&mut self, geometry: Self::Geometry);

    fn dispose_material(&mut self, material: Self::Material);

    fn dispose_texture(&mut self, texture: Self::Texture);

    /// Release the drawing surface and any backend-owned resources.
    fn release_surface(&mut self);
}
