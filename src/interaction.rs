//! Pointer picking and the full-size viewer state.

use crate::camera::pixel_to_ndc;
use crate::descriptor::ImageDescriptor;
use crate::scene::{RenderBackend, SceneManager};

/// What the external full-size overlay should show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewerState {
    pub selected_fullsize: Option<String>,
    pub is_loading_fullsize: bool,
}

impl ViewerState {
    pub fn is_open(&self) -> bool {
        self.selected_fullsize.is_some()
    }
}

#[derive(Debug, Default)]
pub struct InteractionController {
    viewer: ViewerState,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn viewer(&self) -> &ViewerState {
        &self.viewer
    }

    /// Pick at surface-relative pixel `(x, y)`. On a hit the viewer opens on
    /// the photo's full-size reference and auto-rotation pauses; the
    /// reference is returned. A miss changes nothing.
    pub fn handle_pointer_click<B: RenderBackend>(
        &mut self,
        scene: &mut SceneManager<B>,
        descriptors: &[ImageDescriptor],
        x: f32,
        y: f32,
    ) -> Option<String> {
        let (width, height) = scene.surface_size();
        if width == 0 || height == 0 {
            return None;
        }
        let (x_ndc, y_ndc) = pixel_to_ndc(x, y, width as f32, height as f32);

        let slot = scene.pick(x_ndc, y_ndc)?;
        let fullsize = descriptors.get(slot.get())?.fullsize.clone();

        log::info!("Picked slot {}: {}", slot, fullsize);
        self.viewer = ViewerState {
            selected_fullsize: Some(fullsize.clone()),
            is_loading_fullsize: true,
        };
        scene.set_auto_rotate(false);
        Some(fullsize)
    }

    /// Clear the viewer. Auto-rotation resumes only while the scene is live.
    /// Returns `false` if nothing was open.
    pub fn close_viewer<B: RenderBackend>(&mut self, scene: &mut SceneManager<B>) -> bool {
        let was_open = self.viewer.is_open();
        self.viewer = ViewerState::default();
        if scene.is_active() {
            scene.set_auto_rotate(true);
        }
        was_open
    }

    /// The overlay finished loading the full-size image.
    pub fn fullsize_loaded(&mut self) {
        self.viewer.is_loading_fullsize = false;
    }
}
