//! Globe Gallery
//!
//! An interactive 3D photo globe: photos are laid out on a sphere, streamed
//! in visibility-first under a bounded concurrency budget, faded in as they
//! arrive and picked with the pointer to open their full-size version.

pub mod camera;
pub mod config;
pub mod constants;
pub mod controls;
pub mod descriptor;
pub mod error;
pub mod gallery;
pub mod interaction;
pub mod layout;
pub mod lifecycle;
pub mod loader;
pub mod prioritizer;
pub mod scene;

#[cfg(not(target_arch = "wasm32"))]
pub mod app;
#[cfg(not(target_arch = "wasm32"))]
pub mod gpu_backend;

#[cfg(test)]
mod testing;

pub use config::{AppConfig, DeviceClass, GalleryConfig, LogLevel};
pub use descriptor::{ImageDescriptor, Manifest, SlotIndex};
pub use error::{ConfigError, GalleryError, LoadError, ManifestError};
pub use gallery::{Gallery, GalleryEvent};
pub use interaction::ViewerState;
pub use loader::{LoadState, ResourceLoader, ThreadPoolExecutor};
pub use scene::{RenderBackend, SceneManager, ScenePhase};
