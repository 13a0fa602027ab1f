//! Error types for the gallery.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to produce a texture for one image. Always recovered locally:
/// the slot is marked failed and the gallery carries on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    /// Fetching the bytes failed (file read or HTTP)
    #[error("fetch failed for {locator}: {message}")]
    Fetch {
        /// Locator that was requested
        locator: String,
        /// Underlying error text
        message: String,
    },

    /// The bytes could not be decoded as an image
    #[error("decode failed for {locator}: {message}")]
    Decode {
        /// Locator that was requested
        locator: String,
        /// Underlying error text
        message: String,
    },

    /// Decoded image has a zero dimension
    #[error("image {locator} has empty dimensions {width}x{height}")]
    EmptyImage {
        locator: String,
        width: u32,
        height: u32,
    },

    /// No result within the configured timeout
    #[error("load of {locator} timed out after {seconds:.1}s")]
    TimedOut {
        locator: String,
        seconds: f32,
    },

    /// The texture upload to the render backend failed
    #[error("texture upload failed for {locator}: {message}")]
    Upload {
        locator: String,
        message: String,
    },
}

/// Errors reading a descriptor manifest.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Source is neither a manifest file nor a folder
    #[error("Unsupported gallery source: {path:?}")]
    UnsupportedSource {
        /// Path that was given
        path: PathBuf,
    },

    /// Source contained no usable images
    #[error("No images found in {path:?}")]
    Empty {
        /// Path that was scanned
        path: PathBuf,
    },
}

/// Errors reading or writing the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File was written by an incompatible version
    #[error("Unsupported config version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
}

/// Errors surfaced by the gallery lifecycle.
#[derive(Error, Debug)]
pub enum GalleryError {
    /// No drawing surface (or a zero-sized one) at mount time
    #[error("drawing surface unavailable")]
    SurfaceUnavailable,

    /// `mount` called in a state other than `Uninitialized`
    #[error("gallery cannot mount from the {0:?} state")]
    InvalidTransition(crate::scene::ScenePhase),

    /// GPU-side failure while building the scene
    #[error("render backend error: {0}")]
    Backend(String),
}
