//! Image descriptors and the manifest/folder sources they come from.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ManifestError;

/// Supported image file extensions.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tiff", "tif"];

/// Check if a filename has a supported image extension.
pub fn is_image_file(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    Path::new(&lower)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext))
}

/// Stable position of a descriptor in the gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotIndex(pub usize);

impl SlotIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A pair of locators for one photo. Locators are file paths,
/// `file://` URLs or `http(s)://` URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub thumbnail: String,
    pub fullsize: String,
}

impl ImageDescriptor {
    pub fn new(thumbnail: impl Into<String>, fullsize: impl Into<String>) -> Self {
        Self {
            thumbnail: thumbnail.into(),
            fullsize: fullsize.into(),
        }
    }
}

/// Drop descriptors whose thumbnail was already seen, keeping the first.
pub fn dedup_by_thumbnail(descriptors: Vec<ImageDescriptor>) -> Vec<ImageDescriptor> {
    let mut seen = HashSet::new();
    descriptors
        .into_iter()
        .filter(|d| {
            let fresh = seen.insert(d.thumbnail.clone());
            if !fresh {
                log::warn!("Dropping duplicate thumbnail {}", d.thumbnail);
            }
            fresh
        })
        .collect()
}

fn is_remote(locator: &str) -> bool {
    locator.starts_with("http://") || locator.starts_with("https://") || locator.starts_with("file://")
}

/// Resolve a manifest entry against the manifest's directory.
fn resolve(base: &Path, locator: &str) -> String {
    if is_remote(locator) || Path::new(locator).is_absolute() {
        locator.to_string()
    } else {
        base.join(locator).to_string_lossy().into_owned()
    }
}

/// An ordered list of descriptors loaded from disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    pub descriptors: Vec<ImageDescriptor>,
}

impl Manifest {
    /// Load from a manifest file or a folder of images.
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let manifest = if path.is_dir() {
            Self::from_folder(path)?
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"))
        {
            Self::from_file(path)?
        } else {
            return Err(ManifestError::UnsupportedSource {
                path: path.to_path_buf(),
            });
        };

        if manifest.descriptors.is_empty() {
            return Err(ManifestError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(manifest)
    }

    /// Read a JSON manifest file.
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path)?;
        let base = path.parent().unwrap_or(Path::new("."));
        Self::from_json(&text, base)
    }

    /// Parse a JSON array of `{ "thumbnail", "fullsize" }` objects.
    pub fn from_json(text: &str, base: &Path) -> Result<Self, ManifestError> {
        let raw: Vec<ImageDescriptor> = serde_json::from_str(text)?;
        let descriptors = raw
            .into_iter()
            .map(|d| ImageDescriptor {
                thumbnail: resolve(base, &d.thumbnail),
                fullsize: resolve(base, &d.fullsize),
            })
            .collect();
        Ok(Self {
            descriptors: dedup_by_thumbnail(descriptors),
        })
    }

    /// Scan a folder for image files, sorted by path. A same-named file in a
    /// `full/` subdirectory becomes the full-size reference.
    pub fn from_folder(dir: &Path) -> Result<Self, ManifestError> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.is_file())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(is_image_file)
            })
            .collect();
        paths.sort();

        let full_dir = dir.join("full");
        let descriptors = paths
            .into_iter()
            .map(|thumb| {
                let full = thumb
                    .file_name()
                    .map(|name| full_dir.join(name))
                    .filter(|p| p.is_file())
                    .unwrap_or_else(|| thumb.clone());
                ImageDescriptor::new(
                    thumb.to_string_lossy().into_owned(),
                    full.to_string_lossy().into_owned(),
                )
            })
            .collect();

        log::info!("Found images in {:?}", dir);
        Ok(Self { descriptors })
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
