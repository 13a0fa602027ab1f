//! Configuration for the gallery.
//!
//! All device-dependent tunables are resolved once into a [`GalleryConfig`]
//! and handed to every component. [`AppConfig`] is the on-disk JSON form
//! used by the native viewer.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_LOAD_TIMEOUT_SECS, PHOTO_WIDTH, SPHERE_RADIUS};
use crate::error::ConfigError;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Broad hardware class used to pick conservative constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    #[default]
    Desktop,
    /// Phones, tablets and other power/memory constrained hosts.
    Constrained,
}

/// Keywords that mark a user-agent style hint as a constrained device.
const CONSTRAINED_HINTS: &[&str] = &[
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

impl DeviceClass {
    /// Classify a user-agent style hint string.
    pub fn detect(hint: &str) -> Self {
        let lower = hint.to_lowercase();
        if CONSTRAINED_HINTS.iter().any(|k| lower.contains(k)) {
            DeviceClass::Constrained
        } else {
            DeviceClass::Desktop
        }
    }
}

/// Every tunable the gallery components read, resolved once per instance.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryConfig {
    pub device: DeviceClass,
    /// Cap on simultaneous `Loading` slots.
    pub max_concurrent_loads: usize,
    /// Slots a single prioritizer pass may start.
    pub candidates_per_pass: usize,
    /// Backdrop sphere tessellation (width and height segments).
    pub sphere_segments: u32,
    /// Photo/frame plane tessellation.
    pub plane_segments: u32,
    /// Render every n-th frame.
    pub frame_skip: u32,
    /// Photo opacity ramp from 0 to 1.
    pub fade_duration: Duration,
    /// Quiet period after camera movement before a prioritizer pass.
    pub control_debounce: Duration,
    /// Safety-net prioritizer period.
    pub safety_interval: Duration,
    /// Resize handling throttle.
    pub resize_throttle: Duration,
    /// Loads still pending after this are failed.
    pub load_timeout: Duration,
    /// Auto-rotation speed; 1.0 is one revolution per minute.
    pub auto_rotate_speed: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub damping_factor: f32,
    pub sphere_radius: f32,
    pub photo_width: f32,
    /// Create a placeholder scene object as soon as a load starts.
    pub placeholders: bool,
    /// Use the in-memory bitmap decode path before the element path.
    pub fast_decode: bool,
    /// Upper bound for the device pixel ratio applied to the surface.
    pub max_pixel_ratio: f32,
}

impl GalleryConfig {
    /// Constants for a device class.
    pub fn for_device(device: DeviceClass) -> Self {
        match device {
            DeviceClass::Desktop => Self {
                device,
                max_concurrent_loads: 2,
                candidates_per_pass: 2,
                sphere_segments: 16,
                plane_segments: 1,
                frame_skip: 1,
                fade_duration: Duration::from_millis(1000),
                control_debounce: Duration::from_millis(300),
                safety_interval: Duration::from_millis(2000),
                resize_throttle: Duration::from_millis(100),
                load_timeout: Duration::from_secs(DEFAULT_LOAD_TIMEOUT_SECS),
                auto_rotate_speed: 0.5,
                rotate_speed: 0.5,
                zoom_speed: 1.0,
                damping_factor: 0.05,
                sphere_radius: SPHERE_RADIUS,
                photo_width: PHOTO_WIDTH,
                placeholders: false,
                fast_decode: true,
                max_pixel_ratio: 2.0,
            },
            DeviceClass::Constrained => Self {
                device,
                max_concurrent_loads: 1,
                candidates_per_pass: 1,
                sphere_segments: 8,
                plane_segments: 1,
                frame_skip: 2,
                fade_duration: Duration::from_millis(2700),
                control_debounce: Duration::from_millis(500),
                safety_interval: Duration::from_millis(3000),
                resize_throttle: Duration::from_millis(100),
                load_timeout: Duration::from_secs(DEFAULT_LOAD_TIMEOUT_SECS),
                auto_rotate_speed: 0.3,
                rotate_speed: 0.5,
                zoom_speed: 1.0,
                damping_factor: 0.05,
                sphere_radius: SPHERE_RADIUS,
                photo_width: PHOTO_WIDTH,
                placeholders: false,
                fast_decode: true,
                max_pixel_ratio: 1.0,
            },
        }
    }

    /// Apply user overrides on top of the device defaults.
    pub fn with_overrides(mut self, o: &GalleryOverrides) -> Self {
        if let Some(v) = o.max_concurrent_loads {
            self.max_concurrent_loads = v.max(1);
        }
        if let Some(v) = o.candidates_per_pass {
            self.candidates_per_pass = v.max(1);
        }
        if let Some(v) = o.frame_skip {
            self.frame_skip = v.max(1);
        }
        if let Some(ms) = o.fade_ms {
            self.fade_duration = Duration::from_millis(ms);
        }
        if let Some(ms) = o.control_debounce_ms {
            self.control_debounce = Duration::from_millis(ms);
        }
        if let Some(ms) = o.safety_interval_ms {
            self.safety_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = o.load_timeout_ms {
            self.load_timeout = Duration::from_millis(ms);
        }
        if let Some(v) = o.auto_rotate_speed {
            self.auto_rotate_speed = v;
        }
        if let Some(v) = o.placeholders {
            self.placeholders = v;
        }
        if let Some(v) = o.fast_decode {
            self.fast_decode = v;
        }
        self
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self::for_device(DeviceClass::Desktop)
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Optional per-field overrides of the device defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryOverrides {
    pub max_concurrent_loads: Option<usize>,
    pub candidates_per_pass: Option<usize>,
    pub frame_skip: Option<u32>,
    pub fade_ms: Option<u64>,
    pub control_debounce_ms: Option<u64>,
    pub safety_interval_ms: Option<u64>,
    pub load_timeout_ms: Option<u64>,
    pub auto_rotate_speed: Option<f32>,
    pub placeholders: Option<bool>,
    pub fast_decode: Option<bool>,
}

/// Application configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Forced device class; detected from the environment when absent
    #[serde(default)]
    pub device: Option<DeviceClass>,

    /// Square drawing size in logical pixels
    #[serde(default = "default_surface_size")]
    pub surface_size: u32,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    #[serde(default)]
    pub overrides: GalleryOverrides,
}

fn default_surface_size() -> u32 {
    crate::constants::DEFAULT_SURFACE_SIZE
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            device: None,
            surface_size: default_surface_size(),
            log_level: LogLevel::default(),
            overrides: GalleryOverrides::default(),
        }
    }
}

impl AppConfig {
    /// Default location: `<config dir>/globe-gallery/config.json`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("globe-gallery").join("config.json"))
    }

    /// Parse a config from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(text)?;
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::Version {
                found: config.version,
                expected: CONFIG_VERSION,
            });
        }
        Ok(config)
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_json(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {:?}, using defaults", path);
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Resolve the gallery constants: explicit device, else `hint`.
    pub fn gallery_config(&self, hint: &str) -> GalleryConfig {
        let device = self.device.unwrap_or_else(|| DeviceClass::detect(hint));
        GalleryConfig::for_device(device).with_overrides(&self.overrides)
    }
}
