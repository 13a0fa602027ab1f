//! Configuration structs for GPU settings.
//!
//! Defaults target a small always-animating 3D view: high-performance
//! adapter, VSync, transparent background.

/// Configuration for GPU context initialization.
#[derive(Debug, Clone)]
pub struct GpuConfig {
    /// Power preference for adapter selection.
    pub power_preference: wgpu::PowerPreference,
    /// Present mode (VSync behavior).
    pub present_mode: wgpu::PresentMode,
    /// Maximum frames in flight.
    pub max_frame_latency: u32,
}

impl Default for GpuConfig {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            present_mode: wgpu::PresentMode::Fifo,
            max_frame_latency: 2,
        }
    }
}

impl GpuConfig {
    /// Create config optimized for power efficiency (constrained devices).
    pub fn power_saving() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::LowPower,
            present_mode: wgpu::PresentMode::Fifo,
            max_frame_latency: 2,
        }
    }
}

/// Configuration for texture creation and sampling.
#[derive(Debug, Clone)]
pub struct TextureConfig {
    /// Magnification filter mode.
    pub mag_filter: wgpu::FilterMode,
    /// Minification filter mode.
    pub min_filter: wgpu::FilterMode,
    /// Mipmap filter mode.
    pub mipmap_filter: wgpu::FilterMode,
    /// Address mode for U and V.
    pub address_mode: wgpu::AddressMode,
    /// Whether the sampled texels are sRGB encoded.
    pub srgb: bool,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self::single_use()
    }
}

impl TextureConfig {
    /// Photo thumbnails are displayed once at roughly native size: no mip
    /// chain, linear minification.
    pub fn single_use() -> Self {
        Self {
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            address_mode: wgpu::AddressMode::ClampToEdge,
            srgb: true,
        }
    }

    /// Plain colour textures (the 1x1 white fallback).
    pub fn nearest() -> Self {
        Self {
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            address_mode: wgpu::AddressMode::ClampToEdge,
            srgb: true,
        }
    }

    pub fn texture_format(&self) -> wgpu::TextureFormat {
        if self.srgb {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        }
    }
}

/// Configuration for render passes.
#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
    /// Clear color for the background.
    pub clear_color: ClearColor,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: ClearColor::TRANSPARENT,
        }
    }
}

impl RenderConfig {
    /// Create config with a specific clear color.
    pub fn with_clear_color(mut self, color: ClearColor) -> Self {
        self.clear_color = color;
        self
    }
}

/// Clear color for render passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl ClearColor {
    /// Soft rose backdrop used by the native viewer.
    pub const ROSE: ClearColor = ClearColor {
        r: 0.99,
        g: 0.93,
        b: 0.94,
        a: 1.0,
    };
    /// Transparent.
    pub const TRANSPARENT: ClearColor = ClearColor {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };
}

impl From<ClearColor> for wgpu::Color {
    fn from(c: ClearColor) -> Self {
        wgpu::Color {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}
