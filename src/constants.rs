//! Global constants for the gallery.

/// Radius of the sphere the photos are placed on.
pub const SPHERE_RADIUS: f32 = 10.0;

/// Width of a photo plane; height follows the image aspect ratio.
pub const PHOTO_WIDTH: f32 = 3.0;

/// How much larger the backing frame is than its photo, per dimension.
pub const FRAME_MARGIN: f32 = 0.1;

/// Frame sits at this fraction of the photo's radius, just behind it.
pub const FRAME_INSET: f32 = 0.99;

/// Per-axis orientation jitter bound in radians (`±0.05`).
pub const JITTER_RANGE: f32 = 0.05;

/// Backdrop sphere radius, large enough to enclose the orbit range.
pub const BACKGROUND_RADIUS: f32 = 30.0;

/// Backdrop sphere opacity.
pub const BACKGROUND_OPACITY: f32 = 0.1;

/// Camera vertical field of view in degrees.
pub const CAMERA_FOV_DEGREES: f32 = 60.0;

/// Camera clip planes.
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;

/// Initial camera distance along +Z.
pub const CAMERA_DISTANCE: f32 = 15.0;

/// Zoom limits for the orbit controls.
pub const MIN_CAMERA_DISTANCE: f32 = 2.0;
pub const MAX_CAMERA_DISTANCE: f32 = 28.0;

/// Default square drawing size in logical pixels.
pub const DEFAULT_SURFACE_SIZE: u32 = 400;

/// Pointer travel (pixels) under which a press/release counts as a click.
pub const CLICK_SLOP: f32 = 4.0;

/// Seconds a thumbnail load may take before it is given up.
pub const DEFAULT_LOAD_TIMEOUT_SECS: u64 = 20;
