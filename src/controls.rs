//! Orbit controls: drag to rotate around a target, wheel to dolly, with
//! damping and time-based auto-rotation.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::camera::PerspectiveCamera;
use crate::constants::{MAX_CAMERA_DISTANCE, MIN_CAMERA_DISTANCE};

/// Keeps the polar angle off the poles so `look_at` stays defined.
const POLAR_EPSILON: f32 = 1e-4;

/// Residual delta below which damping is considered settled.
const SETTLE_EPSILON: f32 = 1e-5;

/// Wheel step scale per unit of zoom.
const DOLLY_STEP: f32 = 0.95;

#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    radius: f32,
    /// Azimuth around +Y, measured from +Z.
    theta: f32,
    /// Polar angle from +Y.
    phi: f32,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,

    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl OrbitControls {
    /// Controls orbiting `camera.target` from the camera's current position.
    pub fn new(camera: &PerspectiveCamera) -> Self {
        let mut controls = Self {
            target: camera.target,
            radius: 1.0,
            theta: 0.0,
            phi: PI / 2.0,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            auto_rotate: false,
            auto_rotate_speed: 2.0,
            min_distance: MIN_CAMERA_DISTANCE,
            max_distance: MAX_CAMERA_DISTANCE,
        };
        controls.set_offset(camera.position - camera.target);
        controls
    }

    fn set_offset(&mut self, offset: Vec3) {
        self.radius = offset.length().max(f32::EPSILON);
        self.theta = offset.x.atan2(offset.z);
        self.phi = (offset.y / self.radius).clamp(-1.0, 1.0).acos();
    }

    fn offset(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }

    pub fn distance(&self) -> f32 {
        self.radius
    }

    pub fn set_auto_rotate(&mut self, enabled: bool) {
        self.auto_rotate = enabled;
    }

    /// Pointer drag of `(dx, dy)` pixels on a surface `viewport_height` tall.
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let h = viewport_height.max(1.0);
        self.delta_theta -= TAU * dx / h * self.rotate_speed;
        self.delta_phi -= TAU * dy / h * self.rotate_speed;
    }

    /// Positive `steps` move the camera closer.
    pub fn zoom(&mut self, steps: f32) {
        self.scale *= DOLLY_STEP.powf(steps * self.zoom_speed);
    }

    /// Place the camera on the ray from the target through `direction`,
    /// keeping the current distance. Pending motion is dropped.
    pub fn look_from(&mut self, direction: Vec3) {
        let dir = direction.normalize_or(Vec3::Z);
        self.set_offset(dir * self.radius);
        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.scale = 1.0;
    }

    fn is_settled(&self) -> bool {
        self.delta_theta.abs() < SETTLE_EPSILON
            && self.delta_phi.abs() < SETTLE_EPSILON
            && (self.scale - 1.0).abs() < SETTLE_EPSILON
    }

    /// Advance by `dt` seconds and write the result into `camera`.
    ///
    /// Returns `true` when user input (drag, zoom or its damped tail) moved
    /// the camera. Auto-rotation alone is not reported.
    pub fn update(&mut self, camera: &mut PerspectiveCamera, dt: f32) -> bool {
        let user_motion = !self.is_settled();

        if self.auto_rotate && !user_motion {
            self.theta -= TAU / 60.0 * self.auto_rotate_speed * dt;
        }

        if self.enable_damping {
            self.theta += self.delta_theta * self.damping_factor;
            self.phi += self.delta_phi * self.damping_factor;
        } else {
            self.theta += self.delta_theta;
            self.phi += self.delta_phi;
        }
        self.phi = self.phi.clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        self.radius = (self.radius * self.scale).clamp(self.min_distance, self.max_distance);

        if self.enable_damping {
            self.delta_theta *= 1.0 - self.damping_factor;
            self.delta_phi *= 1.0 - self.damping_factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }
        self.scale = 1.0;

        camera.target = self.target;
        camera.position = self.target + self.offset();

        if self.is_settled() {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }
        user_motion
    }
}
