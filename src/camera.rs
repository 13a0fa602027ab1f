//! Perspective camera, view frustum and picking rays.

use glam::{Mat4, Vec3, Vec4, Vec4Swizzles};

use crate::constants::{CAMERA_DISTANCE, CAMERA_FAR, CAMERA_FOV_DEGREES, CAMERA_NEAR};

/// Right-handed perspective camera looking at `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, CAMERA_DISTANCE),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: CAMERA_FOV_DEGREES.to_radians(),
            aspect: 1.0,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
        }
    }
}

impl PerspectiveCamera {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Projection with a 0..1 depth range.
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_proj(&self.view_proj())
    }

    /// Ray through a point in normalized device coordinates.
    pub fn ray_from_ndc(&self, x_ndc: f32, y_ndc: f32) -> Ray {
        let inv = self.view_proj().inverse();
        let near = inv.project_point3(Vec3::new(x_ndc, y_ndc, 0.0));
        let far = inv.project_point3(Vec3::new(x_ndc, y_ndc, 1.0));
        Ray {
            origin: near,
            direction: (far - near).normalize_or(Vec3::NEG_Z),
        }
    }
}

/// Convert surface-relative pixels to NDC.
pub fn pixel_to_ndc(x: f32, y: f32, width: f32, height: f32) -> (f32, f32) {
    (2.0 * x / width - 1.0, 1.0 - 2.0 * y / height)
}

/// Plane stored as `normal · p + d`, positive on the inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    fn from_row(v: Vec4) -> Self {
        let len = v.xyz().length();
        if len > f32::EPSILON {
            Self {
                normal: v.xyz() / len,
                d: v.w / len,
            }
        } else {
            Self {
                normal: v.xyz(),
                d: v.w,
            }
        }
    }

    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) + self.d
    }
}

/// Six clip planes extracted from a view-projection matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Gribb/Hartmann extraction for a 0..1 depth range.
    pub fn from_view_proj(m: &Mat4) -> Self {
        let r0 = m.row(0);
        let r1 = m.row(1);
        let r2 = m.row(2);
        let r3 = m.row(3);

        Self {
            planes: [
                Plane::from_row(r3 + r0), // left
                Plane::from_row(r3 - r0), // right
                Plane::from_row(r3 + r1), // bottom
                Plane::from_row(r3 - r1), // top
                Plane::from_row(r2),      // near
                Plane::from_row(r3 - r2), // far
            ],
        }
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        self.planes.iter().all(|plane| plane.signed_distance(p) >= 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to a `width × height` quad lying in the local
    /// XY plane of `transform`, centred on its origin. Both faces count.
    pub fn intersect_quad(&self, transform: &Mat4, width: f32, height: f32) -> Option<f32> {
        let inv = transform.inverse();
        let origin = inv.transform_point3(self.origin);
        let dir = inv.transform_vector3(self.direction);

        if dir.z.abs() < 1e-8 {
            return None;
        }
        let t = -origin.z / dir.z;
        if t < 0.0 {
            return None;
        }

        let hit = origin + dir * t;
        if hit.x.abs() <= width * 0.5 && hit.y.abs() <= height * 0.5 {
            Some(t)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_pixel_to_ndc() {
        assert_eq!(pixel_to_ndc(200.0, 200.0, 400.0, 400.0), (0.0, 0.0));
        assert_eq!(pixel_to_ndc(0.0, 0.0, 400.0, 400.0), (-1.0, 1.0));
        assert_eq!(pixel_to_ndc(400.0, 400.0, 400.0, 400.0), (1.0, -1.0));
    }

    #[test]
    fn test_frustum_contains_front_and_not_behind() {
        let camera = PerspectiveCamera::default();
        let frustum = camera.frustum();

        assert!(frustum.contains_point(Vec3::ZERO));
        assert!(frustum.contains_point(Vec3::new(0.0, 0.0, 10.0)));
        assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, 20.0)));
        assert!(!frustum.contains_point(Vec3::new(100.0, 0.0, 0.0)));
    }

    #[test]
    fn test_frustum_far_plane() {
        let camera = PerspectiveCamera::default();
        let frustum = camera.frustum();
        assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, -2000.0)));
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let camera = PerspectiveCamera::default();
        let ray = camera.ray_from_ndc(0.0, 0.0);

        assert!(approx_eq(ray.direction.z, -1.0));
        assert!(approx_eq(ray.origin.x, 0.0));
        assert!(approx_eq(ray.origin.z, CAMERA_DISTANCE - CAMERA_NEAR));
    }

    #[test]
    fn test_intersect_facing_quad() {
        let camera = PerspectiveCamera::default();
        let ray = camera.ray_from_ndc(0.0, 0.0);
        let quad = Mat4::from_translation(Vec3::new(0.0, 0.0, 10.0));

        let t = ray.intersect_quad(&quad, 3.0, 2.0).unwrap();
        assert!(approx_eq(ray.at(t).z, 10.0));
    }

    #[test]
    fn test_intersect_misses_outside_bounds() {
        let ray = Ray {
            origin: Vec3::new(5.0, 0.0, 15.0),
            direction: Vec3::NEG_Z,
        };
        let quad = Mat4::from_translation(Vec3::new(0.0, 0.0, 10.0));
        assert!(ray.intersect_quad(&quad, 3.0, 2.0).is_none());
    }

    #[test]
    fn test_intersect_back_face_and_behind() {
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, -15.0),
            direction: Vec3::Z,
        };
        let facing_away =
            Mat4::from_rotation_translation(Quat::IDENTITY, Vec3::new(0.0, 0.0, -10.0));
        assert!(ray.intersect_quad(&facing_away, 3.0, 3.0).is_some());

        let behind = Mat4::from_translation(Vec3::new(0.0, 0.0, -20.0));
        assert!(ray.intersect_quad(&behind, 3.0, 3.0).is_none());
    }
}
