//! Golden-spiral placement of photos on a sphere.

use glam::{EulerRot, Mat4, Quat, Vec3};
use rand::Rng;

use crate::constants::{FRAME_INSET, JITTER_RANGE};
use crate::descriptor::SlotIndex;

/// Small random tilt applied to each photo, in radians per axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EulerJitter {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl EulerJitter {
    /// Draw each component uniformly from `[-JITTER_RANGE, JITTER_RANGE]`.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            x: rng.gen_range(-JITTER_RANGE..=JITTER_RANGE),
            y: rng.gen_range(-JITTER_RANGE..=JITTER_RANGE),
            z: rng.gen_range(-JITTER_RANGE..=JITTER_RANGE),
        }
    }

    pub fn to_quat(self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.x, self.y, self.z)
    }
}

/// Where one photo lives on the sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementSlot {
    pub index: SlotIndex,
    pub position: Vec3,
    pub jitter: EulerJitter,
}

impl PlacementSlot {
    /// Outward-facing orientation with the jitter applied on top.
    pub fn orientation(&self) -> Quat {
        let dir = self.position.normalize_or(Vec3::Z);
        Quat::from_rotation_arc(Vec3::Z, dir) * self.jitter.to_quat()
    }

    /// World transform of the photo plane.
    pub fn photo_transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation(), self.position)
    }

    /// World transform of the backing frame, just behind the photo.
    pub fn frame_transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation(), self.position * FRAME_INSET)
    }
}

/// Deterministic position of photo `index` out of `count` on a sphere of
/// `radius`.
pub fn position(index: usize, count: usize, radius: f32) -> Vec3 {
    let n = count.max(1) as f32;
    let i = index as f32;

    let phi = (-1.0 + 2.0 * i / n).clamp(-1.0, 1.0).acos();
    let theta = (n * std::f32::consts::PI).sqrt() * phi;

    Vec3::new(
        radius * phi.sin() * theta.cos(),
        radius * phi.sin() * theta.sin(),
        radius * phi.cos(),
    )
}

/// One placement slot per photo. `count == 0` yields none.
pub fn layout<R: Rng>(count: usize, radius: f32, rng: &mut R) -> Vec<PlacementSlot> {
    (0..count)
        .map(|i| PlacementSlot {
            index: SlotIndex(i),
            position: position(i, count, radius),
            jitter: EulerJitter::random(rng),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_first_of_eight_sits_at_south_pole() {
        let p = position(0, 8, 10.0);
        assert!(approx_eq(p.length(), 10.0));
        assert!(approx_eq(p.x, 0.0));
        assert!(approx_eq(p.y, 0.0));
        assert!(approx_eq(p.z, -10.0));
    }

    #[test]
    fn test_all_positions_on_sphere() {
        for n in [1usize, 2, 7, 30, 100] {
            for i in 0..n {
                let p = position(i, n, 10.0);
                assert!(p.is_finite());
                assert!(approx_eq(p.length(), 10.0), "n={} i={} len={}", n, i, p.length());
            }
        }
    }

    #[test]
    fn test_single_photo_is_finite() {
        let mut rng = StdRng::seed_from_u64(1);
        let slots = layout(1, 10.0, &mut rng);
        assert_eq!(slots.len(), 1);
        assert!(slots[0].position.is_finite());
    }

    #[test]
    fn test_empty_layout() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(layout(0, 10.0, &mut rng).is_empty());
    }

    #[test]
    fn test_positions_ignore_jitter_source() {
        let a = layout(12, 10.0, &mut StdRng::seed_from_u64(1));
        let b = layout(12, 10.0, &mut StdRng::seed_from_u64(99));
        for (sa, sb) in a.iter().zip(&b) {
            assert_eq!(sa.position, sb.position);
            assert_eq!(sa.index, sb.index);
        }
    }

    #[test]
    fn test_jitter_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let j = EulerJitter::random(&mut rng);
            for c in [j.x, j.y, j.z] {
                assert!(c.abs() <= JITTER_RANGE);
            }
        }
    }

    #[test]
    fn test_photo_faces_outward() {
        let slot = PlacementSlot {
            index: SlotIndex(0),
            position: Vec3::new(0.0, 10.0, 0.0),
            jitter: EulerJitter::default(),
        };
        let normal = slot.orientation() * Vec3::Z;
        assert!(approx_eq(normal.y, 1.0));

        let pole = PlacementSlot {
            position: Vec3::new(0.0, 0.0, -10.0),
            ..slot
        };
        let normal = pole.orientation() * Vec3::Z;
        assert!(approx_eq(normal.z, -1.0));
    }

    #[test]
    fn test_frame_sits_behind_photo() {
        let slot = PlacementSlot {
            index: SlotIndex(0),
            position: Vec3::new(10.0, 0.0, 0.0),
            jitter: EulerJitter::default(),
        };
        let frame = slot.frame_transform().transform_point3(Vec3::ZERO);
        assert!(approx_eq(frame.x, 9.9));
    }
}
