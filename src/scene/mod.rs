//! Scene graph, camera and per-frame loop.
//!
//! [`SceneManager`] owns every GPU-side object through a [`RenderBackend`].
//! Photo objects live in an arena indexed by [`SlotIndex`], so picking maps a
//! hit straight back to its descriptor.

pub mod backend;

pub use backend::{Draw, DrawKind, MaterialDesc, RenderBackend};

use std::time::Duration;

use glam::{Mat4, Vec3};
use web_time::Instant;

use crate::camera::{Frustum, PerspectiveCamera};
use crate::config::GalleryConfig;
use crate::constants::{BACKGROUND_OPACITY, BACKGROUND_RADIUS, FRAME_MARGIN};
use crate::controls::OrbitControls;
use crate::descriptor::SlotIndex;
use crate::error::{GalleryError, LoadError};
use crate::layout::PlacementSlot;
use crate::loader::DecodedImage;

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const PLACEHOLDER_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];
const PLACEHOLDER_OPACITY: f32 = 0.3;

/// Longest frame step fed to the controls, so a stalled loop does not jump.
const MAX_FRAME_DT: f32 = 0.1;

/// Lifecycle of the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScenePhase {
    #[default]
    Uninitialized,
    Initializing,
    Active,
    /// Terminal.
    Disposed,
}

/// Opacity ramp from 0 to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    started: Instant,
    duration: Duration,
}

impl Fade {
    pub fn new(started: Instant, duration: Duration) -> Self {
        Self { started, duration }
    }

    pub fn opacity(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started).as_secs_f32();
        (elapsed / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }
}

/// One photo with its backing frame.
pub struct SceneObject<B: RenderBackend> {
    pub slot: SlotIndex,
    photo_geometry: B::Geometry,
    photo_material: B::Material,
    frame_geometry: B::Geometry,
    frame_material: B::Material,
    texture: Option<B::Texture>,
    pub transform: Mat4,
    pub frame_transform: Mat4,
    pub width: f32,
    pub height: f32,
    pub position: Vec3,
    fade: Option<Fade>,
    pub opacity: f32,
}

impl<B: RenderBackend> SceneObject<B> {
    pub fn is_placeholder(&self) -> bool {
        self.texture.is_none()
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    fn dispose(self, backend: &mut B) {
        backend.dispose_material(self.photo_material);
        backend.dispose_geometry(self.photo_geometry);
        backend.dispose_material(self.frame_material);
        backend.dispose_geometry(self.frame_geometry);
        if let Some(texture) = self.texture {
            backend.dispose_texture(texture);
        }
    }
}

struct Background<B: RenderBackend> {
    geometry: B::Geometry,
    material: B::Material,
}

/// What one call to [`SceneManager::frame`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameOutcome {
    pub rendered: bool,
    /// User input moved the camera this frame.
    pub controls_changed: bool,
}

pub struct SceneManager<B: RenderBackend> {
    phase: ScenePhase,
    config: GalleryConfig,
    backend: Option<B>,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    background: Option<Background<B>>,
    objects: Vec<Option<SceneObject<B>>>,
    surface_size: (u32, u32),
    frame_count: u64,
    last_update: Option<Instant>,
}

impl<B: RenderBackend> SceneManager<B> {
    pub fn new(config: GalleryConfig, slot_count: usize) -> Self {
        let camera = PerspectiveCamera::default();
        let controls = Self::build_controls(&config, &camera);
        Self {
            phase: ScenePhase::Uninitialized,
            config,
            backend: None,
            camera,
            controls,
            background: None,
            objects: (0..slot_count).map(|_| None).collect(),
            surface_size: (0, 0),
            frame_count: 0,
            last_update: None,
        }
    }

    fn build_controls(config: &GalleryConfig, camera: &PerspectiveCamera) -> OrbitControls {
        let mut controls = OrbitControls::new(camera);
        controls.enable_damping = true;
        controls.damping_factor = config.damping_factor;
        controls.rotate_speed = config.rotate_speed;
        controls.zoom_speed = config.zoom_speed;
        controls.auto_rotate = true;
        controls.auto_rotate_speed = config.auto_rotate_speed;
        controls
    }

    pub fn phase(&self) -> ScenePhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == ScenePhase::Active
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    pub fn frustum(&self) -> Frustum {
        self.camera.frustum()
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.surface_size
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    pub fn object(&self, slot: SlotIndex) -> Option<&SceneObject<B>> {
        self.objects.get(slot.get()).and_then(|o| o.as_ref())
    }

    pub fn object_count(&self) -> usize {
        self.objects.iter().flatten().count()
    }

    /// `Uninitialized → Initializing → Active`.
    ///
    /// On failure every resource created so far is released and the phase
    /// returns to `Uninitialized`.
    pub fn initialize(&mut self, backend: B, surface_size: (u32, u32)) -> Result<(), GalleryError> {
        if self.phase != ScenePhase::Uninitialized {
            return Err(GalleryError::InvalidTransition(self.phase));
        }
        if surface_size.0 == 0 || surface_size.1 == 0 {
            return Err(GalleryError::SurfaceUnavailable);
        }

        self.phase = ScenePhase::Initializing;
        self.backend = Some(backend);
        self.surface_size = surface_size;
        self.camera = PerspectiveCamera::default();
        self.controls = Self::build_controls(&self.config, &self.camera);

        match self.create_background() {
            Ok(background) => {
                self.background = Some(background);
                self.phase = ScenePhase::Active;
                log::info!(
                    "Scene active at {}x{} with {} slots",
                    surface_size.0,
                    surface_size.1,
                    self.objects.len()
                );
                Ok(())
            }
            Err(e) => {
                log::error!("Scene initialization failed: {}", e);
                if let Some(mut backend) = self.backend.take() {
                    backend.release_surface();
                }
                self.phase = ScenePhase::Uninitialized;
                Err(e)
            }
        }
    }

    fn create_background(&mut self) -> Result<Background<B>, GalleryError> {
        let backend = self.backend.as_mut().ok_or(GalleryError::SurfaceUnavailable)?;
        let geometry = backend.create_sphere(BACKGROUND_RADIUS, self.config.sphere_segments)?;
        let desc = MaterialDesc {
            color: WHITE,
            opacity: BACKGROUND_OPACITY,
            transform: Mat4::IDENTITY,
        };
        match backend.create_material(&desc, None) {
            Ok(material) => Ok(Background { geometry, material }),
            Err(e) => {
                backend.dispose_geometry(geometry);
                Err(e)
            }
        }
    }

    /// Build photo + frame for `placement`. On error everything created so
    /// far is disposed and the texture is handed back.
    fn build_object(
        backend: &mut B,
        config: &GalleryConfig,
        placement: &PlacementSlot,
        aspect: f32,
        texture: Option<B::Texture>,
        opacity: f32,
    ) -> Result<SceneObject<B>, (GalleryError, Option<B::Texture>)> {
        let width = config.photo_width;
        let height = config.photo_width / aspect.max(f32::EPSILON);
        let transform = placement.photo_transform();
        let frame_transform = placement.frame_transform();
        let segments = config.plane_segments;

        let (color, photo_opacity) = if texture.is_some() {
            (WHITE, opacity)
        } else {
            (PLACEHOLDER_COLOR, PLACEHOLDER_OPACITY)
        };
        let photo_desc = MaterialDesc {
            color,
            opacity: photo_opacity,
            transform,
        };
        let frame_desc = MaterialDesc {
            color: WHITE,
            opacity: 1.0,
            transform: frame_transform,
        };

        let photo_geometry = match backend.create_plane(width, height, segments) {
            Ok(g) => g,
            Err(e) => return Err((e, texture)),
        };
        let frame_geometry =
            match backend.create_plane(width + FRAME_MARGIN, height + FRAME_MARGIN, segments) {
                Ok(g) => g,
                Err(e) => {
                    backend.dispose_geometry(photo_geometry);
                    return Err((e, texture));
                }
            };
        let photo_material = match backend.create_material(&photo_desc, texture.as_ref()) {
            Ok(m) => m,
            Err(e) => {
                backend.dispose_geometry(photo_geometry);
                backend.dispose_geometry(frame_geometry);
                return Err((e, texture));
            }
        };
        let frame_material = match backend.create_material(&frame_desc, None) {
            Ok(m) => m,
            Err(e) => {
                backend.dispose_material(photo_material);
                backend.dispose_geometry(photo_geometry);
                backend.dispose_geometry(frame_geometry);
                return Err((e, texture));
            }
        };

        Ok(SceneObject {
            slot: placement.index,
            photo_geometry,
            photo_material,
            frame_geometry,
            frame_material,
            texture,
            transform,
            frame_transform,
            width,
            height,
            position: placement.position,
            fade: None,
            opacity: photo_opacity,
        })
    }

    /// Untextured stand-in shown while a slot loads.
    pub fn create_placeholder(&mut self, placement: &PlacementSlot) -> Result<(), GalleryError> {
        if self.phase != ScenePhase::Active || self.object(placement.index).is_some() {
            return Ok(());
        }
        let backend = self.backend.as_mut().ok_or(GalleryError::SurfaceUnavailable)?;
        let object = Self::build_object(backend, &self.config, placement, 1.0, None, PLACEHOLDER_OPACITY)
            .map_err(|(e, _)| e)?;
        if let Some(cell) = self.objects.get_mut(placement.index.get()) {
            *cell = Some(object);
        }
        Ok(())
    }

    /// Replace any placeholder with the final textured object, starting its
    /// fade at `now`.
    pub fn apply_texture(
        &mut self,
        placement: &PlacementSlot,
        image: &DecodedImage,
        aspect: f32,
        locator: &str,
        now: Instant,
    ) -> Result<(), LoadError> {
        let upload_err = |e: GalleryError| LoadError::Upload {
            locator: locator.to_string(),
            message: e.to_string(),
        };
        if self.phase != ScenePhase::Active {
            return Err(upload_err(GalleryError::InvalidTransition(self.phase)));
        }
        let index = placement.index.get();
        if index >= self.objects.len() {
            return Err(upload_err(GalleryError::Backend(format!(
                "slot {} out of range",
                placement.index
            ))));
        }
        let Some(backend) = self.backend.as_mut() else {
            return Err(upload_err(GalleryError::SurfaceUnavailable));
        };

        let texture = backend.upload_texture(image).map_err(upload_err)?;
        let mut object = match Self::build_object(backend, &self.config, placement, aspect, Some(texture), 0.0) {
            Ok(object) => object,
            Err((e, texture)) => {
                if let Some(texture) = texture {
                    backend.dispose_texture(texture);
                }
                return Err(upload_err(e));
            }
        };
        object.fade = Some(Fade::new(now, self.config.fade_duration));

        if let Some(previous) = self.objects[index].replace(object) {
            previous.dispose(backend);
        }
        log::info!("Slot {} ready ({}x{})", placement.index, image.width, image.height);
        Ok(())
    }

    /// Dispose a placeholder after its load failed.
    pub fn remove_object(&mut self, slot: SlotIndex) {
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        if let Some(object) = self.objects.get_mut(slot.get()).and_then(Option::take) {
            object.dispose(backend);
        }
    }

    pub fn set_auto_rotate(&mut self, enabled: bool) {
        self.controls.set_auto_rotate(enabled);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if self.phase != ScenePhase::Active || width == 0 || height == 0 {
            return;
        }
        self.surface_size = (width, height);
        self.camera.aspect = 1.0;
        if let Some(backend) = self.backend.as_mut() {
            backend.resize(width, height);
        }
    }

    /// Advance fades by wall time.
    fn advance_fades(&mut self, now: Instant) {
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        for object in self.objects.iter_mut().flatten() {
            let Some(fade) = object.fade else {
                continue;
            };
            let opacity = fade.opacity(now);
            if opacity != object.opacity {
                object.opacity = opacity;
                backend.update_material(&mut object.photo_material, object.transform, opacity);
            }
            if opacity >= 1.0 {
                object.fade = None;
            }
        }
    }

    /// One tick of the render loop.
    pub fn frame(&mut self, now: Instant) -> Result<FrameOutcome, GalleryError> {
        if self.phase != ScenePhase::Active {
            return Ok(FrameOutcome::default());
        }

        self.advance_fades(now);

        self.frame_count += 1;
        if self.frame_count % u64::from(self.config.frame_skip.max(1)) != 0 {
            return Ok(FrameOutcome::default());
        }

        let dt = self
            .last_update
            .map(|last| now.saturating_duration_since(last).as_secs_f32())
            .unwrap_or(0.0)
            .min(MAX_FRAME_DT);
        self.last_update = Some(now);

        let controls_changed = self.controls.update(&mut self.camera, dt);
        self.render()?;

        Ok(FrameOutcome {
            rendered: true,
            controls_changed,
        })
    }

    fn render(&mut self) -> Result<(), GalleryError> {
        let Some(backend) = self.backend.as_mut() else {
            return Ok(());
        };

        let mut draws: Vec<Draw<'_, B>> = Vec::with_capacity(self.objects.len() * 2 + 1);
        if let Some(background) = &self.background {
            draws.push(Draw {
                kind: DrawKind::Background,
                geometry: &background.geometry,
                material: &background.material,
            });
        }

        let live: Vec<&SceneObject<B>> = self.objects.iter().flatten().collect();
        for object in &live {
            draws.push(Draw {
                kind: DrawKind::Frame,
                geometry: &object.frame_geometry,
                material: &object.frame_material,
            });
        }

        let eye = self.camera.position;
        let mut photos = live;
        photos.sort_by(|a, b| {
            let da = a.position.distance_squared(eye);
            let db = b.position.distance_squared(eye);
            db.total_cmp(&da)
        });
        for object in photos {
            draws.push(Draw {
                kind: DrawKind::Photo,
                geometry: &object.photo_geometry,
                material: &object.photo_material,
            });
        }

        backend.render(self.camera.view_proj(), &draws)
    }

    /// Nearest photo plane under the NDC point, frames excluded.
    pub fn pick(&self, x_ndc: f32, y_ndc: f32) -> Option<SlotIndex> {
        if self.phase != ScenePhase::Active {
            return None;
        }
        let ray = self.camera.ray_from_ndc(x_ndc, y_ndc);
        self.objects
            .iter()
            .flatten()
            .filter_map(|object| {
                ray.intersect_quad(&object.transform, object.width, object.height)
                    .map(|t| (t, object.slot))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, slot)| slot)
    }

    /// Dispose every object, the backdrop and the surface. Returns `false`
    /// if the scene was already disposed.
    pub fn teardown(&mut self) -> bool {
        if self.phase == ScenePhase::Disposed {
            return false;
        }
        let disposed = self.object_count();

        if let Some(mut backend) = self.backend.take() {
            for object in self.objects.iter_mut().filter_map(Option::take) {
                object.dispose(&mut backend);
            }
            if let Some(background) = self.background.take() {
                backend.dispose_material(background.material);
                backend.dispose_geometry(background.geometry);
            }
            backend.release_surface();
        }
        self.objects.clear();
        self.phase = ScenePhase::Disposed;
        log::info!("Scene disposed ({} photo objects released)", disposed);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::EulerJitter;
    use crate::testing::CountingBackend;

    fn placement(i: usize, position: Vec3) -> PlacementSlot {
        PlacementSlot {
            index: SlotIndex(i),
            position,
            jitter: EulerJitter::default(),
        }
    }

    fn image() -> DecodedImage {
        DecodedImage {
            width: 2,
            height: 1,
            rgba: vec![255; 8],
        }
    }

    fn active_scene(slots: usize) -> (SceneManager<CountingBackend>, CountingBackend) {
        let backend = CountingBackend::default();
        let tracker = backend.clone();
        let mut scene = SceneManager::new(GalleryConfig::default(), slots);
        scene.initialize(backend, (400, 400)).unwrap();
        (scene, tracker)
    }

    #[test]
    fn test_fade_ramp() {
        let t0 = Instant::now();
        let fade = Fade::new(t0, Duration::from_millis(1000));
        assert_eq!(fade.opacity(t0), 0.0);
        assert!((fade.opacity(t0 + Duration::from_millis(500)) - 0.5).abs() < 1e-3);
        assert_eq!(fade.opacity(t0 + Duration::from_secs(5)), 1.0);
        assert_eq!(Fade::new(t0, Duration::ZERO).opacity(t0), 1.0);
    }

    #[test]
    fn test_zero_surface_stays_uninitialized() {
        let mut scene: SceneManager<CountingBackend> = SceneManager::new(GalleryConfig::default(), 1);
        let result = scene.initialize(CountingBackend::default(), (0, 400));
        assert!(matches!(result, Err(GalleryError::SurfaceUnavailable)));
        assert_eq!(scene.phase(), ScenePhase::Uninitialized);
    }

    #[test]
    fn test_initialize_creates_background() {
        let (scene, tracker) = active_scene(3);
        assert_eq!(scene.phase(), ScenePhase::Active);
        let counts = tracker.counts();
        assert_eq!(counts.geometries_created, 1);
        assert_eq!(counts.materials_created, 1);
        assert_eq!(counts.last_sphere_segments, Some(16));
    }

    #[test]
    fn test_double_initialize_rejected() {
        let (mut scene, _tracker) = active_scene(1);
        let result = scene.initialize(CountingBackend::default(), (400, 400));
        assert!(matches!(
            result,
            Err(GalleryError::InvalidTransition(ScenePhase::Active))
        ));
    }

    #[test]
    fn test_apply_texture_sizes_plane_by_aspect() {
        let (mut scene, _tracker) = active_scene(2);
        let now = Instant::now();
        scene
            .apply_texture(&placement(1, Vec3::new(0.0, 0.0, 10.0)), &image(), 2.0, "t1", now)
            .unwrap();

        let object = scene.object(SlotIndex(1)).unwrap();
        assert_eq!(object.width, 3.0);
        assert_eq!(object.height, 1.5);
        assert_eq!(object.opacity, 0.0);
        assert!(object.is_fading());
        assert!(scene.object(SlotIndex(0)).is_none());
    }

    #[test]
    fn test_photo_and_frame_materials_are_white() {
        let (mut scene, tracker) = active_scene(1);
        scene
            .apply_texture(&placement(0, Vec3::new(0.0, 0.0, 10.0)), &image(), 1.0, "t0", Instant::now())
            .unwrap();

        let colors = tracker.counts().material_colors;
        assert_eq!(colors.len(), 3);
        for color in &colors[1..] {
            assert_eq!(*color, WHITE);
        }
    }

    #[test]
    fn test_fade_completes_over_duration() {
        let (mut scene, _tracker) = active_scene(1);
        let t0 = Instant::now();
        scene
            .apply_texture(&placement(0, Vec3::new(0.0, 0.0, 10.0)), &image(), 1.0, "t0", t0)
            .unwrap();

        scene.frame(t0 + Duration::from_millis(500)).unwrap();
        let half = scene.object(SlotIndex(0)).unwrap().opacity;
        assert!(half > 0.4 && half < 0.6);

        scene.frame(t0 + Duration::from_millis(1200)).unwrap();
        let object = scene.object(SlotIndex(0)).unwrap();
        assert_eq!(object.opacity, 1.0);
        assert!(!object.is_fading());
    }

    #[test]
    fn test_placeholder_replaced_without_leak() {
        let (mut scene, tracker) = active_scene(1);
        let slot = placement(0, Vec3::new(0.0, 0.0, 10.0));

        scene.create_placeholder(&slot).unwrap();
        assert!(scene.object(SlotIndex(0)).unwrap().is_placeholder());

        scene.apply_texture(&slot, &image(), 1.0, "t0", Instant::now()).unwrap();
        assert!(!scene.object(SlotIndex(0)).unwrap().is_placeholder());

        // backdrop + one live object
        let counts = tracker.counts();
        assert_eq!(counts.live_geometries(), 3);
        assert_eq!(counts.live_materials(), 3);
        assert_eq!(counts.live_textures(), 1);
    }

    #[test]
    fn test_remove_placeholder_on_failure() {
        let (mut scene, tracker) = active_scene(1);
        let slot = placement(0, Vec3::new(0.0, 0.0, 10.0));
        scene.create_placeholder(&slot).unwrap();
        scene.remove_object(SlotIndex(0));

        assert!(scene.object(SlotIndex(0)).is_none());
        assert_eq!(tracker.counts().live_geometries(), 1);
    }

    #[test]
    fn test_upload_failure_leaves_no_object() {
        let (mut scene, tracker) = active_scene(1);
        tracker.fail_uploads(true);
        let result = scene.apply_texture(
            &placement(0, Vec3::new(0.0, 0.0, 10.0)),
            &image(),
            1.0,
            "t0",
            Instant::now(),
        );
        assert!(matches!(result, Err(LoadError::Upload { .. })));
        assert!(scene.object(SlotIndex(0)).is_none());
        assert_eq!(tracker.counts().live_textures(), 0);
    }

    #[test]
    fn test_render_order() {
        let (mut scene, tracker) = active_scene(2);
        let now = Instant::now();
        scene
            .apply_texture(&placement(0, Vec3::new(0.0, 0.0, 10.0)), &image(), 1.0, "a", now)
            .unwrap();
        scene
            .apply_texture(&placement(1, Vec3::new(0.0, 0.0, -10.0)), &image(), 1.0, "b", now)
            .unwrap();
        scene.frame(now).unwrap();

        let kinds = tracker.counts().last_draw_kinds;
        assert_eq!(
            kinds,
            vec![
                DrawKind::Background,
                DrawKind::Frame,
                DrawKind::Frame,
                DrawKind::Photo,
                DrawKind::Photo
            ]
        );
    }

    #[test]
    fn test_frame_skip_renders_every_other_frame() {
        let backend = CountingBackend::default();
        let tracker = backend.clone();
        let config = GalleryConfig::for_device(crate::config::DeviceClass::Constrained);
        let mut scene = SceneManager::new(config, 1);
        scene.initialize(backend, (400, 400)).unwrap();

        let now = Instant::now();
        let rendered: Vec<bool> = (0..4)
            .map(|i| scene.frame(now + Duration::from_millis(16 * i)).unwrap().rendered)
            .collect();
        assert_eq!(rendered, vec![false, true, false, true]);
        assert_eq!(tracker.counts().renders, 2);
    }

    #[test]
    fn test_pick_nearest_photo() {
        let (mut scene, _tracker) = active_scene(2);
        let now = Instant::now();
        scene
            .apply_texture(&placement(0, Vec3::new(0.0, 0.0, -10.0)), &image(), 1.0, "far", now)
            .unwrap();
        scene
            .apply_texture(&placement(1, Vec3::new(0.0, 0.0, 10.0)), &image(), 1.0, "near", now)
            .unwrap();

        assert_eq!(scene.pick(0.0, 0.0), Some(SlotIndex(1)));
        assert_eq!(scene.pick(0.95, 0.95), None);
    }

    #[test]
    fn test_teardown_balances_and_is_idempotent() {
        let (mut scene, tracker) = active_scene(3);
        let now = Instant::now();
        for i in 0..3 {
            let position = crate::layout::position(i, 3, 10.0);
            scene
                .apply_texture(&placement(i, position), &image(), 1.5, "x", now)
                .unwrap();
        }

        assert!(scene.teardown());
        assert!(!scene.teardown());
        assert_eq!(scene.phase(), ScenePhase::Disposed);

        let counts = tracker.counts();
        assert_eq!(counts.live_geometries(), 0);
        assert_eq!(counts.live_materials(), 0);
        assert_eq!(counts.live_textures(), 0);
        assert_eq!(counts.surfaces_released, 1);
        assert_eq!(counts.textures_created, 3);
    }
}
