//! The gallery facade: wires layout, loader, prioritizer, scene and
//! interaction together and drives them from the host's frame callback.

use glam::Vec3;
use rand::Rng;
use web_time::Instant;

use crate::config::GalleryConfig;
use crate::descriptor::{ImageDescriptor, SlotIndex, dedup_by_thumbnail};
use crate::error::{GalleryError, LoadError};
use crate::interaction::{InteractionController, ViewerState};
use crate::layout::{self, PlacementSlot};
use crate::lifecycle::{CancellationToken, Debounce, Interval, Throttle};
use crate::loader::{LoadEvent, LoadExecutor, RequestOutcome, ResourceLoader};
use crate::prioritizer::VisibilityPrioritizer;
use crate::scene::{FrameOutcome, RenderBackend, SceneManager, ScenePhase};

/// Notifications for the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryEvent {
    /// A photo was clicked; the host should show this full-size reference.
    Picked { fullsize: String },
    /// Scene construction started (`true`) or finished (`false`).
    Initializing(bool),
    ViewerClosed,
}

pub struct Gallery<B: RenderBackend, E: LoadExecutor> {
    config: GalleryConfig,
    descriptors: Vec<ImageDescriptor>,
    slots: Vec<PlacementSlot>,
    loader: ResourceLoader,
    prioritizer: VisibilityPrioritizer,
    scene: SceneManager<B>,
    interaction: InteractionController,
    executor: E,
    token: CancellationToken,
    control_debounce: Debounce,
    safety_interval: Interval,
    resize_throttle: Throttle<u32>,
    target_size: u32,
    events: Vec<GalleryEvent>,
}

impl<B: RenderBackend, E: LoadExecutor> Gallery<B, E> {
    /// Build a gallery for `descriptors`. Duplicate thumbnails are dropped;
    /// `rng` only feeds the orientation jitter.
    pub fn new<R: Rng>(
        descriptors: Vec<ImageDescriptor>,
        config: GalleryConfig,
        executor: E,
        rng: &mut R,
    ) -> Self {
        let descriptors = dedup_by_thumbnail(descriptors);
        let slots = layout::layout(descriptors.len(), config.sphere_radius, rng);
        let token = CancellationToken::new();
        let loader = ResourceLoader::new(
            descriptors.len(),
            config.max_concurrent_loads,
            config.load_timeout,
            token.clone(),
        );

        log::info!(
            "Gallery of {} photos ({:?}, {} concurrent loads)",
            descriptors.len(),
            config.device,
            config.max_concurrent_loads
        );

        Self {
            prioritizer: VisibilityPrioritizer::new(config.candidates_per_pass),
            scene: SceneManager::new(config.clone(), descriptors.len()),
            interaction: InteractionController::new(),
            control_debounce: Debounce::new(config.control_debounce),
            safety_interval: Interval::new(config.safety_interval),
            resize_throttle: Throttle::new(config.resize_throttle),
            target_size: 0,
            events: Vec::new(),
            config,
            descriptors,
            slots,
            loader,
            executor,
            token,
        }
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn descriptors(&self) -> &[ImageDescriptor] {
        &self.descriptors
    }

    pub fn slots(&self) -> &[PlacementSlot] {
        &self.slots
    }

    pub fn loader(&self) -> &ResourceLoader {
        &self.loader
    }

    pub fn scene(&self) -> &SceneManager<B> {
        &self.scene
    }

    pub fn phase(&self) -> ScenePhase {
        self.scene.phase()
    }

    pub fn viewer(&self) -> &ViewerState {
        self.interaction.viewer()
    }

    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    pub fn is_torn_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Take queued events.
    pub fn drain_events(&mut self) -> Vec<GalleryEvent> {
        std::mem::take(&mut self.events)
    }

    /// Attach to a square drawing surface of `size` pixels and start loading.
    pub fn mount(&mut self, backend: B, size: u32, now: Instant) -> Result<(), GalleryError> {
        if self.token.is_cancelled() {
            return Err(GalleryError::InvalidTransition(ScenePhase::Disposed));
        }
        self.events.push(GalleryEvent::Initializing(true));
        let result = self.scene.initialize(backend, (size, size));
        self.events.push(GalleryEvent::Initializing(false));
        result?;

        self.target_size = size;

        if let Some(first) = self.descriptors.first() {
            let outcome = self
                .loader
                .request_load(SlotIndex(0), &first.thumbnail, &mut self.executor, now);
            if outcome == RequestOutcome::Started {
                self.after_load_started(SlotIndex(0));
            }
        }
        self.check_and_load_more(now);
        if self.loader.has_unloaded() {
            self.safety_interval.start(now);
        }
        Ok(())
    }

    fn after_load_started(&mut self, slot: SlotIndex) {
        if !self.config.placeholders {
            return;
        }
        if let Some(placement) = self.slots.get(slot.get()).copied() {
            if let Err(e) = self.scene.create_placeholder(&placement) {
                log::warn!("Placeholder for slot {} failed: {}", slot, e);
            }
        }
    }

    /// One prioritizer pass.
    pub fn check_and_load_more(&mut self, now: Instant) {
        if !self.scene.is_active() {
            return;
        }
        let frustum = self.scene.frustum();
        let started = self.prioritizer.check_and_load_more(
            &mut self.loader,
            &self.slots,
            &self.descriptors,
            &frustum,
            &mut self.executor,
            now,
        );
        for slot in started {
            self.after_load_started(slot);
        }
        if !self.loader.has_unloaded() && self.safety_interval.is_running() {
            log::debug!("All slots requested, stopping safety timer");
            self.safety_interval.cancel();
        }
    }

    fn fail_slot(&mut self, slot: SlotIndex, error: &LoadError) {
        log::warn!("Load of slot {} failed: {}", slot, error);
        self.scene.remove_object(slot);
    }

    fn apply_load_event(&mut self, event: LoadEvent, now: Instant) {
        match event {
            LoadEvent::TextureReady {
                slot,
                image,
                aspect,
            } => {
                let (Some(placement), Some(descriptor)) =
                    (self.slots.get(slot.get()), self.descriptors.get(slot.get()))
                else {
                    return;
                };
                match self
                    .scene
                    .apply_texture(placement, &image, aspect, &descriptor.thumbnail, now)
                {
                    Ok(()) => {
                        if let Err(e) = self.loader.mark_loaded(slot) {
                            log::warn!("{}", e);
                        }
                    }
                    Err(error) => {
                        if let Err(e) = self.loader.mark_failed(slot) {
                            log::warn!("{}", e);
                        }
                        self.fail_slot(slot, &error);
                    }
                }
            }
            LoadEvent::LoadFailed { slot, error } => self.fail_slot(slot, &error),
        }
    }

    /// Drive one frame: apply finished loads, expire stuck ones, advance
    /// the scene and fire due timers.
    pub fn frame(&mut self, now: Instant) -> Result<FrameOutcome, GalleryError> {
        if !self.scene.is_active() {
            return Ok(FrameOutcome::default());
        }

        if let Some(size) = self.resize_throttle.poll(now) {
            self.scene.resize(size, size);
        }

        while let Some(completion) = self.executor.try_next() {
            if let Some(event) = self.loader.accept(completion) {
                self.apply_load_event(event, now);
                self.check_and_load_more(now);
            }
        }

        let expired = self.loader.expire_timeouts(now);
        if !expired.is_empty() {
            for (slot, error) in &expired {
                self.fail_slot(*slot, error);
            }
            self.check_and_load_more(now);
        }

        let outcome = self.scene.frame(now)?;
        if outcome.controls_changed {
            self.control_debounce.poke(now);
        }
        if self.control_debounce.poll(now) {
            log::debug!("Camera settled, checking visible slots");
            self.check_and_load_more(now);
        }
        if self.safety_interval.poll(now) {
            self.check_and_load_more(now);
        }

        Ok(outcome)
    }

    /// Pointer drag in pixels.
    pub fn drag(&mut self, dx: f32, dy: f32) {
        let (_, height) = self.scene.surface_size();
        self.scene.controls_mut().rotate(dx, dy, height as f32);
    }

    /// Wheel input; positive zooms in.
    pub fn wheel(&mut self, steps: f32) {
        self.scene.controls_mut().zoom(steps);
    }

    /// Turn the camera to look at the sphere from `direction`.
    pub fn look_from(&mut self, direction: Vec3) {
        self.scene.controls_mut().look_from(direction);
    }

    /// Click at surface-relative pixel coordinates.
    pub fn click(&mut self, x: f32, y: f32) -> Option<String> {
        let fullsize =
            self.interaction
                .handle_pointer_click(&mut self.scene, &self.descriptors, x, y)?;
        self.events.push(GalleryEvent::Picked {
            fullsize: fullsize.clone(),
        });
        Some(fullsize)
    }

    pub fn close_viewer(&mut self) {
        if self.interaction.close_viewer(&mut self.scene) {
            self.events.push(GalleryEvent::ViewerClosed);
        }
    }

    pub fn fullsize_loaded(&mut self) {
        self.interaction.fullsize_loaded();
    }

    /// Container width changed; the square size becomes
    /// `min(container_width, size)` once the throttle allows.
    pub fn resize(&mut self, container_width: u32) {
        if self.target_size == 0 || container_width == 0 {
            return;
        }
        self.resize_throttle
            .submit(container_width.min(self.target_size));
    }

    /// Stop everything and release every GPU allocation. Safe to call more
    /// than once.
    pub fn teardown(&mut self) {
        if !self.token.cancel() {
            return;
        }
        self.control_debounce.cancel();
        self.safety_interval.cancel();
        self.resize_throttle.cancel();
        self.loader.clear();
        self.scene.teardown();
        log::info!("Gallery torn down");
    }

    /// Whether the safety timer is still armed.
    pub fn safety_timer_running(&self) -> bool {
        self.safety_interval.is_running()
    }
}

impl<B: RenderBackend, E: LoadExecutor> Drop for Gallery<B, E> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeviceClass;
    use crate::loader::LoadState;
    use crate::testing::{CountingBackend, ManualExecutor, solid_image};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::Duration;

    type TestGallery = Gallery<CountingBackend, ManualExecutor>;

    fn descriptors(n: usize) -> Vec<ImageDescriptor> {
        (0..n)
            .map(|i| ImageDescriptor::new(format!("t{}.jpg", i), format!("f{}.jpg", i)))
            .collect()
    }

    fn gallery(n: usize, config: GalleryConfig) -> (TestGallery, CountingBackend) {
        let mut rng = StdRng::seed_from_u64(42);
        let mut gallery = Gallery::new(descriptors(n), config, ManualExecutor::default(), &mut rng);
        let backend = CountingBackend::default();
        let tracker = backend.clone();
        gallery.mount(backend, 400, Instant::now()).unwrap();
        (gallery, tracker)
    }

    fn mounted_at(n: usize, config: GalleryConfig, now: Instant) -> TestGallery {
        let mut rng = StdRng::seed_from_u64(42);
        let mut gallery = Gallery::new(descriptors(n), config, ManualExecutor::default(), &mut rng);
        gallery.mount(CountingBackend::default(), 400, now).unwrap();
        gallery
    }

    /// Give one in-flight slot's budget back without a completion, so no
    /// completion-driven pass runs.
    fn free_one_slot(gallery: &mut TestGallery) {
        let freed = gallery.executor_mut().pending_slots()[1];
        gallery.loader.mark_failed(freed).unwrap();
        assert_eq!(gallery.loader().remaining_budget(), 1);
    }

    /// Complete every pending job successfully, frame by frame.
    fn load_everything(gallery: &mut TestGallery, now: Instant) {
        for _ in 0..100 {
            let pending = gallery.executor_mut().pending_slots();
            if pending.is_empty() {
                return;
            }
            for slot in pending {
                gallery.executor_mut().complete_ok(slot, solid_image(4, 3));
            }
            gallery.frame(now).unwrap();
        }
        panic!("loads never drained");
    }

    #[test]
    fn test_mount_emits_initializing_and_requests_first() {
        let (mut gallery, _tracker) = gallery(5, GalleryConfig::default());

        assert_eq!(
            gallery.drain_events(),
            vec![GalleryEvent::Initializing(true), GalleryEvent::Initializing(false)]
        );
        assert_eq!(gallery.phase(), ScenePhase::Active);
        assert_eq!(gallery.loader().state(SlotIndex(0)), Some(LoadState::Loading));
        assert_eq!(gallery.loader().loading_count(), 2);
        assert!(gallery.safety_timer_running());
    }

    #[test]
    fn test_mount_without_surface_fails() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut gallery: TestGallery =
            Gallery::new(descriptors(2), GalleryConfig::default(), ManualExecutor::default(), &mut rng);
        let result = gallery.mount(CountingBackend::default(), 0, Instant::now());

        assert!(matches!(result, Err(GalleryError::SurfaceUnavailable)));
        assert_eq!(gallery.phase(), ScenePhase::Uninitialized);
        assert_eq!(gallery.loader().loading_count(), 0);
    }

    #[test]
    fn test_duplicates_dropped_at_construction() {
        let mut list = descriptors(3);
        list.push(ImageDescriptor::new("t1.jpg", "dupe.jpg"));
        let mut rng = StdRng::seed_from_u64(1);
        let gallery: TestGallery =
            Gallery::new(list, GalleryConfig::default(), ManualExecutor::default(), &mut rng);

        assert_eq!(gallery.descriptors().len(), 3);
        assert_eq!(gallery.slots().len(), 3);
    }

    #[test]
    fn test_constrained_cap_never_exceeded() {
        let config = GalleryConfig::for_device(DeviceClass::Constrained);
        let (mut gallery, _tracker) = gallery(6, config);
        let now = Instant::now();

        assert_eq!(gallery.loader().loading_count(), 1);
        for step in 0..10 {
            gallery.frame(now + Duration::from_secs(step)).unwrap();
            assert!(gallery.loader().loading_count() <= 1);
        }
    }

    #[test]
    fn test_failure_frees_slot_for_next_load() {
        let config = GalleryConfig::for_device(DeviceClass::Constrained);
        let (mut gallery, _tracker) = gallery(4, config);
        let now = Instant::now();

        gallery.executor_mut().complete_err(SlotIndex(0), "404");
        gallery.frame(now).unwrap();

        assert_eq!(gallery.loader().state(SlotIndex(0)), Some(LoadState::Failed));
        assert_eq!(gallery.loader().loading_count(), 1);
        assert!(gallery.scene().object(SlotIndex(0)).is_none());
        assert_eq!(gallery.executor_mut().pending_len(), 1);
    }

    #[test]
    fn test_all_loaded_stops_safety_timer() {
        let (mut gallery, _tracker) = gallery(5, GalleryConfig::default());
        load_everything(&mut gallery, Instant::now());

        assert_eq!(gallery.loader().count(LoadState::Loaded), 5);
        assert_eq!(gallery.scene().object_count(), 5);
        assert!(!gallery.safety_timer_running());
    }

    #[test]
    fn test_camera_move_loads_only_after_quiet_period() {
        let config = GalleryConfig::default();
        let debounce = config.control_debounce;
        let t0 = Instant::now();
        let mut gallery = mounted_at(8, config, t0);
        gallery.scene.controls_mut().enable_damping = false;
        assert_eq!(gallery.executor_mut().submitted().len(), 2);
        free_one_slot(&mut gallery);

        gallery.drag(40.0, 0.0);
        let t1 = t0 + Duration::from_millis(100);
        assert!(gallery.frame(t1).unwrap().controls_changed);
        assert_eq!(gallery.executor_mut().submitted().len(), 2);

        gallery.frame(t1 + debounce - Duration::from_millis(1)).unwrap();
        assert_eq!(gallery.executor_mut().submitted().len(), 2);

        gallery.frame(t1 + debounce).unwrap();
        assert_eq!(gallery.executor_mut().submitted().len(), 3);
        assert_eq!(gallery.loader().loading_count(), 2);
    }

    #[test]
    fn test_zoom_restarts_quiet_period() {
        let config = GalleryConfig::default();
        let debounce = config.control_debounce;
        let t0 = Instant::now();
        let mut gallery = mounted_at(8, config, t0);
        gallery.scene.controls_mut().enable_damping = false;
        free_one_slot(&mut gallery);

        gallery.wheel(1.0);
        let t1 = t0 + Duration::from_millis(100);
        gallery.frame(t1).unwrap();

        let t2 = t1 + debounce / 2;
        gallery.wheel(-1.0);
        gallery.frame(t2).unwrap();
        gallery.frame(t1 + debounce).unwrap();
        assert_eq!(gallery.executor_mut().submitted().len(), 2);

        gallery.frame(t2 + debounce).unwrap();
        assert_eq!(gallery.executor_mut().submitted().len(), 3);
    }

    #[test]
    fn test_safety_tick_alone_starts_load() {
        let config = GalleryConfig::default();
        let period = config.safety_interval;
        let t0 = Instant::now();
        let mut gallery = mounted_at(8, config, t0);
        free_one_slot(&mut gallery);

        gallery.frame(t0 + period - Duration::from_millis(1)).unwrap();
        assert_eq!(gallery.executor_mut().submitted().len(), 2);

        gallery.frame(t0 + period).unwrap();
        assert_eq!(gallery.executor_mut().submitted().len(), 3);
        assert_eq!(gallery.loader().loading_count(), 2);
        assert!(gallery.safety_timer_running());
    }

    #[test]
    fn test_timeout_fails_slot() {
        let config = GalleryConfig::for_device(DeviceClass::Constrained);
        let (mut gallery, _tracker) = gallery(3, config);
        let t0 = Instant::now();

        gallery.frame(t0 + Duration::from_secs(21)).unwrap();
        assert_eq!(gallery.loader().state(SlotIndex(0)), Some(LoadState::Failed));
        assert_eq!(gallery.loader().loading_count(), 1);

        // The stale result for slot 0 arrives after all.
        gallery.executor_mut().complete_ok(SlotIndex(0), solid_image(2, 2));
        gallery.frame(t0 + Duration::from_secs(22)).unwrap();
        assert!(gallery.scene().object(SlotIndex(0)).is_none());
    }

    #[test]
    fn test_pick_after_looking_at_slot() {
        let (mut gallery, _tracker) = gallery(8, GalleryConfig::default());
        let now = Instant::now();
        load_everything(&mut gallery, now);
        gallery.drain_events();

        let direction = gallery.slots()[3].position;
        gallery.look_from(direction);
        gallery.frame(now).unwrap();

        let picked = gallery.click(200.0, 200.0);
        assert_eq!(picked.as_deref(), Some("f3.jpg"));
        assert_eq!(
            gallery.drain_events(),
            vec![GalleryEvent::Picked {
                fullsize: "f3.jpg".to_string()
            }]
        );
        assert!(!gallery.scene().controls().auto_rotate);
        assert!(gallery.viewer().is_loading_fullsize);

        gallery.close_viewer();
        assert!(gallery.scene().controls().auto_rotate);
        assert_eq!(gallery.drain_events(), vec![GalleryEvent::ViewerClosed]);
    }

    #[test]
    fn test_teardown_releases_everything_once() {
        let (mut gallery, tracker) = gallery(6, GalleryConfig::default());
        let now = Instant::now();
        load_everything(&mut gallery, now);

        gallery.teardown();
        gallery.teardown();

        let counts = tracker.counts();
        assert_eq!(counts.live_geometries(), 0);
        assert_eq!(counts.live_materials(), 0);
        assert_eq!(counts.live_textures(), 0);
        assert_eq!(counts.surfaces_released, 1);
        assert_eq!(gallery.phase(), ScenePhase::Disposed);
        assert!(gallery.is_torn_down());
    }

    #[test]
    fn test_completion_after_teardown_is_discarded() {
        let (mut gallery, tracker) = gallery(3, GalleryConfig::default());
        gallery.teardown();

        gallery.executor_mut().complete_ok(SlotIndex(0), solid_image(2, 2));
        gallery.frame(Instant::now()).unwrap();

        assert_eq!(tracker.counts().textures_created, 0);
        assert_eq!(gallery.loader().state(SlotIndex(0)), Some(LoadState::Loading));
    }

    #[test]
    fn test_resize_is_throttled_and_clamped() {
        let (mut gallery, tracker) = gallery(2, GalleryConfig::default());
        let t0 = Instant::now();

        gallery.resize(300);
        gallery.frame(t0).unwrap();
        gallery.resize(1000);
        gallery.frame(t0 + Duration::from_millis(50)).unwrap();
        gallery.frame(t0 + Duration::from_millis(150)).unwrap();

        assert_eq!(tracker.counts().resizes, vec![(300, 300), (400, 400)]);
    }

    #[test]
    fn test_placeholders_follow_load_lifecycle() {
        let config = GalleryConfig {
            placeholders: true,
            ..GalleryConfig::for_device(DeviceClass::Constrained)
        };
        let (mut gallery, tracker) = gallery(2, config);
        assert!(gallery.scene().object(SlotIndex(0)).unwrap().is_placeholder());

        gallery.executor_mut().complete_err(SlotIndex(0), "broken");
        gallery.frame(Instant::now()).unwrap();
        assert!(gallery.scene().object(SlotIndex(0)).is_none());
        assert!(gallery.scene().object(SlotIndex(1)).unwrap().is_placeholder());

        gallery.teardown();
        assert_eq!(tracker.counts().live_geometries(), 0);
    }
}
