//! Device-free test doubles for the render backend and the load executor.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use glam::Mat4;

use crate::descriptor::SlotIndex;
use crate::error::{GalleryError, LoadError};
use crate::loader::{DecodedImage, LoadCompletion, LoadExecutor, LoadJob};
use crate::scene::{Draw, DrawKind, MaterialDesc, RenderBackend};

#[derive(Debug)]
pub struct Handle(u32);

#[derive(Debug)]
pub struct TestMaterial {
    id: u32,
    pub opacity: f32,
    pub textured: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Counts {
    next_id: u32,
    pub geometries_created: usize,
    pub materials_created: usize,
    pub textures_created: usize,
    live_geometry: HashSet<u32>,
    live_material: HashSet<u32>,
    live_texture: HashSet<u32>,
    pub surfaces_released: usize,
    pub renders: usize,
    pub resizes: Vec<(u32, u32)>,
    pub last_draw_kinds: Vec<DrawKind>,
    pub last_sphere_segments: Option<u32>,
    pub material_colors: Vec<[f32; 4]>,
    fail_uploads: bool,
}

impl Counts {
    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    pub fn live_geometries(&self) -> usize {
        self.live_geometry.len()
    }

    pub fn live_materials(&self) -> usize {
        self.live_material.len()
    }

    pub fn live_textures(&self) -> usize {
        self.live_texture.len()
    }
}

/// Records every allocation; panics on a double dispose. Clones share state
/// so a test can keep a handle after handing the backend to the scene.
#[derive(Debug, Clone, Default)]
pub struct CountingBackend {
    counts: Rc<RefCell<Counts>>,
}

impl CountingBackend {
    pub fn counts(&self) -> Counts {
        self.counts.borrow().clone()
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.counts.borrow_mut().fail_uploads = fail;
    }
}

impl RenderBackend for CountingBackend {
    type Geometry = Handle;
    type Material = TestMaterial;
    type Texture = Handle;

    fn create_plane(&mut self, _width: f32, _height: f32, _segments: u32) -> Result<Handle, GalleryError> {
        let mut c = self.counts.borrow_mut();
        let id = c.next();
        c.geometries_created += 1;
        c.live_geometry.insert(id);
        Ok(Handle(id))
    }

    fn create_sphere(&mut self, _radius: f32, segments: u32) -> Result<Handle, GalleryError> {
        self.counts.borrow_mut().last_sphere_segments = Some(segments);
        self.create_plane(0.0, 0.0, segments)
    }

    fn upload_texture(&mut self, _image: &DecodedImage) -> Result<Handle, GalleryError> {
        let mut c = self.counts.borrow_mut();
        if c.fail_uploads {
            return Err(GalleryError::Backend("upload refused".to_string()));
        }
        let id = c.next();
        c.textures_created += 1;
        c.live_texture.insert(id);
        Ok(Handle(id))
    }

    fn create_material(
        &mut self,
        desc: &MaterialDesc,
        texture: Option<&Handle>,
    ) -> Result<TestMaterial, GalleryError> {
        let mut c = self.counts.borrow_mut();
        let id = c.next();
        c.materials_created += 1;
        c.live_material.insert(id);
        c.material_colors.push(desc.color);
        Ok(TestMaterial {
            id,
            opacity: desc.opacity,
            textured: texture.is_some(),
        })
    }

    fn update_material(&mut self, material: &mut TestMaterial, _transform: Mat4, opacity: f32) {
        material.opacity = opacity;
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.counts.borrow_mut().resizes.push((width, height));
    }

    fn render(&mut self, _view_proj: Mat4, draws: &[Draw<'_, Self>]) -> Result<(), GalleryError> {
        let mut c = self.counts.borrow_mut();
        c.renders += 1;
        c.last_draw_kinds = draws.iter().map(|d| d.kind).collect();
        Ok(())
    }

    fn dispose_geometry(&mut self, geometry: Handle) {
        assert!(
            self.counts.borrow_mut().live_geometry.remove(&geometry.0),
            "geometry {} disposed twice",
            geometry.0
        );
    }

    fn dispose_material(&mut self, material: TestMaterial) {
        assert!(
            self.counts.borrow_mut().live_material.remove(&material.id),
            "material {} disposed twice",
            material.id
        );
    }

    fn dispose_texture(&mut self, texture: Handle) {
        assert!(
            self.counts.borrow_mut().live_texture.remove(&texture.0),
            "texture {} disposed twice",
            texture.0
        );
    }

    fn release_surface(&mut self) {
        self.counts.borrow_mut().surfaces_released += 1;
    }
}

/// Holds submitted jobs until the test completes them explicitly. Jobs count
/// as taken by a worker on submit unless built with [`ManualExecutor::queued`].
#[derive(Debug, Default)]
pub struct ManualExecutor {
    pending: Vec<LoadJob>,
    submitted: Vec<LoadJob>,
    done: VecDeque<LoadCompletion>,
    hold_start: bool,
}

impl ManualExecutor {
    /// Jobs wait in the queue until [`start`](Self::start) is called.
    pub fn queued() -> Self {
        Self {
            hold_start: true,
            ..Self::default()
        }
    }

    pub fn start(&mut self, slot: SlotIndex) {
        if let Some(job) = self.pending.iter().find(|j| j.slot == slot) {
            job.started.raise();
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_slots(&self) -> Vec<SlotIndex> {
        self.pending.iter().map(|j| j.slot).collect()
    }

    pub fn submitted(&self) -> &[LoadJob] {
        &self.submitted
    }

    fn take(&mut self, slot: SlotIndex) -> LoadJob {
        let pos = self
            .pending
            .iter()
            .position(|j| j.slot == slot)
            .unwrap_or_else(|| panic!("no pending job for slot {}", slot));
        self.pending.remove(pos)
    }

    pub fn complete_ok(&mut self, slot: SlotIndex, image: DecodedImage) {
        let job = self.take(slot);
        self.done.push_back(LoadCompletion {
            slot,
            token: job.token,
            result: Ok(image),
        });
    }

    pub fn complete_err(&mut self, slot: SlotIndex, message: &str) {
        let job = self.take(slot);
        self.done.push_back(LoadCompletion {
            slot,
            token: job.token,
            result: Err(LoadError::Fetch {
                locator: job.locator,
                message: message.to_string(),
            }),
        });
    }
}

impl LoadExecutor for ManualExecutor {
    fn submit(&mut self, job: LoadJob) {
        if !self.hold_start {
            job.started.raise();
        }
        self.submitted.push(job.clone());
        self.pending.push(job);
    }

    fn try_next(&mut self) -> Option<LoadCompletion> {
        self.done.pop_front()
    }
}

/// Small solid image for completions.
pub fn solid_image(width: u32, height: u32) -> DecodedImage {
    DecodedImage {
        width,
        height,
        rgba: vec![200; (width * height * 4) as usize],
    }
}
