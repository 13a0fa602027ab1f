//! Native viewer: a square winit window hosting one gallery.

use std::sync::Arc;

use web_time::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use globe_gpu::{ClearColor, GpuConfig, GpuContext, RenderConfig};

use crate::config::{DeviceClass, GalleryConfig};
use crate::constants::CLICK_SLOP;
use crate::descriptor::ImageDescriptor;
use crate::gallery::{Gallery, GalleryEvent};
use crate::gpu_backend::WgpuBackend;
use crate::loader::ThreadPoolExecutor;

const WINDOW_TITLE: &str = "Globe Gallery";

/// Pixels of wheel travel that count as one zoom step.
const PIXELS_PER_WHEEL_STEP: f32 = 50.0;

type NativeGallery = Gallery<WgpuBackend, ThreadPoolExecutor>;

/// Square drawing size for a window side of `window_side` physical pixels,
/// rendered at no more than `max_pixel_ratio` pixels per logical pixel.
fn surface_side(window_side: u32, scale_factor: f64, max_pixel_ratio: f32) -> u32 {
    let scale = scale_factor.max(f64::EPSILON);
    let ratio = scale.min(f64::from(max_pixel_ratio));
    let logical = f64::from(window_side) / scale;
    (logical * ratio).round().max(1.0) as u32
}

/// The surface is presented stretched over the whole window, so cursor
/// pixels scale per axis into surface pixels.
fn window_to_surface(
    position: PhysicalPosition<f64>,
    window: PhysicalSize<u32>,
    surface: (u32, u32),
) -> (f32, f32) {
    let sx = f64::from(surface.0) / f64::from(window.width.max(1));
    let sy = f64::from(surface.1) / f64::from(window.height.max(1));
    ((position.x * sx) as f32, (position.y * sy) as f32)
}

/// Left-button press tracking to tell clicks from drags.
#[derive(Debug, Default)]
struct PointerState {
    cursor: Option<PhysicalPosition<f64>>,
    pressed_at: Option<PhysicalPosition<f64>>,
    dragging: bool,
}

pub struct GalleryApp {
    descriptors: Vec<ImageDescriptor>,
    config: GalleryConfig,
    surface_size: u32,
    window: Option<Arc<Window>>,
    gallery: Option<NativeGallery>,
    pointer: PointerState,
    error: Option<String>,
}

impl GalleryApp {
    pub fn new(descriptors: Vec<ImageDescriptor>, config: GalleryConfig, surface_size: u32) -> Self {
        Self {
            descriptors,
            config,
            surface_size,
            window: None,
            gallery: None,
            pointer: PointerState::default(),
            error: None,
        }
    }

    fn start(&mut self, window: Arc<Window>) -> Result<NativeGallery, String> {
        let gpu_config = match self.config.device {
            DeviceClass::Desktop => GpuConfig::default(),
            DeviceClass::Constrained => GpuConfig::power_saving(),
        };
        let ctx = pollster::block_on(GpuContext::with_config(window.clone(), gpu_config))
            .map_err(|e| format!("GPU initialization failed: {}", e))?;
        let render_config = RenderConfig::default().with_clear_color(ClearColor::ROSE);
        let backend = WgpuBackend::new(ctx, render_config).map_err(|e| e.to_string())?;
        let executor = ThreadPoolExecutor::spawn(
            self.config.max_concurrent_loads,
            self.config.fast_decode,
            self.config.load_timeout,
        )
        .map_err(|e| format!("Failed to spawn decoder threads: {}", e))?;

        let mut gallery = Gallery::new(
            self.descriptors.clone(),
            self.config.clone(),
            executor,
            &mut rand::thread_rng(),
        );

        let inner = window.inner_size();
        let scale = window.scale_factor();
        let size = surface_side(inner.width.min(inner.height), scale, self.config.max_pixel_ratio);
        log::info!("Mounting gallery at {}px (scale {:.2})", size, scale);
        gallery
            .mount(backend, size, Instant::now())
            .map_err(|e| e.to_string())?;
        Ok(gallery)
    }

    /// Tear the gallery down while the window and GPU context still exist.
    fn shutdown(&mut self) {
        if let Some(mut gallery) = self.gallery.take() {
            gallery.teardown();
        }
    }

    fn handle_events(&mut self) {
        let (Some(gallery), Some(window)) = (self.gallery.as_mut(), self.window.as_ref()) else {
            return;
        };
        for event in gallery.drain_events() {
            match event {
                GalleryEvent::Picked { fullsize } => {
                    log::info!("Opening {}", fullsize);
                    window.set_title(&format!("{} - {}", WINDOW_TITLE, fullsize));
                    gallery.fullsize_loaded();
                }
                GalleryEvent::ViewerClosed => {
                    window.set_title(WINDOW_TITLE);
                }
                GalleryEvent::Initializing(active) => {
                    log::debug!("Initializing: {}", active);
                }
            }
        }
    }

    fn mouse_input(&mut self, state: ElementState) {
        let (Some(gallery), Some(window)) = (self.gallery.as_mut(), self.window.as_ref()) else {
            return;
        };
        match state {
            ElementState::Pressed => {
                self.pointer.pressed_at = self.pointer.cursor;
                self.pointer.dragging = false;
            }
            ElementState::Released => {
                if let (Some(pos), false) = (self.pointer.pressed_at, self.pointer.dragging) {
                    let (x, y) =
                        window_to_surface(pos, window.inner_size(), gallery.scene().surface_size());
                    gallery.click(x, y);
                }
                self.pointer.pressed_at = None;
                self.pointer.dragging = false;
            }
        }
    }

    /// Keep the window square and follow it with the drawing surface.
    fn resized(&mut self, size: PhysicalSize<u32>) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        let side = size.width.min(size.height);
        if size.width != size.height {
            let _ = window.request_inner_size(PhysicalSize::new(side, side));
        }
        let surface = surface_side(side, window.scale_factor(), self.config.max_pixel_ratio);
        if let Some(gallery) = self.gallery.as_mut() {
            gallery.resize(surface);
        }
    }

    fn cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        let last = self.pointer.cursor.replace(position);
        let Some(gallery) = self.gallery.as_mut() else {
            return;
        };
        let Some(pressed_at) = self.pointer.pressed_at else {
            return;
        };

        if !self.pointer.dragging {
            let travel = ((position.x - pressed_at.x).powi(2) + (position.y - pressed_at.y).powi(2)).sqrt();
            self.pointer.dragging = travel as f32 > CLICK_SLOP;
        }
        if self.pointer.dragging {
            if let Some(last) = last {
                gallery.drag((position.x - last.x) as f32, (position.y - last.y) as f32);
            }
        }
    }
}

impl ApplicationHandler for GalleryApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(self.surface_size, self.surface_size));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.error = Some(format!("Failed to create window: {}", e));
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        match self.start(window) {
            Ok(gallery) => self.gallery = Some(gallery),
            Err(e) => {
                log::error!("{}", e);
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => {
                if let Some(gallery) = self.gallery.as_mut() {
                    gallery.close_viewer();
                }
            }
            WindowEvent::Resized(size) => self.resized(size),
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.mouse_input(state),
            WindowEvent::CursorMoved { position, .. } => self.cursor_moved(position),
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_WHEEL_STEP,
                };
                if let Some(gallery) = self.gallery.as_mut() {
                    gallery.wheel(steps);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(gallery) = self.gallery.as_mut() {
                    if let Err(e) = gallery.frame(Instant::now()) {
                        log::error!("Frame failed: {}", e);
                    }
                }
                self.handle_events();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

/// Open the viewer and block until the window closes.
pub fn run(descriptors: Vec<ImageDescriptor>, config: GalleryConfig, surface_size: u32) -> Result<(), String> {
    let event_loop = EventLoop::new().map_err(|e| format!("Failed to create event loop: {:?}", e))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GalleryApp::new(descriptors, config, surface_size);
    event_loop
        .run_app(&mut app)
        .map_err(|e| format!("Event loop error: {:?}", e))?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
