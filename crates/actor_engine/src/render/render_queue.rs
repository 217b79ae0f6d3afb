//! Render request queues
//!
//! Scene and UI image requests are sorted by `sorting_order`, ties broken by
//! submission sequence, when flushed. Text and pixel requests keep submission
//! order.

use super::backend::{RenderBackend, RenderLayer};
use crate::config::RenderingConfig;
use crate::engine::EngineError;
use crate::foundation::math::Vec2;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

/// 8-bit RGBA colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha
    pub a: u8,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    /// Opaque white
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
    
    /// Build from components
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
    
    /// Build from script numbers, saturating to `0..=255`
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_floats(r: f32, g: f32, b: f32, a: f32) -> Self {
        let channel = |v: f32| v.clamp(0.0, 255.0) as u8;
        Self::rgba(channel(r), channel(g), channel(b), channel(a))
    }
}

/// Scene or UI image draw
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    /// Image name
    pub image: String,
    /// Position (world units for the scene, pixels for UI)
    pub position: Vec2,
    /// Rotation in degrees
    pub rotation: f32,
    /// Scale; negative flips
    pub scale: Vec2,
    /// Pivot as a fraction of the image size
    pub pivot: Vec2,
    /// Tint
    pub tint: Color,
    /// Draw priority; lower draws first
    pub sorting_order: i32,
    /// Submission sequence, assigned when queued
    pub sequence: u64,
}

impl ImageRequest {
    /// Plain draw at a position
    pub fn new(image: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            image: image.into(),
            position: Vec2::new(x, y),
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
            pivot: Vec2::new(0.5, 0.5),
            tint: Color::WHITE,
            sorting_order: 0,
            sequence: 0,
        }
    }
    
    /// Set rotation in degrees
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }
    
    /// Set scale
    pub fn with_scale(mut self, x: f32, y: f32) -> Self {
        self.scale = Vec2::new(x, y);
        self
    }
    
    /// Set pivot
    pub fn with_pivot(mut self, x: f32, y: f32) -> Self {
        self.pivot = Vec2::new(x, y);
        self
    }
    
    /// Set tint
    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }
    
    /// Set sorting order
    pub fn with_sorting_order(mut self, order: i32) -> Self {
        self.sorting_order = order;
        self
    }
}

/// Text draw
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    /// Content
    pub text: String,
    /// Screen x
    pub x: f32,
    /// Screen y
    pub y: f32,
    /// Font name
    pub font: String,
    /// Point size
    pub size: u32,
    /// Colour
    pub color: Color,
}

/// Single pixel draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRequest {
    /// Screen x
    pub x: i32,
    /// Screen y
    pub y: i32,
    /// Colour
    pub color: Color,
}

/// Camera applied to scene-space draws
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Centre of the view in world units
    pub position: Vec2,
    /// Scene zoom factor
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            zoom: 1.0,
        }
    }
}

/// Frame-scoped draw queues
#[derive(Debug, Default)]
pub struct RenderScheduler {
    scene: RefCell<Vec<ImageRequest>>,
    ui: RefCell<Vec<ImageRequest>>,
    text: RefCell<VecDeque<TextRequest>>,
    pixels: RefCell<VecDeque<PixelRequest>>,
    sequence: Cell<u64>,
    camera: Cell<Camera>,
}

impl RenderScheduler {
    /// Create empty queues with the default camera
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Create queues with the camera set up from the rendering config
    pub fn from_config(config: &RenderingConfig) -> Self {
        let scheduler = Self::new();
        scheduler.camera.set(Camera {
            position: Vec2::new(config.cam_offset_x, config.cam_offset_y),
            zoom: config.zoom_factor,
        });
        scheduler
    }
    
    fn next_sequence(&self) -> u64 {
        let n = self.sequence.get();
        self.sequence.set(n + 1);
        n
    }
    
    /// Queue a scene-space image
    pub fn submit_scene(&self, mut request: ImageRequest) {
        request.sequence = self.next_sequence();
        self.scene.borrow_mut().push(request);
    }
    
    /// Queue a screen-space image
    pub fn submit_ui(&self, mut request: ImageRequest) {
        request.sequence = self.next_sequence();
        self.ui.borrow_mut().push(request);
    }
    
    /// Scene image at a position with defaults
    pub fn draw(&self, image: &str, x: f32, y: f32) {
        self.submit_scene(ImageRequest::new(image, x, y));
    }
    
    /// UI image at a position with defaults
    pub fn draw_ui(&self, image: &str, x: f32, y: f32) {
        self.submit_ui(ImageRequest::new(image, x, y));
    }
    
    /// Queue text
    pub fn draw_text(&self, request: TextRequest) {
        self.text.borrow_mut().push_back(request);
    }
    
    /// Queue a pixel
    pub fn draw_pixel(&self, x: i32, y: i32, color: Color) {
        self.pixels.borrow_mut().push_back(PixelRequest { x, y, color });
    }
    
    /// Current camera
    pub fn camera(&self) -> Camera {
        self.camera.get()
    }
    
    /// Move the camera
    pub fn set_camera_position(&self, x: f32, y: f32) {
        let mut camera = self.camera.get();
        camera.position = Vec2::new(x, y);
        self.camera.set(camera);
    }
    
    /// Change the scene zoom
    pub fn set_zoom(&self, zoom: f32) {
        let mut camera = self.camera.get();
        camera.zoom = zoom;
        self.camera.set(camera);
    }
    
    /// Number of queued requests across all queues
    pub fn pending(&self) -> usize {
        self.scene.borrow().len() + self.ui.borrow().len() + self.text.borrow().len() + self.pixels.borrow().len()
    }
    
    /// Replay and clear every queue
    ///
    /// Order: scene images at camera zoom, UI images at unit scale, then text,
    /// then pixels.
    pub fn flush(&self, backend: &mut dyn RenderBackend) -> Result<(), EngineError> {
        let mut scene = std::mem::take(&mut *self.scene.borrow_mut());
        let mut ui = std::mem::take(&mut *self.ui.borrow_mut());
        let text = std::mem::take(&mut *self.text.borrow_mut());
        let pixels = std::mem::take(&mut *self.pixels.borrow_mut());
        let camera = self.camera.get();
        
        scene.sort_by_key(|r| (r.sorting_order, r.sequence));
        ui.sort_by_key(|r| (r.sorting_order, r.sequence));
        
        backend.set_scale(camera.zoom);
        for request in &scene {
            backend.draw_image(RenderLayer::Scene, request, &camera)?;
        }
        backend.set_scale(1.0);
        for request in &ui {
            backend.draw_image(RenderLayer::Ui, request, &camera)?;
        }
        for request in &text {
            backend.draw_text(request)?;
        }
        for request in &pixels {
            backend.draw_pixel(request)?;
        }
        backend.present()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backend::{DrawCommand, RecordingBackend};

    fn drawn_images(backend: &RecordingBackend) -> Vec<String> {
        backend
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Image(_, request) => Some(request.image.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_sorting_order_then_submission() {
        let scheduler = RenderScheduler::new();
        scheduler.submit_scene(ImageRequest::new("late", 0.0, 0.0).with_sorting_order(5));
        scheduler.submit_scene(ImageRequest::new("first", 0.0, 0.0).with_sorting_order(1));
        scheduler.submit_scene(ImageRequest::new("second", 0.0, 0.0).with_sorting_order(1));
        scheduler.submit_scene(ImageRequest::new("early", 0.0, 0.0).with_sorting_order(-3));

        let mut backend = RecordingBackend::new();
        scheduler.flush(&mut backend).unwrap();
        assert_eq!(drawn_images(&backend), vec!["early", "first", "second", "late"]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_layers_flush_in_fixed_order() {
        let scheduler = RenderScheduler::new();
        scheduler.draw_pixel(1, 1, Color::WHITE);
        scheduler.draw_text(TextRequest {
            text: "hi".into(),
            x: 0.0,
            y: 0.0,
            font: "mono".into(),
            size: 12,
            color: Color::WHITE,
        });
        scheduler.draw_ui("hud", 0.0, 0.0);
        scheduler.draw("ship", 0.0, 0.0);
        scheduler.set_zoom(2.0);

        let mut backend = RecordingBackend::new();
        scheduler.flush(&mut backend).unwrap();
        let kinds: Vec<&str> = backend
            .commands()
            .iter()
            .map(|c| match c {
                DrawCommand::SetScale(_) => "scale",
                DrawCommand::Image(RenderLayer::Scene, _) => "scene",
                DrawCommand::Image(RenderLayer::Ui, _) => "ui",
                DrawCommand::Text(_) => "text",
                DrawCommand::Pixel(_) => "pixel",
                DrawCommand::Present => "present",
            })
            .collect();
        assert_eq!(kinds, vec!["scale", "scene", "scale", "ui", "text", "pixel", "present"]);
        assert_eq!(backend.commands()[0], DrawCommand::SetScale(2.0));
    }

    #[test]
    fn test_color_from_floats_saturates() {
        assert_eq!(Color::from_floats(300.0, -5.0, 12.7, 255.0), Color::rgba(255, 0, 12, 255));
    }
}
