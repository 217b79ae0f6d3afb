//! Draw backends
//!
//! The engine only submits requests; rasterisation is the backend's job.
//! Two backends ship with the crate: [`RecordingBackend`] keeps every command
//! for inspection, [`HeadlessBackend`] validates resources against a
//! `resources/` tree without drawing.

use super::render_queue::{Camera, ImageRequest, PixelRequest, TextRequest};
use crate::engine::EngineError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Which queue an image came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderLayer {
    /// World space, camera and zoom applied
    Scene,
    /// Screen space
    Ui,
}

/// Receiver of flushed draw requests
///
/// A resource the backend cannot load is a configuration error and must be
/// reported as [`EngineError::MissingResource`].
pub trait RenderBackend {
    /// Set the render scale for subsequent draws
    fn set_scale(&mut self, scale: f32);
    
    /// Draw an image
    fn draw_image(&mut self, layer: RenderLayer, request: &ImageRequest, camera: &Camera) -> Result<(), EngineError>;
    
    /// Draw text
    fn draw_text(&mut self, request: &TextRequest) -> Result<(), EngineError>;
    
    /// Draw a pixel
    fn draw_pixel(&mut self, request: &PixelRequest) -> Result<(), EngineError>;
    
    /// Finish the frame
    fn present(&mut self) -> Result<(), EngineError> {
        Ok(())
    }
}

/// A recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// `set_scale`
    SetScale(f32),
    /// `draw_image`
    Image(RenderLayer, ImageRequest),
    /// `draw_text`
    Text(TextRequest),
    /// `draw_pixel`
    Pixel(PixelRequest),
    /// `present`
    Present,
}

/// Backend that records every call
#[derive(Debug, Default)]
pub struct RecordingBackend {
    commands: Vec<DrawCommand>,
    images: Option<HashSet<String>>,
}

impl RecordingBackend {
    /// Accept any image
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Accept only the listed images
    pub fn with_images<I, S>(images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            commands: Vec::new(),
            images: Some(images.into_iter().map(Into::into).collect()),
        }
    }
    
    /// Everything recorded so far
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }
    
    /// Forget recorded commands
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl RenderBackend for RecordingBackend {
    fn set_scale(&mut self, scale: f32) {
        self.commands.push(DrawCommand::SetScale(scale));
    }
    
    fn draw_image(&mut self, layer: RenderLayer, request: &ImageRequest, _camera: &Camera) -> Result<(), EngineError> {
        if let Some(images) = &self.images {
            if !images.contains(&request.image) {
                return Err(EngineError::MissingResource {
                    kind: "image",
                    name: request.image.clone(),
                });
            }
        }
        self.commands.push(DrawCommand::Image(layer, request.clone()));
        Ok(())
    }
    
    fn draw_text(&mut self, request: &TextRequest) -> Result<(), EngineError> {
        self.commands.push(DrawCommand::Text(request.clone()));
        Ok(())
    }
    
    fn draw_pixel(&mut self, request: &PixelRequest) -> Result<(), EngineError> {
        self.commands.push(DrawCommand::Pixel(*request));
        Ok(())
    }
    
    fn present(&mut self) -> Result<(), EngineError> {
        self.commands.push(DrawCommand::Present);
        Ok(())
    }
}

/// Backend that checks images and fonts exist under a resource root
///
/// Images resolve to `images/<name>.png`, fonts to `fonts/<name>.ttf`.
#[derive(Debug)]
pub struct HeadlessBackend {
    root: PathBuf,
    verified: HashSet<PathBuf>,
    frames: u64,
    draws: u64,
}

impl HeadlessBackend {
    /// Validate against `resource_root`
    pub fn new(resource_root: impl Into<PathBuf>) -> Self {
        Self {
            root: resource_root.into(),
            verified: HashSet::new(),
            frames: 0,
            draws: 0,
        }
    }
    
    /// Frames presented
    pub fn frames(&self) -> u64 {
        self.frames
    }
    
    /// Draw calls accepted
    pub fn draws(&self) -> u64 {
        self.draws
    }
    
    fn require(&mut self, kind: &'static str, relative: &Path, name: &str) -> Result<(), EngineError> {
        let path = self.root.join(relative);
        if self.verified.contains(&path) {
            return Ok(());
        }
        if !path.is_file() {
            return Err(EngineError::MissingResource {
                kind,
                name: name.to_string(),
            });
        }
        self.verified.insert(path);
        Ok(())
    }
}

impl RenderBackend for HeadlessBackend {
    fn set_scale(&mut self, _scale: f32) {}
    
    fn draw_image(&mut self, _layer: RenderLayer, request: &ImageRequest, _camera: &Camera) -> Result<(), EngineError> {
        let relative = Path::new("images").join(format!("{}.png", request.image));
        self.require("image", &relative, &request.image)?;
        self.draws += 1;
        Ok(())
    }
    
    fn draw_text(&mut self, request: &TextRequest) -> Result<(), EngineError> {
        let relative = Path::new("fonts").join(format!("{}.ttf", request.font));
        self.require("font", &relative, &request.font)?;
        self.draws += 1;
        Ok(())
    }
    
    fn draw_pixel(&mut self, _request: &PixelRequest) -> Result<(), EngineError> {
        self.draws += 1;
        Ok(())
    }
    
    fn present(&mut self) -> Result<(), EngineError> {
        self.frames += 1;
        log::trace!("Presented frame {} ({} draws so far)", self.frames, self.draws);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_backend_rejects_unknown_image() {
        let mut backend = RecordingBackend::with_images(["ship"]);
        let camera = Camera::default();
        assert!(backend.draw_image(RenderLayer::Scene, &ImageRequest::new("ship", 0.0, 0.0), &camera).is_ok());
        let err = backend
            .draw_image(RenderLayer::Scene, &ImageRequest::new("rock", 0.0, 0.0), &camera)
            .unwrap_err();
        assert!(matches!(err, EngineError::MissingResource { kind: "image", name } if name == "rock"));
    }

    #[test]
    fn test_headless_backend_checks_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("images")).unwrap();
        std::fs::write(dir.path().join("images/ship.png"), b"").unwrap();

        let mut backend = HeadlessBackend::new(dir.path());
        let camera = Camera::default();
        assert!(backend.draw_image(RenderLayer::Ui, &ImageRequest::new("ship", 0.0, 0.0), &camera).is_ok());
        assert!(backend.draw_image(RenderLayer::Ui, &ImageRequest::new("rock", 0.0, 0.0), &camera).is_err());
        assert_eq!(backend.draws(), 1);
    }
}
