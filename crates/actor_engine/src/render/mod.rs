//! Deferred 2D draw submission
//!
//! Draw calls made during the frame are queued on the [`RenderScheduler`] and
//! replayed into a [`RenderBackend`] at the end of the frame.

pub mod render_queue;
pub mod backend;

pub use backend::{DrawCommand, HeadlessBackend, RecordingBackend, RenderBackend, RenderLayer};
pub use render_queue::{Camera, Color, ImageRequest, PixelRequest, RenderScheduler, TextRequest};
