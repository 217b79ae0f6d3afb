//! Scenes, scene documents and the scene database

pub mod document;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod scene_db;

pub use document::{ActorDecl, SceneDocument, TemplateDocument};
pub use scene::Scene;
pub use scene_db::SceneDb;
