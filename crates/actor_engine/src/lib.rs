//! # Actor Engine
//!
//! A 2D game engine runtime built around actors and components.
//!
//! ## Features
//!
//! - **Actor/Component lifecycle**: key-ordered `OnStart`, `OnUpdate`,
//!   `OnLateUpdate` and `OnDestroy` dispatch with deferred structural changes
//! - **Native and scripted components**: one dynamic get/set/invoke surface
//! - **Templates and scenes**: declarative JSON documents, cloned prototypes,
//!   actors preserved across scene transitions
//! - **Event bus**: topic publish/subscribe with end-of-frame subscription changes
//! - **Physics bridge**: collision/trigger callbacks and ray queries
//! - **Render and audio queues**: deterministic flush into pluggable backends
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use actor_engine::prelude::*;
//!
//! fn main() -> Result<(), EngineError> {
//!     let config = EngineConfig::load("resources")?;
//!     let mut engine = Engine::new(
//!         config,
//!         ScriptRegistry::new(),
//!         Box::new(HeadlessBackend::new("resources")),
//!         Box::new(HeadlessAudioBackend::new("resources")),
//!     )?;
//!     engine.run(Some(600))
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod script;
pub mod ecs;
pub mod scene;
pub mod events;
pub mod physics;
pub mod render;
pub mod audio;
pub mod input;

mod engine;

pub use engine::{Engine, EngineConfig, EngineContext, EngineError, SCENES_DIR, TEMPLATES_DIR};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        Engine, EngineConfig, EngineContext, EngineError,
        foundation::math::Vec2,
        script::{ScriptClass, ScriptError, ScriptFn, ScriptRegistry, ScriptResult, Value},
        ecs::{ActorHandle, ComponentRef, Hook, NativeComponent},
        scene::SceneDb,
        events::EventBus,
        physics::{Collision, HitResult, Rigidbody},
        render::{Color, HeadlessBackend, ImageRequest, RenderBackend, TextRequest},
        audio::{AudioBackend, HeadlessAudioBackend},
        input::{InputManager, KeyCode, MouseButton},
    };
}
