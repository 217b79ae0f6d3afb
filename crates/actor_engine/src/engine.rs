//! Core engine implementation
//!
//! [`EngineContext`] bundles every collaborator a component may reach during
//! a frame. It is built once and passed by shared reference into every hook,
//! so a test can stand up an isolated context without any global state.
//! [`Engine`] owns a context plus the draw and audio backends and runs the
//! frame loop.

use crate::audio::{AudioBackend, AudioSystem};
use crate::config::{Config, ConfigError, GameConfig, RenderingConfig};
use crate::ecs::{ComponentFactory, TemplateRegistry};
use crate::events::EventBus;
use crate::foundation::time::{FrameClock, FIXED_STEP};
use crate::input::InputManager;
use crate::physics::PhysicsSystem;
use crate::render::{RenderBackend, RenderScheduler};
use crate::scene::SceneDb;
use crate::script::{ScriptError, ScriptRegistry};
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory under the resource root holding scene documents
pub const SCENES_DIR: &str = "scenes";
/// Directory under the resource root holding actor templates
pub const TEMPLATES_DIR: &str = "actor_templates";

/// Configuration and resource errors; all of them are fatal
#[derive(Error, Debug)]
pub enum EngineError {
    /// A scene file does not exist
    #[error("scene {0} is missing")]
    MissingScene(String),

    /// A template name is not registered
    #[error("template {0} is missing")]
    MissingTemplate(String),

    /// A component type is neither native nor a registered script class
    #[error("failed to locate component {0}")]
    MissingComponentType(String),

    /// An image, font, audio clip or document is absent
    #[error("missing {kind}: {name}")]
    MissingResource {
        /// What kind of resource was requested
        kind: &'static str,
        /// The requested name or path
        name: String,
    },

    /// A declarative document could not be parsed
    #[error("malformed document {path}: {message}")]
    Document {
        /// Offending file
        path: String,
        /// Parser message
        message: String,
    },

    /// A required configuration value is absent
    #[error("{0} unspecified")]
    MissingSetting(&'static str),

    /// Configuration file error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared state reachable from every component hook
pub struct EngineContext {
    /// Component factory and script classes
    pub factory: ComponentFactory,
    /// Actor templates
    pub templates: TemplateRegistry,
    /// Current scene and transitions
    pub scenes: SceneDb,
    /// Publish/subscribe bus
    pub events: EventBus,
    /// Physics world and queries
    pub physics: PhysicsSystem,
    /// Draw request queues
    pub renderer: RenderScheduler,
    /// Audio command queue
    pub audio: AudioSystem,
    /// Keyboard and mouse state
    pub input: RefCell<InputManager>,
    /// Frame counter
    pub clock: FrameClock,
    fatal: RefCell<Option<EngineError>>,
    quit: Cell<bool>,
}

impl EngineContext {
    /// Create a context with no templates and an empty current scene
    pub fn new(scripts: ScriptRegistry, scenes_dir: impl Into<PathBuf>) -> Self {
        Self {
            factory: ComponentFactory::new(scripts),
            templates: TemplateRegistry::new(),
            scenes: SceneDb::new(scenes_dir),
            events: EventBus::new(),
            physics: PhysicsSystem::new(),
            renderer: RenderScheduler::new(),
            audio: AudioSystem::new(),
            input: RefCell::new(InputManager::new()),
            clock: FrameClock::new(FIXED_STEP),
            fatal: RefCell::new(None),
            quit: Cell::new(false),
        }
    }

    /// Load every template in `dir` using this context's factory
    pub fn load_templates(&mut self, dir: impl AsRef<Path>) -> Result<(), EngineError> {
        self.templates = TemplateRegistry::load_all(dir, &self.factory)?;
        Ok(())
    }

    /// Record a fatal error; the engine stops at the end of the current phase
    pub fn report_fatal(&self, err: EngineError) {
        log::error!("{}", err);
        let mut fatal = self.fatal.borrow_mut();
        if fatal.is_none() {
            *fatal = Some(err);
        }
    }

    /// Take the first fatal error reported since the last call
    pub fn take_fatal(&self) -> Option<EngineError> {
        self.fatal.borrow_mut().take()
    }

    /// Route a hook failure: runtime errors are logged and dropped, fatal ones recorded
    pub fn report_hook_error(&self, actor_name: &str, err: ScriptError) {
        match err {
            ScriptError::Runtime(detail) => log::error!("{} : {}", actor_name, detail),
            ScriptError::Fatal(err) => self.report_fatal(err),
        }
    }

    /// Ask the engine to stop after the current frame
    pub fn request_quit(&self) {
        log::info!("Engine shutdown requested");
        self.quit.set(true);
    }

    /// Whether a quit has been requested
    pub fn quit_requested(&self) -> bool {
        self.quit.get()
    }
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Resource root (`resources/`)
    pub resource_root: PathBuf,
    /// `game.config`
    pub game: GameConfig,
    /// `rendering.config`, defaults when absent
    pub rendering: RenderingConfig,
    /// Seconds the physics world advances per frame
    pub fixed_step: f32,
}

impl EngineConfig {
    /// Read the configuration files under `root`
    pub fn load(root: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let resource_root = root.into();
        if !resource_root.is_dir() {
            return Err(EngineError::MissingResource {
                kind: "resource directory",
                name: resource_root.display().to_string(),
            });
        }

        let game_path = resource_root.join("game.config");
        if !game_path.is_file() {
            return Err(EngineError::MissingResource {
                kind: "config",
                name: game_path.display().to_string(),
            });
        }
        let game = GameConfig::load_from_file(&game_path)?;

        let rendering_path = resource_root.join("rendering.config");
        let rendering = if rendering_path.is_file() {
            RenderingConfig::load_from_file(&rendering_path)?
        } else {
            RenderingConfig::default()
        };

        Ok(Self {
            resource_root,
            game,
            rendering,
            fixed_step: FIXED_STEP,
        })
    }
}

/// Main engine struct
///
/// Owns the context and the output backends and drives the frame loop.
pub struct Engine {
    context: EngineContext,
    render_backend: Box<dyn RenderBackend>,
    audio_backend: Box<dyn AudioBackend>,
    config: EngineConfig,
}

impl Engine {
    /// Build the context, load templates and enter the initial scene
    pub fn new(
        config: EngineConfig,
        scripts: ScriptRegistry,
        render_backend: Box<dyn RenderBackend>,
        audio_backend: Box<dyn AudioBackend>,
    ) -> Result<Self, EngineError> {
        log::info!("Initializing engine for {}", config.game.game_title);

        let initial_scene = config
            .game
            .initial_scene
            .clone()
            .ok_or(EngineError::MissingSetting("initial_scene"))?;

        let mut context = EngineContext::new(scripts, config.resource_root.join(SCENES_DIR));
        context.load_templates(config.resource_root.join(TEMPLATES_DIR))?;
        context.renderer = RenderScheduler::from_config(&config.rendering);
        context.clock = FrameClock::new(config.fixed_step);
        log::debug!("Loaded {} templates", context.templates.len());

        context.scenes.load_scene_now(&context, &initial_scene)?;
        if let Some(err) = context.take_fatal() {
            return Err(err);
        }

        Ok(Self {
            context,
            render_backend,
            audio_backend,
            config,
        })
    }

    /// The shared context
    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    /// The configuration the engine was built from
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn check_fatal(&self) -> Result<(), EngineError> {
        self.context.take_fatal().map_or(Ok(()), Err)
    }

    /// Run one frame
    pub fn frame(&mut self) -> Result<(), EngineError> {
        let ctx = &self.context;
        log::trace!("Frame {} begin", ctx.clock.frame());

        ctx.scenes.update(ctx);
        self.check_fatal()?;

        ctx.physics.step(ctx, ctx.clock.fixed_step());
        self.check_fatal()?;

        ctx.events.process_events();

        ctx.renderer.flush(self.render_backend.as_mut())?;
        ctx.audio.flush(self.audio_backend.as_mut())?;
        ctx.input.borrow_mut().late_update();

        ctx.scenes.apply_pending_transition(ctx)?;
        self.check_fatal()?;

        ctx.clock.tick();
        Ok(())
    }

    /// Run frames until quit is requested or `max_frames` frames have run
    pub fn run(&mut self, max_frames: Option<u64>) -> Result<(), EngineError> {
        log::info!("Starting main loop...");
        let mut frames = 0;
        while !self.context.quit_requested() && max_frames.map_or(true, |max| frames < max) {
            self.frame()?;
            frames += 1;
        }
        log::info!("Engine shutdown complete after {} frames", frames);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingAudioBackend;
    use crate::render::RecordingBackend;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    fn resources() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(SCENES_DIR)).unwrap();
        write(dir.path(), "game.config", r#"{ "game_title": "Test", "initial_scene": "basic" }"#);
        write(&dir.path().join(SCENES_DIR), "basic.scene", r#"{ "actors": [ { "name": "Hero" } ] }"#);
        dir
    }

    fn engine(root: &Path) -> Result<Engine, EngineError> {
        let config = EngineConfig::load(root)?;
        Engine::new(
            config,
            ScriptRegistry::new(),
            Box::new(RecordingBackend::new()),
            Box::new(RecordingAudioBackend::new()),
        )
    }

    #[test]
    fn test_engine_loads_initial_scene() {
        let dir = resources();
        let mut engine = engine(dir.path()).unwrap();
        assert_eq!(engine.context().scenes.current_name(), "basic");
        assert!(engine.context().scenes.find("Hero").is_some());

        engine.run(Some(3)).unwrap();
        assert_eq!(engine.context().clock.frame(), 3);
    }

    #[test]
    fn test_missing_initial_scene_setting() {
        let dir = resources();
        write(dir.path(), "game.config", r#"{ "game_title": "Test" }"#);
        assert!(matches!(engine(dir.path()), Err(EngineError::MissingSetting("initial_scene"))));
    }

    #[test]
    fn test_missing_scene_file() {
        let dir = resources();
        write(dir.path(), "game.config", r#"{ "initial_scene": "nowhere" }"#);
        assert!(matches!(engine(dir.path()), Err(EngineError::MissingScene(name)) if name == "nowhere"));
    }

    #[test]
    fn test_missing_resource_root() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("resources");
        assert!(matches!(
            EngineConfig::load(&missing),
            Err(EngineError::MissingResource { kind: "resource directory", .. })
        ));
        assert!(matches!(
            EngineConfig::load(dir.path()),
            Err(EngineError::MissingResource { kind: "config", .. })
        ));
    }

    #[test]
    fn test_quit_stops_run() {
        let dir = resources();
        let mut engine = engine(dir.path()).unwrap();
        engine.context().request_quit();
        engine.run(None).unwrap();
        assert_eq!(engine.context().clock.frame(), 0);
    }

    #[test]
    fn test_first_fatal_wins() {
        let ctx = EngineContext::new(ScriptRegistry::new(), "scenes");
        ctx.report_hook_error("Hero", ScriptError::runtime("ignored"));
        assert!(ctx.take_fatal().is_none());

        ctx.report_fatal(EngineError::MissingTemplate("first".into()));
        ctx.report_hook_error("Hero", ScriptError::Fatal(EngineError::MissingTemplate("second".into())));
        assert!(matches!(ctx.take_fatal(), Some(EngineError::MissingTemplate(name)) if name == "first"));
        assert!(ctx.take_fatal().is_none());
    }
}
