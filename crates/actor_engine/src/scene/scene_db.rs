//! Current-scene facade: transitions, lookup, spawn and destroy

use super::document::{read_document, PropertyMapExt, SceneDocument};
use super::scene::Scene;
use crate::ecs::actor::RUNTIME_ID_BASE;
use crate::ecs::{Actor, ActorHandle, ActorId};
use crate::engine::{EngineContext, EngineError};
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// File extension of scene documents
pub const SCENE_EXTENSION: &str = "scene";

/// Owns the current scene and applies scene transitions between frames
#[derive(Debug)]
pub struct SceneDb {
    current: RefCell<Rc<Scene>>,
    next_scene: RefCell<Option<String>>,
    scenes_dir: PathBuf,
    next_runtime_id: Cell<ActorId>,
}

impl SceneDb {
    /// Create a database reading scenes from `scenes_dir`, starting with an empty scene
    pub fn new(scenes_dir: impl Into<PathBuf>) -> Self {
        Self {
            current: RefCell::new(Rc::new(Scene::default())),
            next_scene: RefCell::new(None),
            scenes_dir: scenes_dir.into(),
            next_runtime_id: Cell::new(RUNTIME_ID_BASE),
        }
    }
    
    /// Directory scenes are read from
    pub fn scenes_dir(&self) -> &Path {
        &self.scenes_dir
    }
    
    /// The current scene
    pub fn current(&self) -> Rc<Scene> {
        Rc::clone(&self.current.borrow())
    }
    
    /// Name of the current scene
    pub fn current_name(&self) -> String {
        self.current.borrow().name().to_string()
    }
    
    fn next_id(&self) -> ActorId {
        let id = self.next_runtime_id.get();
        self.next_runtime_id.set(id + 1);
        id
    }
    
    /// Request a transition to `name` at the end of the frame
    pub fn load(&self, name: impl Into<String>) {
        let name = name.into();
        log::debug!("Scene {} requested", name);
        *self.next_scene.borrow_mut() = Some(name);
    }
    
    /// Whether a transition is waiting
    pub fn has_pending_transition(&self) -> bool {
        self.next_scene.borrow().is_some()
    }
    
    /// Perform the requested transition, if any
    pub fn apply_pending_transition(&self, ctx: &EngineContext) -> Result<(), EngineError> {
        let Some(name) = self.next_scene.borrow_mut().take() else {
            return Ok(());
        };
        self.load_scene_now(ctx, &name)
    }
    
    /// Read `name.scene` and transition to it immediately
    pub fn load_scene_now(&self, ctx: &EngineContext, name: &str) -> Result<(), EngineError> {
        let path = self.scenes_dir.join(format!("{name}.{SCENE_EXTENSION}"));
        if !path.is_file() {
            return Err(EngineError::MissingScene(name.to_string()));
        }
        let doc: SceneDocument = read_document(&path, "scene")?;
        self.transition_to(ctx, name, &doc)
    }
    
    /// Replace the current scene with one built from `doc`
    ///
    /// Actors flagged `dont_destroy` move into the new scene with ids from
    /// 10000 and are not started again. Requests still queued on the old
    /// scene are discarded with it.
    pub fn transition_to(&self, ctx: &EngineContext, name: &str, doc: &SceneDocument) -> Result<(), EngineError> {
        let preserved: Vec<ActorHandle> = self.current().actors().into_iter().filter(ActorHandle::dont_destroy).collect();
        let scene = Scene::new(name);
        
        let mut fresh = Vec::with_capacity(doc.actors.len());
        for (index, decl) in doc.actors.iter().enumerate() {
            let mut actor = match &decl.template {
                Some(template) => ctx.templates.instantiate(template, &ctx.factory)?,
                None => Actor::default(),
            };
            if let Some(name) = &decl.name {
                actor.set_name(name.clone());
            }
            
            for (key, properties) in &decl.components {
                if let Some(existing) = actor.component(key) {
                    ctx.factory.apply_overrides(existing, properties);
                } else if let Some(type_name) = properties.declared_type() {
                    let component = ctx.factory.create(type_name, key)?;
                    ctx.factory.apply_overrides(&component, properties);
                    actor.insert_component(component);
                } else {
                    log::warn!("Component {} of {} has no type; skipped", key, actor.name());
                }
            }
            
            let handle = ActorHandle::new(actor);
            handle.set_id(ActorId::try_from(index + 1).unwrap_or(ActorId::MAX));
            handle.attach_components();
            scene.insert(handle.clone());
            fresh.push(handle);
        }
        
        for (offset, actor) in (0..).zip(&preserved) {
            actor.set_id(RUNTIME_ID_BASE + offset);
            scene.insert(actor.clone());
        }
        let floor = RUNTIME_ID_BASE + ActorId::try_from(preserved.len()).unwrap_or(0);
        if self.next_runtime_id.get() < floor {
            self.next_runtime_id.set(floor);
        }
        
        *self.current.borrow_mut() = Rc::new(scene);
        log::info!("Loaded scene {} ({} actors, {} preserved)", name, fresh.len(), preserved.len());
        
        for actor in fresh {
            actor.start(ctx);
        }
        Ok(())
    }
    
    /// Run one frame of the current scene
    pub fn update(&self, ctx: &EngineContext) {
        self.current().update_actors(ctx);
    }
    
    /// First actor named `name`: preserved actors, then live ones, then pending spawns
    pub fn find(&self, name: &str) -> Option<ActorHandle> {
        let scene = self.current();
        let live = scene.actors();
        
        live.iter()
            .find(|a| a.dont_destroy() && a.name() == name)
            .or_else(|| {
                live.iter()
                    .find(|a| !a.dont_destroy() && !scene.is_pending_destroy(a.id()) && a.name() == name)
            })
            .cloned()
            .or_else(|| scene.pending_spawns().into_iter().find(|a| a.name() == name))
    }
    
    /// Every actor named `name`: live ones not being destroyed, then pending spawns
    pub fn find_all(&self, name: &str) -> Vec<ActorHandle> {
        let scene = self.current();
        scene
            .actors()
            .into_iter()
            .filter(|a| a.name() == name && !scene.is_pending_destroy(a.id()))
            .chain(scene.pending_spawns().into_iter().filter(|a| a.name() == name))
            .collect()
    }
    
    /// Build an actor from a template and queue it for spawning
    pub fn instantiate(&self, ctx: &EngineContext, template: &str) -> Result<ActorHandle, EngineError> {
        let actor = ActorHandle::new(ctx.templates.instantiate(template, &ctx.factory)?);
        actor.attach_components();
        actor.set_id(self.next_id());
        self.current().queue_spawn(actor.clone());
        log::debug!("Queued {:?} for spawn", actor);
        Ok(actor)
    }
    
    /// Destroy every component of `actor` now and remove it at the end of the frame
    pub fn destroy(&self, ctx: &EngineContext, actor: &ActorHandle) {
        let scene = self.current();
        if actor.is_destroyed() || scene.is_pending_destroy(actor.id()) {
            return;
        }
        if !scene.cancel_spawn(actor) {
            scene.queue_destroy(actor.id());
        }
        actor.destroy_components(ctx);
    }
    
    /// Keep `actor` alive across scene transitions
    pub fn dont_destroy(&self, actor: &ActorHandle) {
        actor.set_dont_destroy(true);
    }
}
