//! The live actor set and its per-frame cycle

use crate::ecs::{ActorHandle, ActorId};
use crate::engine::EngineContext;
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Live actors plus the spawn/destroy requests waiting for the frame boundary
#[derive(Debug, Default)]
pub struct Scene {
    name: String,
    actors: RefCell<BTreeMap<ActorId, ActorHandle>>,
    pending_spawn: RefCell<Vec<ActorHandle>>,
    pending_destroy: RefCell<Vec<ActorId>>,
}

impl Scene {
    /// Create an empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
    
    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }
    
    /// Add an actor to the live set directly (scene construction)
    pub fn insert(&self, actor: ActorHandle) {
        let id = actor.id();
        self.actors.borrow_mut().insert(id, actor);
    }
    
    /// Live actors in id order
    pub fn actors(&self) -> Vec<ActorHandle> {
        self.actors.borrow().values().cloned().collect()
    }
    
    /// Live actor by id
    pub fn get(&self, id: ActorId) -> Option<ActorHandle> {
        self.actors.borrow().get(&id).cloned()
    }
    
    /// Number of live actors
    pub fn len(&self) -> usize {
        self.actors.borrow().len()
    }
    
    /// Whether the live set is empty
    pub fn is_empty(&self) -> bool {
        self.actors.borrow().is_empty()
    }
    
    /// Actors waiting to be spawned, in request order
    pub fn pending_spawns(&self) -> Vec<ActorHandle> {
        self.pending_spawn.borrow().clone()
    }
    
    /// Queue an actor to join the live set at the next frame
    pub fn queue_spawn(&self, actor: ActorHandle) {
        self.pending_spawn.borrow_mut().push(actor);
    }
    
    /// Withdraw a queued spawn; returns false if the actor was not queued
    pub fn cancel_spawn(&self, actor: &ActorHandle) -> bool {
        let mut pending = self.pending_spawn.borrow_mut();
        let before = pending.len();
        pending.retain(|queued| !queued.ptr_eq(actor));
        pending.len() != before
    }
    
    /// Queue an id for removal; returns false if it was already queued
    pub fn queue_destroy(&self, id: ActorId) -> bool {
        let mut pending = self.pending_destroy.borrow_mut();
        if pending.contains(&id) {
            return false;
        }
        pending.push(id);
        true
    }
    
    /// Whether an id is queued for removal
    pub fn is_pending_destroy(&self, id: ActorId) -> bool {
        self.pending_destroy.borrow().contains(&id)
    }
    
    /// Run one frame of the actor lifecycle
    ///
    /// Every phase iterates a fresh snapshot of the live set, so requests made
    /// by hooks only take effect at the phase that applies them.
    pub fn update_actors(&self, ctx: &EngineContext) {
        self.apply_spawns(ctx);
        
        for actor in self.actors() {
            actor.process_added_components(ctx);
        }
        for actor in self.actors() {
            actor.update(ctx);
        }
        for actor in self.actors() {
            actor.late_update(ctx);
        }
        for actor in self.actors() {
            actor.process_removed_components(ctx);
        }
        
        self.apply_destroys();
    }
    
    fn apply_spawns(&self, ctx: &EngineContext) {
        let spawns = std::mem::take(&mut *self.pending_spawn.borrow_mut());
        for actor in spawns {
            log::debug!("Spawning {:?}", actor);
            self.insert(actor.clone());
            actor.start(ctx);
        }
    }
    
    fn apply_destroys(&self) {
        let ids = std::mem::take(&mut *self.pending_destroy.borrow_mut());
        let mut actors = self.actors.borrow_mut();
        for id in ids {
            match actors.get(&id) {
                Some(actor) if actor.dont_destroy() => log::debug!("{:?} is preserved; not destroyed", actor),
                Some(_) => {
                    actors.remove(&id);
                    log::debug!("Destroyed actor #{}", id);
                }
                None => {}
            }
        }
    }
}
