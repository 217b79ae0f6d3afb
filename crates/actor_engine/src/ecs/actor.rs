//! Actors and their component lifecycle

use super::component::{ComponentRef, Hook};
use crate::engine::{EngineContext, EngineError};
use crate::physics::Collision;
use crate::script::Value;
use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

/// Actor identifier; ids below 10000 come from scene files
pub type ActorId = u32;

/// First id handed to runtime-spawned and preserved actors
pub const RUNTIME_ID_BASE: ActorId = 10_000;

/// A named container of components
///
/// `components` is keyed and iterated by component key. Additions and removals
/// requested during a frame wait in `pending_add`/`pending_remove` until the
/// scene applies them.
#[derive(Debug, Default)]
pub struct Actor {
    name: String,
    id: ActorId,
    dont_destroy: bool,
    destroyed: bool,
    components: BTreeMap<String, ComponentRef>,
    pending_add: BTreeMap<String, ComponentRef>,
    pending_remove: Vec<String>,
}

impl Actor {
    /// Create an empty actor
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
    
    /// Actor name
    pub fn name(&self) -> &str {
        &self.name
    }
    
    /// Rename the actor
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
    
    /// Actor id
    pub fn id(&self) -> ActorId {
        self.id
    }
    
    /// Whether the actor survives scene transitions
    pub fn dont_destroy(&self) -> bool {
        self.dont_destroy
    }
    
    /// Insert a component directly into the live map (construction only)
    pub fn insert_component(&mut self, component: ComponentRef) {
        let key = component.key();
        self.components.insert(key, component);
    }
    
    /// Live components in key order
    pub fn components(&self) -> impl Iterator<Item = (&String, &ComponentRef)> {
        self.components.iter()
    }
    
    /// Look up a live component by key, ignoring removal state
    pub fn component(&self, key: &str) -> Option<&ComponentRef> {
        self.components.get(key)
    }
    
    /// Number of live components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }
    
    fn is_pending_removal(&self, key: &str) -> bool {
        self.pending_remove.iter().any(|k| k == key)
    }
    
    fn visible(&self) -> impl Iterator<Item = &ComponentRef> {
        self.components
            .iter()
            .filter(|(key, _)| !self.is_pending_removal(key))
            .map(|(_, component)| component)
    }
}

/// Shared handle to an actor
#[derive(Clone)]
pub struct ActorHandle(Rc<RefCell<Actor>>);

/// Non-owning actor reference held by components and physics fixtures
#[derive(Clone, Debug)]
pub struct WeakActor(Weak<RefCell<Actor>>);

impl WeakActor {
    /// Recover the actor if it is still alive
    pub fn upgrade(&self) -> Option<ActorHandle> {
        self.0.upgrade().map(ActorHandle)
    }
}

impl ActorHandle {
    /// Share an actor
    pub fn new(actor: Actor) -> Self {
        Self(Rc::new(RefCell::new(actor)))
    }
    
    /// Immutable borrow
    pub fn borrow(&self) -> Ref<'_, Actor> {
        self.0.borrow()
    }
    
    fn borrow_mut(&self) -> RefMut<'_, Actor> {
        self.0.borrow_mut()
    }
    
    /// Non-owning reference
    pub fn downgrade(&self) -> WeakActor {
        WeakActor(Rc::downgrade(&self.0))
    }
    
    /// Identity comparison
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
    
    /// Actor name
    pub fn name(&self) -> String {
        self.borrow().name.clone()
    }
    
    /// Rename the actor
    pub fn set_name(&self, name: impl Into<String>) {
        self.borrow_mut().name = name.into();
    }
    
    /// Actor id
    pub fn id(&self) -> ActorId {
        self.borrow().id
    }
    
    pub(crate) fn set_id(&self, id: ActorId) {
        self.borrow_mut().id = id;
    }
    
    /// Whether the actor survives scene transitions
    pub fn dont_destroy(&self) -> bool {
        self.borrow().dont_destroy
    }
    
    /// Set or clear scene-transition preservation
    pub fn set_dont_destroy(&self, preserve: bool) {
        self.borrow_mut().dont_destroy = preserve;
    }
    
    /// Whether `OnDestroy` has already been dispatched to this actor
    pub fn is_destroyed(&self) -> bool {
        self.borrow().destroyed
    }
    
    /// Point every component (live and pending) back at this actor
    pub fn attach_components(&self) {
        let actor = self.borrow();
        for component in actor.components.values().chain(actor.pending_add.values()) {
            component.set_actor(self);
        }
    }
    
    /// Snapshot of the live components in key order
    pub fn components(&self) -> Vec<ComponentRef> {
        self.borrow().components.values().cloned().collect()
    }
    
    /// First visible component of `type_name` in key order
    pub fn get_component(&self, type_name: &str) -> Option<ComponentRef> {
        self.borrow()
            .visible()
            .find(|component| component.type_name() == type_name)
            .cloned()
    }
    
    /// Every visible component of `type_name` in key order
    pub fn get_components(&self, type_name: &str) -> Vec<ComponentRef> {
        self.borrow()
            .visible()
            .filter(|component| component.type_name() == type_name)
            .cloned()
            .collect()
    }
    
    /// Visible component with the given key
    pub fn get_component_by_key(&self, key: &str) -> Option<ComponentRef> {
        let actor = self.borrow();
        if actor.is_pending_removal(key) {
            return None;
        }
        actor.components.get(key).cloned()
    }
    
    /// Create a component of `type_name` with a fresh runtime key
    ///
    /// The component is staged and becomes visible once the scene applies
    /// pending additions.
    pub fn add_component(&self, ctx: &EngineContext, type_name: &str) -> Result<ComponentRef, EngineError> {
        let key = ctx.factory.next_runtime_key();
        let component = ctx.factory.create(type_name, &key)?;
        component.set_actor(self);
        self.borrow_mut().pending_add.insert(key, component.clone());
        log::trace!("{} staged component {} ({})", self.name(), component.key(), type_name);
        Ok(component)
    }
    
    /// Disable a component now and stage its removal
    ///
    /// Removing a component that is still only staged for addition cancels the
    /// addition outright.
    pub fn remove_component(&self, component: &ComponentRef) {
        let key = component.key();
        let mut actor = self.borrow_mut();
        if actor.destroyed {
            return;
        }
        
        if actor.pending_add.get(&key).is_some_and(|staged| staged.ptr_eq(component)) {
            actor.pending_add.remove(&key);
            component.set_enabled(false);
            return;
        }
        if !actor.components.get(&key).is_some_and(|live| live.ptr_eq(component)) {
            log::debug!("{} does not own component {}", actor.name, key);
            return;
        }
        component.set_enabled(false);
        if !actor.is_pending_removal(&key) {
            actor.pending_remove.push(key);
        }
    }
    
    /// Run `hook` over the live components in key order
    ///
    /// Disabled components are skipped except for `Destroy`. `Start` runs at
    /// most once per component. Hook errors are reported to the context and
    /// never stop the fan-out.
    pub fn dispatch(&self, ctx: &EngineContext, hook: Hook) {
        let components = self.components();
        self.dispatch_to(ctx, hook, &components);
    }
    
    fn dispatch_to(&self, ctx: &EngineContext, hook: Hook, components: &[ComponentRef]) {
        for component in components {
            if hook != Hook::Destroy && !component.is_enabled() {
                continue;
            }
            if hook == Hook::Start {
                let mut state = component.borrow_mut();
                if state.start_called() {
                    continue;
                }
                state.set("onStart_called", Value::Bool(true));
            }
            if let Err(err) = component.invoke_hook(ctx, hook, &[]) {
                ctx.report_hook_error(&self.name(), err);
            }
        }
    }
    
    /// `Start` fan-out
    pub fn start(&self, ctx: &EngineContext) {
        self.dispatch(ctx, Hook::Start);
    }
    
    /// `Update` fan-out
    pub fn update(&self, ctx: &EngineContext) {
        self.dispatch(ctx, Hook::Update);
    }
    
    /// `LateUpdate` fan-out
    pub fn late_update(&self, ctx: &EngineContext) {
        self.dispatch(ctx, Hook::LateUpdate);
    }
    
    /// Move staged components into the live map and start them
    pub fn process_added_components(&self, ctx: &EngineContext) {
        let added: Vec<ComponentRef> = {
            let mut actor = self.borrow_mut();
            let staged = std::mem::take(&mut actor.pending_add);
            for (key, component) in &staged {
                actor.components.insert(key.clone(), component.clone());
            }
            staged.into_values().collect()
        };
        if !added.is_empty() {
            self.dispatch_to(ctx, Hook::Start, &added);
        }
    }
    
    /// Destroy and erase components staged for removal, in request order
    pub fn process_removed_components(&self, ctx: &EngineContext) {
        let keys = std::mem::take(&mut self.borrow_mut().pending_remove);
        for key in keys {
            let Some(component) = self.borrow().components.get(&key).cloned() else {
                continue;
            };
            self.dispatch_to(ctx, Hook::Destroy, std::slice::from_ref(&component));
            
            let mut actor = self.borrow_mut();
            if actor.components.get(&key).is_some_and(|live| live.ptr_eq(&component)) {
                actor.components.remove(&key);
            }
        }
    }
    
    /// Destroy every live component and disable it; staged changes are dropped
    ///
    /// Runs at most once per actor.
    pub(crate) fn destroy_components(&self, ctx: &EngineContext) {
        let already_destroyed = std::mem::replace(&mut self.borrow_mut().destroyed, true);
        if already_destroyed {
            return;
        }
        self.dispatch(ctx, Hook::Destroy);
        let mut actor = self.borrow_mut();
        for component in actor.components.values() {
            component.set_enabled(false);
        }
        actor.pending_add.clear();
        actor.pending_remove.clear();
    }
    
    /// Deliver a contact callback to every enabled component
    pub fn dispatch_contact(&self, ctx: &EngineContext, hook: Hook, collision: &Collision) {
        let args = [Value::Collision(collision.clone())];
        for component in self.components() {
            if !component.is_enabled() {
                continue;
            }
            if let Err(err) = component.invoke_hook(ctx, hook, &args) {
                ctx.report_hook_error(&self.name(), err);
            }
        }
    }
}

impl fmt::Debug for ActorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(actor) => write!(f, "Actor({} #{})", actor.name, actor.id),
            Err(_) => write!(f, "Actor(<borrowed>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::{Component, ComponentBody, ScriptInstance};
    use crate::script::ScriptClass;

    fn component(key: &str, type_name: &str) -> ComponentRef {
        let class = Rc::new(ScriptClass::new(type_name));
        ComponentRef::new(Component::new(key, type_name, ComponentBody::Scripted(ScriptInstance::new(class))))
    }

    fn actor_with(keys: &[(&str, &str)]) -> ActorHandle {
        let mut actor = Actor::new("Player");
        for (key, type_name) in keys {
            actor.insert_component(component(key, type_name));
        }
        let handle = ActorHandle::new(actor);
        handle.attach_components();
        handle
    }

    #[test]
    fn test_queries_use_key_order() {
        let actor = actor_with(&[("c", "Mover"), ("a", "Mover"), ("b", "Health")]);
        assert_eq!(actor.get_component("Mover").map(|c| c.key()), Some("a".to_string()));
        let keys: Vec<String> = actor.get_components("Mover").iter().map(ComponentRef::key).collect();
        assert_eq!(keys, vec!["a", "c"]);
        assert!(actor.get_component("Missing").is_none());
    }

    #[test]
    fn test_removed_component_hidden_immediately() {
        let actor = actor_with(&[("a", "Mover"), ("b", "Mover")]);
        let first = actor.get_component_by_key("a").unwrap();
        actor.remove_component(&first);

        assert!(!first.is_enabled());
        assert!(actor.get_component_by_key("a").is_none());
        assert_eq!(actor.get_component("Mover").map(|c| c.key()), Some("b".to_string()));
        // Still physically present until the removal phase runs
        assert_eq!(actor.borrow().component_count(), 2);
    }

    #[test]
    fn test_back_reference() {
        let actor = actor_with(&[("a", "Mover")]);
        let component = actor.get_component_by_key("a").unwrap();
        assert!(component.actor().is_some_and(|owner| owner.ptr_eq(&actor)));
    }

    #[test]
    fn test_remove_twice_queues_once() {
        let actor = actor_with(&[("a", "Mover")]);
        let component = actor.get_component_by_key("a").unwrap();
        actor.remove_component(&component);
        actor.remove_component(&component);
        assert_eq!(actor.borrow().pending_remove.len(), 1);
    }

    #[test]
    fn test_remove_ignores_component_owned_elsewhere() {
        let actor = actor_with(&[("1", "Mover")]);
        let other = actor_with(&[("1", "Mover")]);
        let foreign = other.get_component_by_key("1").unwrap();
        actor.remove_component(&foreign);

        assert!(foreign.is_enabled());
        assert!(actor.get_component_by_key("1").is_some());
        assert!(actor.borrow().pending_remove.is_empty());
    }
}
