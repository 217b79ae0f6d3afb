//! Component storage and the uniform hook interface

use super::actor::{ActorHandle, WeakActor};
use crate::engine::EngineContext;
use crate::script::{ScriptClass, ScriptError, Value};
use std::any::Any;
use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Lifecycle and contact hooks a component may implement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    /// First activation
    Start,
    /// Per-frame update
    Update,
    /// Per-frame update after every `Update`
    LateUpdate,
    /// Removal or actor destruction
    Destroy,
    /// Two solid fixtures began touching
    CollisionEnter,
    /// Two solid fixtures stopped touching
    CollisionExit,
    /// Two sensor fixtures began overlapping
    TriggerEnter,
    /// Two sensor fixtures stopped overlapping
    TriggerExit,
}

impl Hook {
    /// Name of the scripted function implementing this hook
    pub fn method_name(self) -> &'static str {
        match self {
            Self::Start => "OnStart",
            Self::Update => "OnUpdate",
            Self::LateUpdate => "OnLateUpdate",
            Self::Destroy => "OnDestroy",
            Self::CollisionEnter => "OnCollisionEnter",
            Self::CollisionExit => "OnCollisionExit",
            Self::TriggerEnter => "OnTriggerEnter",
            Self::TriggerExit => "OnTriggerExit",
        }
    }
}

/// A built-in component with a fixed field layout
///
/// Natives are reached through the same get/set-by-name surface as scripted
/// components, so their fields can be overridden from scene documents.
pub trait NativeComponent: Any {
    /// Registered type name
    fn kind(&self) -> &'static str;
    
    /// Every declared field, in declaration order
    fn field_names(&self) -> &'static [&'static str];
    
    /// Read a declared field
    fn get_field(&self, name: &str) -> Option<Value>;
    
    /// Write a declared field; returns false for unknown names or mismatched kinds
    fn set_field(&mut self, name: &str, value: &Value) -> bool;
    
    /// Fresh instance carrying a copy of every declared field
    fn duplicate(&self) -> Box<dyn NativeComponent>;
    
    /// Called once before the first update
    fn on_start(&mut self, _ctx: &EngineContext, _owner: Option<&ActorHandle>) -> Result<(), ScriptError> {
        Ok(())
    }
    
    /// Called every frame
    fn on_update(&mut self, _ctx: &EngineContext) -> Result<(), ScriptError> {
        Ok(())
    }
    
    /// Called every frame after all updates
    fn on_late_update(&mut self, _ctx: &EngineContext) -> Result<(), ScriptError> {
        Ok(())
    }
    
    /// Called on removal
    fn on_destroy(&mut self, _ctx: &EngineContext) -> Result<(), ScriptError> {
        Ok(())
    }
    
    /// Downcast support
    fn as_any(&self) -> &dyn Any;
    
    /// Mutable downcast support
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A scripted component: own fields plus a link to its class
#[derive(Debug, Clone)]
pub struct ScriptInstance {
    class: Rc<ScriptClass>,
    fields: BTreeMap<String, Value>,
}

impl ScriptInstance {
    /// Create an empty instance linked to `class`
    pub fn new(class: Rc<ScriptClass>) -> Self {
        Self {
            class,
            fields: BTreeMap::new(),
        }
    }
    
    /// The class this instance was created from
    pub fn class(&self) -> &Rc<ScriptClass> {
        &self.class
    }
    
    /// Look up a name on the instance, then on the class
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).or_else(|| self.class.get(name))
    }
    
    /// Assign a field on the instance table
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }
    
    /// The instance's own fields, excluding inherited class members
    pub fn own_fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }
}

/// Native or scripted payload
pub enum ComponentBody {
    /// Built-in component
    Native(Box<dyn NativeComponent>),
    /// Scripted component
    Scripted(ScriptInstance),
}

impl fmt::Debug for ComponentBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(native) => write!(f, "Native({})", native.kind()),
            Self::Scripted(instance) => write!(f, "Scripted({})", instance.class().name()),
        }
    }
}

/// A component with its mandatory metadata
#[derive(Debug)]
pub struct Component {
    key: String,
    type_name: String,
    enabled: bool,
    start_called: bool,
    actor: Option<WeakActor>,
    body: ComponentBody,
}

impl Component {
    /// Wrap a body with default metadata (`enabled`, not started, no actor)
    pub fn new(key: impl Into<String>, type_name: impl Into<String>, body: ComponentBody) -> Self {
        Self {
            key: key.into(),
            type_name: type_name.into(),
            enabled: true,
            start_called: false,
            actor: None,
            body,
        }
    }
    
    /// Key within the owning actor
    pub fn key(&self) -> &str {
        &self.key
    }
    
    /// Type name used for factory lookup and queries
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
    
    /// Whether lifecycle calls are dispatched
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
    
    /// Whether `OnStart` has already run
    pub fn start_called(&self) -> bool {
        self.start_called
    }
    
    /// Owning actor, if attached and still alive
    pub fn actor(&self) -> Option<ActorHandle> {
        self.actor.as_ref().and_then(WeakActor::upgrade)
    }
    
    /// Payload
    pub fn body(&self) -> &ComponentBody {
        &self.body
    }
    
    /// Mutable payload
    pub fn body_mut(&mut self) -> &mut ComponentBody {
        &mut self.body
    }
    
    /// Replace the payload
    pub(crate) fn set_body(&mut self, body: ComponentBody) {
        self.body = body;
    }
    
    /// Whether the payload is native
    pub fn is_native(&self) -> bool {
        matches!(self.body, ComponentBody::Native(_))
    }
    
    /// Downcast a native payload
    pub fn native<T: NativeComponent>(&self) -> Option<&T> {
        match &self.body {
            ComponentBody::Native(native) => native.as_any().downcast_ref::<T>(),
            ComponentBody::Scripted(_) => None,
        }
    }
    
    /// Mutable downcast of a native payload
    pub fn native_mut<T: NativeComponent>(&mut self) -> Option<&mut T> {
        match &mut self.body {
            ComponentBody::Native(native) => native.as_any_mut().downcast_mut::<T>(),
            ComponentBody::Scripted(_) => None,
        }
    }
    
    /// Read a field by name; metadata names shadow payload fields
    pub fn get(&self, name: &str) -> Value {
        match name {
            "key" => Value::Str(self.key.clone()),
            "type" => Value::Str(self.type_name.clone()),
            "enabled" => Value::Bool(self.enabled),
            "onStart_called" => Value::Bool(self.start_called),
            "actor" => self.actor().map_or(Value::Nil, Value::Actor),
            _ => match &self.body {
                ComponentBody::Native(native) => native.get_field(name).unwrap_or_default(),
                ComponentBody::Scripted(instance) => instance.get(name).cloned().unwrap_or_default(),
            },
        }
    }
    
    /// Write a field by name; metadata names route to metadata
    pub fn set(&mut self, name: &str, value: Value) {
        match (name, &value) {
            ("key", Value::Str(key)) => self.key.clone_from(key),
            ("type", Value::Str(type_name)) => self.type_name.clone_from(type_name),
            ("enabled", Value::Bool(enabled)) => self.enabled = *enabled,
            ("onStart_called", Value::Bool(called)) => self.start_called = *called,
            ("key" | "type" | "enabled" | "onStart_called" | "actor", _) => {
                log::warn!("Ignoring assignment of {:?} to metadata field {} on {}", value, name, self.key);
            }
            _ => match &mut self.body {
                ComponentBody::Native(native) => {
                    if !native.set_field(name, &value) {
                        log::debug!("{} has no field {} accepting {:?}", native.kind(), name, value);
                    }
                }
                ComponentBody::Scripted(instance) => instance.set(name, value),
            },
        }
    }
}

/// Shared handle to a component
///
/// Held by the owning actor's map and by any script that grabbed it. Borrows
/// taken through this handle must not be held across calls back into the
/// engine.
#[derive(Clone)]
pub struct ComponentRef(Rc<RefCell<Component>>);

impl ComponentRef {
    /// Share a component
    pub fn new(component: Component) -> Self {
        Self(Rc::new(RefCell::new(component)))
    }
    
    /// Immutable borrow
    pub fn borrow(&self) -> Ref<'_, Component> {
        self.0.borrow()
    }
    
    /// Mutable borrow
    pub fn borrow_mut(&self) -> RefMut<'_, Component> {
        self.0.borrow_mut()
    }
    
    /// Identity comparison
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
    
    /// Component key
    pub fn key(&self) -> String {
        self.borrow().key.clone()
    }
    
    /// Component type name
    pub fn type_name(&self) -> String {
        self.borrow().type_name.clone()
    }
    
    /// Whether lifecycle calls are dispatched
    pub fn is_enabled(&self) -> bool {
        self.borrow().enabled
    }
    
    /// Enable or disable lifecycle dispatch
    pub fn set_enabled(&self, enabled: bool) {
        self.borrow_mut().enabled = enabled;
    }
    
    /// Whether `OnStart` has already run
    pub fn start_called(&self) -> bool {
        self.borrow().start_called
    }
    
    /// Owning actor
    pub fn actor(&self) -> Option<ActorHandle> {
        self.borrow().actor()
    }
    
    /// Attach the actor back-reference
    pub fn set_actor(&self, actor: &ActorHandle) {
        self.borrow_mut().actor = Some(actor.downgrade());
    }
    
    /// Read a field by name
    pub fn get(&self, name: &str) -> Value {
        self.borrow().get(name)
    }
    
    /// Write a field by name
    pub fn set(&self, name: &str, value: impl Into<Value>) {
        self.borrow_mut().set(name, value.into());
    }
    
    /// Invoke a hook, whichever kind of component this is
    ///
    /// Scripted components without the corresponding function are a no-op.
    /// No borrow of the component is held while a scripted function runs.
    pub fn invoke_hook(&self, ctx: &EngineContext, hook: Hook, args: &[Value]) -> Result<(), ScriptError> {
        let scripted = {
            let component = self.borrow();
            match &component.body {
                ComponentBody::Scripted(instance) => Some(instance.get(hook.method_name()).and_then(|v| v.as_function().cloned())),
                ComponentBody::Native(_) => None,
            }
        };
        
        match scripted {
            Some(Some(function)) => function.call(ctx, self, args).map(|_| ()),
            Some(None) => Ok(()),
            None => {
                let owner = self.actor();
                let mut component = self.borrow_mut();
                let ComponentBody::Native(native) = &mut component.body else {
                    return Ok(());
                };
                match hook {
                    Hook::Start => native.on_start(ctx, owner.as_ref()),
                    Hook::Update => native.on_update(ctx),
                    Hook::LateUpdate => native.on_late_update(ctx),
                    Hook::Destroy => native.on_destroy(ctx),
                    Hook::CollisionEnter | Hook::CollisionExit | Hook::TriggerEnter | Hook::TriggerExit => Ok(()),
                }
            }
        }
    }
    
    /// Call a named scripted function on this component
    pub fn call_method(&self, ctx: &EngineContext, name: &str, args: &[Value]) -> Result<Value, ScriptError> {
        match self.get(name) {
            Value::Function(function) => function.call(ctx, self, args),
            _ => Err(ScriptError::runtime(format!("attempt to call a non-function value '{name}'"))),
        }
    }
}

impl fmt::Debug for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(component) => write!(f, "ComponentRef({}: {})", component.key, component.type_name),
            Err(_) => write!(f, "ComponentRef(<borrowed>)"),
        }
    }
}
