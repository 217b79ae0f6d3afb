//! Component creation, property overrides and cloning

use super::component::{Component, ComponentBody, ComponentRef, NativeComponent, ScriptInstance};
use crate::engine::EngineError;
use crate::physics::Rigidbody;
use crate::script::{ScriptClass, ScriptRegistry, Value};
use serde_json::Map;
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

/// Type given to a scripted clone whose class can no longer be found
pub const FALLBACK_TYPE: &str = "OutputMessage";

/// Constructor for a native component kind
pub type NativeConstructor = fn() -> Box<dyn NativeComponent>;

/// Builds components by type name
pub struct ComponentFactory {
    scripts: ScriptRegistry,
    natives: HashMap<&'static str, NativeConstructor>,
    runtime_counter: Cell<u64>,
}

impl ComponentFactory {
    /// Create a factory over the given script classes with the built-in natives registered
    pub fn new(mut scripts: ScriptRegistry) -> Self {
        if !scripts.contains(FALLBACK_TYPE) {
            scripts.register(output_message_class());
        }
        
        let mut factory = Self {
            scripts,
            natives: HashMap::new(),
            runtime_counter: Cell::new(0),
        };
        factory.register_native(Rigidbody::KIND, || Box::new(Rigidbody::default()));
        factory
    }
    
    /// Register an additional native kind
    pub fn register_native(&mut self, kind: &'static str, constructor: NativeConstructor) {
        self.natives.insert(kind, constructor);
    }
    
    /// Loaded script classes
    pub fn scripts(&self) -> &ScriptRegistry {
        &self.scripts
    }
    
    /// Whether `type_name` can be created
    pub fn knows(&self, type_name: &str) -> bool {
        self.natives.contains_key(type_name) || self.scripts.contains(type_name)
    }
    
    /// Next key for a component added at runtime (`r0`, `r1`, ...)
    pub fn next_runtime_key(&self) -> String {
        let n = self.runtime_counter.get();
        self.runtime_counter.set(n + 1);
        format!("r{n}")
    }
    
    /// Create a component of `type_name` under `key`
    pub fn create(&self, type_name: &str, key: &str) -> Result<ComponentRef, EngineError> {
        let body = if let Some(constructor) = self.natives.get(type_name) {
            ComponentBody::Native(constructor())
        } else if let Some(class) = self.scripts.get(type_name) {
            ComponentBody::Scripted(ScriptInstance::new(class))
        } else {
            return Err(EngineError::MissingComponentType(type_name.to_string()));
        };
        
        Ok(ComponentRef::new(Component::new(key, type_name, body)))
    }
    
    /// Assign declared properties onto a component
    ///
    /// Only strings, integers, floats and booleans are applied; `type` is skipped.
    pub fn apply_overrides(&self, component: &ComponentRef, properties: &Map<String, serde_json::Value>) {
        for (name, value) in properties {
            if name == "type" {
                continue;
            }
            let value = match value {
                serde_json::Value::String(s) => Value::Str(s.clone()),
                serde_json::Value::Bool(b) => Value::Bool(*b),
                serde_json::Value::Number(n) => match n.as_i64() {
                    Some(i) => Value::Int(i),
                    None => match n.as_f64() {
                        Some(f) => Value::Float(f),
                        None => continue,
                    },
                },
                _ => continue,
            };
            component.set(name, value);
        }
    }
    
    /// Copy `original` into a fresh component under `key`
    pub fn clone_component(&self, original: &ComponentRef, key: &str) -> Result<ComponentRef, EngineError> {
        let source = original.borrow();
        
        let copy = match source.body() {
            ComponentBody::Native(native) => {
                let copy = self.create(native.kind(), key)?;
                copy.borrow_mut().set_body(ComponentBody::Native(native.duplicate()));
                copy
            }
            ComponentBody::Scripted(instance) => {
                let class = instance.class();
                let type_name = match self.scripts.get(class.name()) {
                    Some(registered) if Rc::ptr_eq(&registered, class) => class.name(),
                    _ => {
                        log::warn!("No loaded class matches {}; cloning {} as {}", class.name(), source.key(), FALLBACK_TYPE);
                        FALLBACK_TYPE
                    }
                };
                let copy = self.create(type_name, key)?;
                {
                    let mut target = copy.borrow_mut();
                    for (name, value) in instance.own_fields() {
                        if name != "key" && !value.is_function() {
                            target.set(name, value.clone());
                        }
                    }
                }
                copy
            }
        };
        
        {
            let mut target = copy.borrow_mut();
            target.set("enabled", Value::Bool(source.is_enabled()));
            target.set("onStart_called", Value::Bool(source.start_called()));
        }
        Ok(copy)
    }
}

fn output_message_class() -> ScriptClass {
    ScriptClass::new(FALLBACK_TYPE)
        .with_field("message", "")
        .with_method("OnStart", |_, this, _| {
            if let Some(message) = this.get("message").as_str() {
                log::info!("{message}");
            }
            Ok(Value::Nil)
        })
}
