//! Script class objects and the registry of loaded classes

use super::value::{ScriptFn, ScriptResult, Value};
use crate::ecs::ComponentRef;
use crate::engine::EngineContext;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// A loaded component class: default fields plus functions
///
/// Instances never copy the class; they hold a shared link to it and fall
/// back to it for any name missing from their own table.
#[derive(Debug, Clone)]
pub struct ScriptClass {
    name: String,
    members: BTreeMap<String, Value>,
}

impl ScriptClass {
    /// Create an empty class
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: BTreeMap::new(),
        }
    }
    
    /// Add a default field (builder pattern)
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.members.insert(name.into(), value.into());
        self
    }
    
    /// Add a function (builder pattern)
    pub fn with_method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&EngineContext, &ComponentRef, &[Value]) -> ScriptResult + 'static,
    {
        self.members.insert(name.into(), Value::Function(ScriptFn::new(f)));
        self
    }
    
    /// Registered type name
    pub fn name(&self) -> &str {
        &self.name
    }
    
    /// Look up a member
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.members.get(name)
    }
    
    /// Iterate members in name order
    pub fn members(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.members.iter()
    }
}

/// Table of loaded script classes keyed by type name
#[derive(Debug, Default)]
pub struct ScriptRegistry {
    classes: HashMap<String, Rc<ScriptClass>>,
}

impl ScriptRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Register a class, replacing any previous class with the same name
    pub fn register(&mut self, class: ScriptClass) -> Rc<ScriptClass> {
        let class = Rc::new(class);
        log::debug!("Registered script class {}", class.name());
        self.classes.insert(class.name().to_string(), Rc::clone(&class));
        class
    }
    
    /// Builder-style registration
    pub fn with(mut self, class: ScriptClass) -> Self {
        self.register(class);
        self
    }
    
    /// Find a class by type name
    pub fn get(&self, name: &str) -> Option<Rc<ScriptClass>> {
        self.classes.get(name).cloned()
    }
    
    /// Whether a class is registered
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }
    
    /// Number of registered classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }
    
    /// Whether no class is registered
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_replaces_existing() {
        let mut registry = ScriptRegistry::new();
        registry.register(ScriptClass::new("Mover").with_field("speed", 1));
        registry.register(ScriptClass::new("Mover").with_field("speed", 5));

        assert_eq!(registry.len(), 1);
        let class = registry.get("Mover").unwrap();
        assert_eq!(class.get("speed").and_then(Value::as_int), Some(5));
    }

    #[test]
    fn test_methods_are_function_members() {
        let class = ScriptClass::new("Logger").with_method("OnUpdate", |_, _, _| Ok(Value::Nil));
        assert!(class.get("OnUpdate").is_some_and(Value::is_function));
        assert!(class.get("OnStart").is_none());
    }
}
