//! Actor templates loaded from `actor_templates/`

use super::actor::Actor;
use super::component::ComponentRef;
use super::factory::ComponentFactory;
use crate::engine::EngineError;
use crate::scene::document::{read_document, PropertyMapExt, TemplateDocument};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Read-only actor prototype; its components are clone sources only
#[derive(Debug, Clone, Default)]
pub struct Template {
    /// Name given to instantiated actors
    pub name: String,
    /// Prototype components keyed by component key
    pub components: BTreeMap<String, ComponentRef>,
}

impl Template {
    /// Build a template from its document
    ///
    /// Declarations without a `type` are ignored.
    pub fn from_document(doc: &TemplateDocument, factory: &ComponentFactory) -> Result<Self, EngineError> {
        let mut components = BTreeMap::new();
        for (key, properties) in &doc.components {
            let Some(type_name) = properties.declared_type() else {
                log::debug!("Template {} component {} has no type; skipped", doc.name, key);
                continue;
            };
            let component = factory.create(type_name, key)?;
            factory.apply_overrides(&component, properties);
            components.insert(key.clone(), component);
        }
        
        Ok(Self {
            name: doc.name.clone(),
            components,
        })
    }
}

/// Templates keyed by file stem
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Template>,
}

impl TemplateRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Load every template file in `dir`
    ///
    /// A missing directory yields an empty registry.
    pub fn load_all(dir: impl AsRef<Path>, factory: &ComponentFactory) -> Result<Self, EngineError> {
        let dir = dir.as_ref();
        let mut registry = Self::new();
        if !dir.is_dir() {
            log::debug!("No template directory at {}", dir.display());
            return Ok(registry);
        }
        
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        paths.sort();
        
        for path in paths {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            let doc: TemplateDocument = read_document(&path, "template")?;
            registry.insert(stem, Template::from_document(&doc, factory)?);
        }
        
        log::info!("Loaded {} actor templates from {}", registry.len(), dir.display());
        Ok(registry)
    }
    
    /// Register a template under `name`
    pub fn insert(&mut self, name: impl Into<String>, template: Template) {
        self.templates.insert(name.into(), template);
    }
    
    /// Find a template
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }
    
    /// Number of loaded templates
    pub fn len(&self) -> usize {
        self.templates.len()
    }
    
    /// Whether no template is loaded
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
    
    /// Build a detached actor from a template by cloning every component
    pub fn instantiate(&self, name: &str, factory: &ComponentFactory) -> Result<Actor, EngineError> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| EngineError::MissingTemplate(name.to_string()))?;
        
        let mut actor = Actor::new(template.name.clone());
        for (key, prototype) in &template.components {
            actor.insert_component(factory.clone_component(prototype, key)?);
        }
        Ok(actor)
    }
}
