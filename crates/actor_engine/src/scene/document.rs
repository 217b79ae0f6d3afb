//! Declarative scene and template documents

use crate::engine::EngineError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Map;
use std::collections::BTreeMap;
use std::path::Path;

/// Property overrides for one component; may carry a `type`
pub type PropertyMap = Map<String, serde_json::Value>;

/// A `.scene` file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDocument {
    /// Declared actors, in file order
    pub actors: Vec<ActorDecl>,
}

/// One actor entry of a scene file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorDecl {
    /// Overrides the template name when present
    pub name: Option<String>,
    /// Template to clone components from
    pub template: Option<String>,
    /// Inline components keyed by component key
    pub components: BTreeMap<String, PropertyMap>,
}

/// A `.template` file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateDocument {
    /// Name given to instantiated actors
    pub name: String,
    /// Component declarations keyed by component key
    pub components: BTreeMap<String, PropertyMap>,
}

impl PropertyMapExt for PropertyMap {
    fn declared_type(&self) -> Option<&str> {
        self.get("type").and_then(serde_json::Value::as_str)
    }
}

/// Accessors shared by component declarations
pub trait PropertyMapExt {
    /// The `type` entry, if it is a string
    fn declared_type(&self) -> Option<&str>;
}

/// Read and parse a JSON document
///
/// A missing file is reported as a missing resource of `kind`.
pub fn read_document<T: DeserializeOwned>(path: &Path, kind: &'static str) -> Result<T, EngineError> {
    if !path.exists() {
        return Err(EngineError::MissingResource {
            kind,
            name: path.display().to_string(),
        });
    }
    
    let text = std::fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| EngineError::Document {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_scene_document_defaults() {
        let doc: SceneDocument = serde_json::from_str(r#"{ "actors": [ { "template": "Enemy" }, { "name": "Hud" } ] }"#).unwrap();
        assert_eq!(doc.actors.len(), 2);
        assert_eq!(doc.actors[0].template.as_deref(), Some("Enemy"));
        assert!(doc.actors[0].name.is_none());
        assert!(doc.actors[1].components.is_empty());
    }

    #[test]
    fn test_declared_type() {
        let doc: TemplateDocument =
            serde_json::from_str(r#"{ "name": "Enemy", "components": { "1": { "type": "Mover", "speed": 2 }, "2": { "speed": 1 } } }"#)
                .unwrap();
        assert_eq!(doc.components["1"].declared_type(), Some("Mover"));
        assert_eq!(doc.components["2"].declared_type(), None);
    }

    #[test]
    fn test_read_document_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.scene");
        assert!(matches!(
            read_document::<SceneDocument>(&missing, "scene"),
            Err(EngineError::MissingResource { kind: "scene", .. })
        ));

        let broken = dir.path().join("broken.scene");
        std::fs::File::create(&broken).unwrap().write_all(b"{ not json").unwrap();
        assert!(matches!(read_document::<SceneDocument>(&broken, "scene"), Err(EngineError::Document { .. })));
    }
}
