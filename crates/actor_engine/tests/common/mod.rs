//! Shared fixtures for integration tests

#![allow(dead_code)]

use actor_engine::ecs::Template;
use actor_engine::foundation::logging;
use actor_engine::prelude::*;
use actor_engine::scene::{SceneDocument, TemplateDocument};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared call log written by recording classes
#[derive(Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.borrow().iter().filter(|e| e.as_str() == entry).count()
    }
}

fn record(log: &CallLog, hook: &'static str) -> impl Fn(&EngineContext, &ComponentRef, &[Value]) -> ScriptResult {
    let log = log.clone();
    move |_ctx, this, _args| {
        log.push(format!("{}:{}", hook, this.key()));
        Ok(Value::Nil)
    }
}

/// A class logging `Hook:key` for each lifecycle hook
pub fn logger_class(name: &str, log: &CallLog) -> ScriptClass {
    ScriptClass::new(name)
        .with_method("OnStart", record(log, "OnStart"))
        .with_method("OnUpdate", record(log, "OnUpdate"))
        .with_method("OnLateUpdate", record(log, "OnLateUpdate"))
        .with_method("OnDestroy", record(log, "OnDestroy"))
}

/// A class logging contact callbacks as `Hook:owner->other`
pub fn contact_class(log: &CallLog) -> ScriptClass {
    let mut class = ScriptClass::new("ContactLogger");
    for hook in ["OnCollisionEnter", "OnCollisionExit", "OnTriggerEnter", "OnTriggerExit"] {
        let log = log.clone();
        class = class.with_method(hook, move |_ctx, this, args| {
            let owner = this.actor().map(|a| a.name()).unwrap_or_default();
            let collision = args
                .first()
                .and_then(Value::as_collision)
                .ok_or_else(|| ScriptError::runtime("missing collision argument"))?;
            let other = collision.other.as_ref().map(ActorHandle::name).unwrap_or_default();
            log.push(format!("{hook}:{owner}->{other}"));
            Ok(Value::Nil)
        });
    }
    class
}

/// Context with no scene directory contents
pub fn context(scripts: ScriptRegistry) -> EngineContext {
    logging::init_for_tests();
    EngineContext::new(scripts, "scenes")
}

/// Parse a scene from JSON and make it current
pub fn load_scene(ctx: &EngineContext, name: &str, json: &str) {
    let doc: SceneDocument = serde_json::from_str(json).expect("scene json");
    ctx.scenes.transition_to(ctx, name, &doc).expect("scene transition");
}

/// Register a template parsed from JSON
pub fn add_template(ctx: &mut EngineContext, name: &str, json: &str) {
    let doc: TemplateDocument = serde_json::from_str(json).expect("template json");
    let template = Template::from_document(&doc, &ctx.factory).expect("template");
    ctx.templates.insert(name, template);
}

/// Run the scene lifecycle, physics and subscription phases of one frame
pub fn frame(ctx: &EngineContext) {
    ctx.scenes.update(ctx);
    ctx.physics.step(ctx, ctx.clock.fixed_step());
    ctx.events.process_events();
}
