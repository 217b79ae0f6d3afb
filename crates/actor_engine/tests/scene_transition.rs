//! Scene loading from disk and actor preservation across transitions

mod common;

use actor_engine::foundation::logging;
use actor_engine::prelude::*;
use actor_engine::TEMPLATES_DIR;
use common::{frame, logger_class, CallLog};
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

fn world(log: &CallLog) -> (TempDir, EngineContext) {
    logging::init_for_tests();
    let dir = TempDir::new().unwrap();
    let templates = dir.path().join(TEMPLATES_DIR);
    std::fs::create_dir(&templates).unwrap();

    write(
        &templates,
        "Hero.template",
        r#"{ "name": "Hero", "components": { "1": { "type": "Logger" }, "2": { "type": "Stats", "hp": 10 } } }"#,
    );
    write(
        dir.path(),
        "town.scene",
        r#"{ "actors": [
            { "template": "Hero", "name": "Player", "components": { "2": { "hp": 25 } } },
            { "name": "Guard", "components": { "1": { "type": "Logger" } } }
        ] }"#,
    );
    write(
        dir.path(),
        "forest.scene",
        r#"{ "actors": [ { "name": "Wolf", "components": { "1": { "type": "Logger" } } } ] }"#,
    );

    let scripts = ScriptRegistry::new()
        .with(logger_class("Logger", log))
        .with(ScriptClass::new("Stats").with_field("hp", 1));
    let mut ctx = EngineContext::new(scripts, dir.path());
    ctx.load_templates(&templates).unwrap();
    (dir, ctx)
}

#[test]
fn test_scene_loads_templates_and_overrides() {
    let log = CallLog::default();
    let (_dir, ctx) = world(&log);
    ctx.scenes.load_scene_now(&ctx, "town").unwrap();

    assert_eq!(ctx.scenes.current_name(), "town");
    let player = ctx.scenes.find("Player").unwrap();
    assert_eq!(player.id(), 1);
    assert_eq!(ctx.scenes.find("Guard").unwrap().id(), 2);
    assert!(ctx.scenes.find("Hero").is_none());

    let stats = player.get_component("Stats").unwrap();
    assert_eq!(stats.get("hp").as_int(), Some(25));
    assert_eq!(stats.key(), "2");
    assert!(stats.actor().unwrap().ptr_eq(&player));
    assert_eq!(log.take(), ["OnStart:1", "OnStart:1"]);
}

#[test]
fn test_preserved_actor_survives_without_restart() {
    let log = CallLog::default();
    let (_dir, ctx) = world(&log);
    ctx.scenes.load_scene_now(&ctx, "town").unwrap();
    let player = ctx.scenes.find("Player").unwrap();
    ctx.scenes.dont_destroy(&player);
    log.take();

    ctx.scenes.load("forest");
    assert!(ctx.scenes.has_pending_transition());
    assert_eq!(ctx.scenes.current_name(), "town");
    ctx.scenes.apply_pending_transition(&ctx).unwrap();

    assert_eq!(ctx.scenes.current_name(), "forest");
    assert!(!ctx.scenes.has_pending_transition());
    let survivor = ctx.scenes.find("Player").unwrap();
    assert!(survivor.ptr_eq(&player));
    assert!(survivor.id() >= 10_000);
    assert!(ctx.scenes.find("Guard").is_none());
    assert!(ctx.scenes.find("Wolf").is_some());

    // Only the wolf is started.
    assert_eq!(log.take(), ["OnStart:1"]);

    frame(&ctx);
    assert_eq!(log.count("OnStart:1"), 0);
    assert_eq!(log.count("OnUpdate:1"), 2);
}

#[test]
fn test_runtime_ids_do_not_collide_with_preserved_actors() {
    let log = CallLog::default();
    let (_dir, ctx) = world(&log);
    ctx.scenes.load_scene_now(&ctx, "town").unwrap();
    ctx.scenes.dont_destroy(&ctx.scenes.find("Player").unwrap());
    ctx.scenes.dont_destroy(&ctx.scenes.find("Guard").unwrap());
    ctx.scenes.load_scene_now(&ctx, "forest").unwrap();

    let spawned = ctx.scenes.instantiate(&ctx, "Hero").unwrap();
    let mut ids: Vec<_> = ctx.scenes.current().actors().iter().map(ActorHandle::id).collect();
    ids.push(spawned.id());
    let mut unique = ids.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), ids.len());
    assert!(spawned.id() >= 10_002);
}

#[test]
fn test_transition_drops_queued_requests() {
    let log = CallLog::default();
    let (_dir, ctx) = world(&log);
    ctx.scenes.load_scene_now(&ctx, "town").unwrap();
    ctx.scenes.instantiate(&ctx, "Hero").unwrap();
    ctx.scenes.load_scene_now(&ctx, "forest").unwrap();
    log.take();

    frame(&ctx);
    assert!(ctx.scenes.find("Hero").is_none());
    assert_eq!(ctx.scenes.current().len(), 1);
    assert_eq!(log.take(), ["OnUpdate:1", "OnLateUpdate:1"]);
}

#[test]
fn test_missing_scene_is_an_error() {
    let log = CallLog::default();
    let (_dir, ctx) = world(&log);
    ctx.scenes.load("swamp");
    assert!(matches!(
        ctx.scenes.apply_pending_transition(&ctx),
        Err(EngineError::MissingScene(name)) if name == "swamp"
    ));
}

#[test]
fn test_malformed_scene_is_an_error() {
    let log = CallLog::default();
    let (dir, ctx) = world(&log);
    write(dir.path(), "broken.scene", "{ \"actors\": [ ");
    assert!(matches!(
        ctx.scenes.load_scene_now(&ctx, "broken"),
        Err(EngineError::Document { .. })
    ));
}

#[test]
fn test_unknown_component_type_in_scene_is_an_error() {
    let log = CallLog::default();
    let (dir, ctx) = world(&log);
    write(
        dir.path(),
        "odd.scene",
        r#"{ "actors": [ { "name": "X", "components": { "1": { "type": "Mystery" } } } ] }"#,
    );
    assert!(matches!(
        ctx.scenes.load_scene_now(&ctx, "odd"),
        Err(EngineError::MissingComponentType(name)) if name == "Mystery"
    ));
}
