//! Contact routing and ray queries through `Rigidbody` components

mod common;

use actor_engine::foundation::math::sentinel;
use actor_engine::prelude::*;
use approx::assert_relative_eq;
use common::{contact_class, context, frame, load_scene, CallLog};
use std::cell::RefCell;
use std::rc::Rc;

const STEP: f32 = 1.0 / 60.0;

const LANDING: &str = r#"{ "actors": [
    { "name": "Ground", "components": {
        "1": { "type": "Rigidbody", "body_type": "static", "y": 2.0, "width": 20.0 },
        "2": { "type": "ContactLogger" } } },
    { "name": "Ball", "components": {
        "1": { "type": "Rigidbody", "y": 1.2 },
        "2": { "type": "ContactLogger" } } }
] }"#;

fn move_body(actor: &ActorHandle, ctx: &EngineContext, position: Vec2) {
    let component = actor.get_component(Rigidbody::KIND).unwrap();
    let mut component = component.borrow_mut();
    component
        .native_mut::<Rigidbody>()
        .unwrap()
        .set_position(&ctx.physics, position);
}

#[test]
fn test_overlap_raises_collision_and_trigger_enter() {
    let log = CallLog::default();
    let ctx = context(ScriptRegistry::new().with(contact_class(&log)));
    load_scene(&ctx, "test", LANDING);

    ctx.physics.step(&ctx, STEP);
    let mut entries = log.take();
    entries.sort();
    assert_eq!(
        entries,
        [
            "OnCollisionEnter:Ball->Ground",
            "OnCollisionEnter:Ground->Ball",
            "OnTriggerEnter:Ball->Ground",
            "OnTriggerEnter:Ground->Ball",
        ]
    );

    ctx.physics.step(&ctx, STEP);
    assert!(log.entries().is_empty());

    let ball = ctx.scenes.find("Ball").unwrap();
    move_body(&ball, &ctx, Vec2::new(0.0, -10.0));
    ctx.physics.step(&ctx, STEP);
    let mut entries = log.take();
    entries.sort();
    assert_eq!(
        entries,
        [
            "OnCollisionExit:Ball->Ground",
            "OnCollisionExit:Ground->Ball",
            "OnTriggerExit:Ball->Ground",
            "OnTriggerExit:Ground->Ball",
        ]
    );
}

#[test]
fn test_only_collision_enter_carries_geometry() {
    let seen: Rc<RefCell<Vec<(String, Vec2, Vec2)>>> = Rc::default();
    let mut probe = ScriptClass::new("ContactLogger");
    for hook in ["OnCollisionEnter", "OnTriggerEnter", "OnCollisionExit"] {
        let seen = Rc::clone(&seen);
        probe = probe.with_method(hook, move |_ctx, _this, args| {
            if let Some(collision) = args.first().and_then(Value::as_collision) {
                seen.borrow_mut().push((hook.to_string(), collision.point, collision.normal));
            }
            Ok(Value::Nil)
        });
    }
    let ctx = context(ScriptRegistry::new().with(probe));
    load_scene(&ctx, "test", LANDING);
    ctx.physics.step(&ctx, STEP);
    move_body(&ctx.scenes.find("Ball").unwrap(), &ctx, Vec2::new(0.0, -10.0));
    ctx.physics.step(&ctx, STEP);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 6);
    for (hook, point, normal) in seen.iter() {
        if hook == "OnCollisionEnter" {
            assert_ne!(*point, sentinel());
            assert_relative_eq!(normal.norm(), 1.0, epsilon = 1e-4);
        } else {
            assert_eq!(*point, sentinel());
            assert_eq!(*normal, sentinel());
        }
    }
}

#[test]
fn test_destroyed_body_ends_contact_for_the_survivor() {
    let log = CallLog::default();
    let ctx = context(ScriptRegistry::new().with(contact_class(&log)));
    load_scene(&ctx, "test", LANDING);
    ctx.physics.step(&ctx, STEP);
    log.take();

    let ball = ctx.scenes.find("Ball").unwrap();
    ctx.scenes.destroy(&ctx, &ball);
    frame(&ctx);

    let entries = log.take();
    assert!(entries.contains(&"OnCollisionExit:Ground->Ball".to_string()));
    assert!(entries.iter().all(|entry| !entry.starts_with("OnCollisionExit:Ball")));
    assert_eq!(ctx.physics.world().body_count(), 1);
}

#[test]
fn test_phantom_bodies_raise_no_callbacks() {
    let log = CallLog::default();
    let ctx = context(ScriptRegistry::new().with(contact_class(&log)));
    load_scene(
        &ctx,
        "test",
        r#"{ "actors": [
            { "name": "Ground", "components": {
                "1": { "type": "Rigidbody", "body_type": "static", "y": 2.0, "width": 20.0 },
                "2": { "type": "ContactLogger" } } },
            { "name": "Ghost", "components": {
                "1": { "type": "Rigidbody", "y": 1.2, "has_collider": false, "has_trigger": false },
                "2": { "type": "ContactLogger" } } }
        ] }"#,
    );
    ctx.physics.step(&ctx, STEP);
    assert!(log.entries().is_empty());
}

const CORRIDOR: &str = r#"{ "actors": [
    { "name": "Near", "components": {
        "1": { "type": "Rigidbody", "body_type": "static", "x": 2.0, "has_trigger": false } } },
    { "name": "Far", "components": {
        "1": { "type": "Rigidbody", "body_type": "static", "x": 5.0, "has_trigger": false } } },
    { "name": "Zone", "components": {
        "1": { "type": "Rigidbody", "body_type": "static", "x": 8.0, "has_collider": false } } },
    { "name": "Ghost", "components": {
        "1": { "type": "Rigidbody", "body_type": "static", "x": 11.0, "has_collider": false, "has_trigger": false } } }
] }"#;

#[test]
fn test_raycast_all_sorted_by_fraction() {
    let ctx = context(ScriptRegistry::new());
    load_scene(&ctx, "test", CORRIDOR);

    let hits = ctx.physics.raycast_all(Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), 10.0);
    let names: Vec<String> = hits.iter().map(|hit| hit.actor.name()).collect();
    assert_eq!(names, ["Near", "Far", "Zone"]);
    assert!(hits.windows(2).all(|pair| pair[0].fraction <= pair[1].fraction));

    assert_relative_eq!(hits[0].fraction, 0.15, epsilon = 1e-4);
    assert_relative_eq!(hits[0].point.x, 1.5, epsilon = 1e-4);
    assert_relative_eq!(hits[0].normal.x, -1.0, epsilon = 1e-4);
    assert!(!hits[0].is_trigger);
    assert!(hits[2].is_trigger);
}

#[test]
fn test_raycast_returns_closest_hit() {
    let ctx = context(ScriptRegistry::new());
    load_scene(&ctx, "test", CORRIDOR);

    let hit = ctx.physics.raycast(Vec2::new(7.0, 0.0), Vec2::new(-1.0, 0.0), 10.0).unwrap();
    assert_eq!(hit.actor.name(), "Far");
    assert!(ctx.physics.raycast(Vec2::new(0.0, 0.0), Vec2::new(0.0, 1.0), 10.0).is_none());
}

#[test]
fn test_ray_starting_inside_a_fixture_skips_it() {
    let ctx = context(ScriptRegistry::new());
    load_scene(&ctx, "test", CORRIDOR);

    let hits = ctx.physics.raycast_all(Vec2::new(2.0, 0.0), Vec2::new(1.0, 0.0), 4.0);
    let names: Vec<String> = hits.iter().map(|hit| hit.actor.name()).collect();
    assert_eq!(names, ["Far"]);

    let closest = ctx.physics.raycast(Vec2::new(2.0, 0.0), Vec2::new(1.0, 0.0), 4.0).unwrap();
    assert_eq!(closest.actor.name(), "Far");
}

#[test]
fn test_phantom_body_is_invisible_to_rays() {
    let ctx = context(ScriptRegistry::new());
    load_scene(&ctx, "test", CORRIDOR);

    let from = Vec2::new(10.0, 0.0);
    assert!(ctx.physics.raycast(from, Vec2::new(1.0, 0.0), 3.0).is_none());
    assert!(ctx.physics.raycast_all(from, Vec2::new(1.0, 0.0), 3.0).is_empty());
}

#[test]
fn test_degenerate_rays_hit_nothing() {
    let ctx = context(ScriptRegistry::new());
    load_scene(&ctx, "test", CORRIDOR);

    assert!(ctx.physics.raycast(Vec2::zeros(), Vec2::new(1.0, 0.0), 0.0).is_none());
    assert!(ctx.physics.raycast_all(Vec2::zeros(), Vec2::zeros(), 10.0).is_empty());
}
