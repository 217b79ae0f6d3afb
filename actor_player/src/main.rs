//! Headless actor engine player
//!
//! Boots the engine from a resource directory, registers the demo script
//! classes and runs frames without a window.
//!
//! Usage: `actor_player [resource_root] [max_frames]`

use actor_engine::foundation::logging;
use actor_engine::prelude::*;

const DEFAULT_RESOURCES: &str = "resources";
const DEFAULT_FRAMES: u64 = 600;

fn player_controller() -> ScriptClass {
    ScriptClass::new("PlayerController")
        .with_field("speed", 2.0)
        .with_method("OnUpdate", |ctx, this, _args| {
            let Some(actor) = this.actor() else {
                return Ok(Value::Nil);
            };
            let Some(body) = actor.get_component(Rigidbody::KIND) else {
                return Err(ScriptError::runtime("PlayerController requires a Rigidbody"));
            };
            let speed = this.get("speed").as_f32().unwrap_or(0.0);

            let mut direction = Vec2::zeros();
            {
                let input = ctx.input.borrow();
                if input.key("right") || input.key("d") {
                    direction.x += 1.0;
                }
                if input.key("left") || input.key("a") {
                    direction.x -= 1.0;
                }
                if input.key_down("escape") {
                    ctx.request_quit();
                }
            }

            let component = body.borrow();
            if let Some(rigidbody) = component.native::<Rigidbody>() {
                rigidbody.add_force(&ctx.physics, direction * speed);
                let position = rigidbody.position(&ctx.physics);
                ctx.renderer.draw_pixel(
                    (position.x * 100.0) as i32,
                    (position.y * 100.0) as i32,
                    Color::WHITE,
                );
            }
            Ok(Value::Nil)
        })
        .with_method("OnCollisionEnter", |ctx, this, args| {
            let Some(collision) = args.first().and_then(Value::as_collision) else {
                return Ok(Value::Nil);
            };
            let other = collision
                .other
                .as_ref()
                .map_or_else(|| "nothing".to_string(), ActorHandle::name);
            let owner = this.actor().map(|actor| actor.name()).unwrap_or_default();
            log::info!("{} landed on {}", owner, other);
            ctx.events.publish(ctx, "hit", &Value::from(other));
            Ok(Value::Nil)
        })
}

fn score_keeper() -> ScriptClass {
    ScriptClass::new("ScoreKeeper")
        .with_field("score", 0)
        .with_method("OnStart", |ctx, this, _args| {
            if let Some(actor) = this.actor() {
                ctx.scenes.dont_destroy(&actor);
            }
            let on_hit = ScriptFn::new(|_ctx, this, args| {
                let score = this.get("score").as_int().unwrap_or(0) + 1;
                this.set("score", score);
                let target = args.first().and_then(Value::as_str).unwrap_or("?");
                log::info!("Hit {} (score {})", target, score);
                Ok(Value::Nil)
            });
            ctx.events.subscribe("hit", this, &on_hit);
            Ok(Value::Nil)
        })
}

fn director() -> ScriptClass {
    ScriptClass::new("Director")
        .with_field("frames", 60)
        .with_field("next_scene", "")
        .with_method("OnUpdate", |ctx, this, _args| {
            let frames = this.get("frames").as_int().unwrap_or(0) - 1;
            this.set("frames", frames);
            if frames != 0 {
                return Ok(Value::Nil);
            }
            let next = this.get("next_scene");
            match next.as_str() {
                Some(scene) if !scene.is_empty() => ctx.scenes.load(scene),
                _ => ctx.request_quit(),
            }
            Ok(Value::Nil)
        })
}

fn scripts() -> ScriptRegistry {
    ScriptRegistry::new()
        .with(player_controller())
        .with(score_keeper())
        .with(director())
}

fn run(root: &str, frames: u64) -> Result<(), EngineError> {
    let config = EngineConfig::load(root)?;
    let mut engine = Engine::new(
        config,
        scripts(),
        Box::new(HeadlessBackend::new(root)),
        Box::new(HeadlessAudioBackend::new(root)),
    )?;
    engine.run(Some(frames))
}

fn main() {
    logging::init();

    let mut args = std::env::args().skip(1);
    let root = args.next().unwrap_or_else(|| DEFAULT_RESOURCES.to_string());
    let frames = match args.next().map(|arg| arg.parse::<u64>()) {
        None => DEFAULT_FRAMES,
        Some(Ok(frames)) => frames,
        Some(Err(e)) => {
            log::error!("Invalid frame count: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&root, frames) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

