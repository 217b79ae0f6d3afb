//! Ray queries returning actors

use super::collision_layers::CollisionCategory;
use super::world::{FixtureRayHit, PhysicsWorld};
use crate::ecs::ActorHandle;
use crate::foundation::math::Vec2;

/// A qualifying ray hit
#[derive(Debug, Clone)]
pub struct HitResult {
    /// Actor owning the fixture
    pub actor: ActorHandle,
    /// Hit point
    pub point: Vec2,
    /// Surface normal
    pub normal: Vec2,
    /// Whether the fixture is a trigger
    pub is_trigger: bool,
    /// Fraction along the ray
    pub fraction: f32,
}

/// Phantoms, category-less sensors, embedded origins and ownerless fixtures are skipped
fn qualify(hit: &FixtureRayHit) -> Option<HitResult> {
    if hit.is_sensor && (hit.category.contains(CollisionCategory::PHANTOM) || hit.category.is_empty()) {
        return None;
    }
    if hit.fraction == 0.0 {
        return None;
    }
    let actor = hit.user_data.as_ref()?.upgrade()?;
    Some(HitResult {
        actor,
        point: hit.point,
        normal: hit.normal,
        is_trigger: hit.is_sensor,
        fraction: hit.fraction,
    })
}

fn segment(pos: Vec2, dir: Vec2, dist: f32) -> Option<(Vec2, Vec2)> {
    let length = dir.norm();
    if dist <= 0.0 || length == 0.0 {
        return None;
    }
    Some((pos, pos + dir / length * dist))
}

/// Closest qualifying hit along `dir` within `dist`
pub fn raycast(world: &PhysicsWorld, pos: Vec2, dir: Vec2, dist: f32) -> Option<HitResult> {
    let (p1, p2) = segment(pos, dir, dist)?;
    let mut closest: Option<HitResult> = None;
    world.ray_cast(
        |hit| match qualify(hit) {
            Some(result) => {
                closest = Some(result);
                hit.fraction
            }
            None => -1.0,
        },
        p1,
        p2,
    );
    closest
}

/// Every qualifying hit along `dir` within `dist`, closest first
pub fn raycast_all(world: &PhysicsWorld, pos: Vec2, dir: Vec2, dist: f32) -> Vec<HitResult> {
    let Some((p1, p2)) = segment(pos, dir, dist) else {
        return Vec::new();
    };
    let mut hits = Vec::new();
    world.ray_cast(
        |hit| {
            if let Some(result) = qualify(hit) {
                hits.push(result);
                1.0
            } else {
                -1.0
            }
        },
        p1,
        p2,
    );
    hits.sort_by(|a, b| a.fraction.total_cmp(&b.fraction));
    hits
}
