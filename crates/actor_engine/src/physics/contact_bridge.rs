//! Routes physics contacts to actor collision and trigger callbacks

use super::world::{ContactEvent, ContactPhase, ContactSide};
use crate::ecs::{ActorHandle, Hook};
use crate::engine::EngineContext;
use crate::foundation::math::{sentinel, Vec2};

/// Contact data handed to `OnCollision*` / `OnTrigger*`
///
/// Only a solid-solid begin carries real geometry; every other callback uses
/// the sentinel vector for `point` and `normal`.
#[derive(Debug, Clone)]
pub struct Collision {
    /// The other actor, if it could be resolved
    pub other: Option<ActorHandle>,
    /// Contact point
    pub point: Vec2,
    /// Contact normal, pointing from the first fixture to the second
    pub normal: Vec2,
    /// Velocity of the first body minus the second
    pub relative_velocity: Vec2,
}

fn classify(event: &ContactEvent) -> Option<Hook> {
    let (a, b) = (&event.a, &event.b);
    if is_phantom(a) || is_phantom(b) {
        return None;
    }
    match (a.is_sensor, b.is_sensor, event.phase) {
        (false, false, ContactPhase::Begin) => Some(Hook::CollisionEnter),
        (false, false, ContactPhase::End) => Some(Hook::CollisionExit),
        (true, true, ContactPhase::Begin) => Some(Hook::TriggerEnter),
        (true, true, ContactPhase::End) => Some(Hook::TriggerExit),
        _ => None,
    }
}

fn is_phantom(side: &ContactSide) -> bool {
    side.category.contains(super::CollisionCategory::PHANTOM)
}

/// Deliver a batch of contact events, in order
pub fn route_contacts(ctx: &EngineContext, events: &[ContactEvent]) {
    for event in events {
        let actor_a = event.a.actor.as_ref().and_then(|w| w.upgrade());
        let actor_b = event.b.actor.as_ref().and_then(|w| w.upgrade());
        if actor_a.is_none() && actor_b.is_none() {
            continue;
        }
        let Some(hook) = classify(event) else {
            continue;
        };
        
        let (point, normal) = match (hook, event.manifold) {
            (Hook::CollisionEnter, Some(manifold)) => (manifold.point, manifold.normal),
            _ => (sentinel(), sentinel()),
        };
        log::trace!("{:?} between {:?} and {:?}", hook, actor_a, actor_b);
        
        if let Some(a) = &actor_a {
            let collision = Collision {
                other: actor_b.clone(),
                point,
                normal,
                relative_velocity: event.relative_velocity,
            };
            a.dispatch_contact(ctx, hook, &collision);
        }
        if let Some(b) = &actor_b {
            let collision = Collision {
                other: actor_a.clone(),
                point,
                normal,
                relative_velocity: event.relative_velocity,
            };
            b.dispatch_contact(ctx, hook, &collision);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::world::FixtureHandle;
    use crate::physics::CollisionCategory;

    fn side(is_sensor: bool, category: CollisionCategory) -> ContactSide {
        ContactSide {
            fixture: FixtureHandle::default(),
            actor: None,
            is_sensor,
            category,
        }
    }

    fn event(phase: ContactPhase, a: ContactSide, b: ContactSide) -> ContactEvent {
        ContactEvent {
            phase,
            a,
            b,
            manifold: None,
            relative_velocity: Vec2::zeros(),
        }
    }

    #[test]
    fn test_classification() {
        let solid = || side(false, CollisionCategory::SOLID);
        let sensor = || side(true, CollisionCategory::SENSOR);
        let phantom = || side(true, CollisionCategory::PHANTOM);

        assert_eq!(classify(&event(ContactPhase::Begin, solid(), solid())), Some(Hook::CollisionEnter));
        assert_eq!(classify(&event(ContactPhase::End, solid(), solid())), Some(Hook::CollisionExit));
        assert_eq!(classify(&event(ContactPhase::Begin, sensor(), sensor())), Some(Hook::TriggerEnter));
        assert_eq!(classify(&event(ContactPhase::End, sensor(), sensor())), Some(Hook::TriggerExit));
        assert_eq!(classify(&event(ContactPhase::Begin, solid(), sensor())), None);
        assert_eq!(classify(&event(ContactPhase::Begin, phantom(), sensor())), None);
    }
}
