//! 2D physics: bodies, contacts, ray queries and the actor bridge
//!
//! The world owns bodies and fixtures; the contact bridge turns its begin/end
//! events into actor callbacks once the world is no longer borrowed.

pub mod collision_layers;
pub mod shape;
pub mod world;
pub mod contact_bridge;
pub mod raycast;
pub mod rigidbody;

pub use collision_layers::{CollisionCategory, FixtureFilter};
pub use contact_bridge::Collision;
pub use raycast::HitResult;
pub use rigidbody::Rigidbody;
pub use shape::Shape;
pub use world::{BodyDef, BodyHandle, BodyType, ContactEvent, ContactPhase, FixtureDef, FixtureHandle, PhysicsWorld};

use crate::engine::EngineContext;
use crate::foundation::math::Vec2;
use std::cell::{Ref, RefCell, RefMut};

/// Physics world shared through the engine context
#[derive(Debug, Default)]
pub struct PhysicsSystem {
    world: RefCell<PhysicsWorld>,
}

impl PhysicsSystem {
    /// Create a system with default gravity
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Read access to the world
    pub fn world(&self) -> Ref<'_, PhysicsWorld> {
        self.world.borrow()
    }
    
    /// Write access to the world; must not be held across hook calls
    pub fn world_mut(&self) -> RefMut<'_, PhysicsWorld> {
        self.world.borrow_mut()
    }
    
    /// Advance by `dt` and deliver contact callbacks
    pub fn step(&self, ctx: &EngineContext, dt: f32) {
        let events = self.world.borrow_mut().step(dt);
        if !events.is_empty() {
            log::trace!("Physics step produced {} contact events", events.len());
        }
        contact_bridge::route_contacts(ctx, &events);
    }
    
    /// Closest actor hit along a ray
    pub fn raycast(&self, pos: Vec2, dir: Vec2, dist: f32) -> Option<HitResult> {
        raycast::raycast(&self.world(), pos, dir, dist)
    }
    
    /// Every actor hit along a ray, closest first
    pub fn raycast_all(&self, pos: Vec2, dir: Vec2, dist: f32) -> Vec<HitResult> {
        raycast::raycast_all(&self.world(), pos, dir, dist)
    }
}
