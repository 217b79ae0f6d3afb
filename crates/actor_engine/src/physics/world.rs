//! Rigid body world: integration, contact tracking and ray queries
//!
//! Contacts are detected by testing every fixture pair that passes the
//! category filter and diffing the touching set against the previous step,
//! which yields begin and end events in a stable order.

use super::collision_layers::{CollisionCategory, FixtureFilter};
use super::shape::{Manifold, Shape, WorldShape};
use crate::ecs::WeakActor;
use crate::foundation::math::Vec2;
use slotmap::{new_key_type, SlotMap};
use std::collections::BTreeMap;

new_key_type! {
    /// Handle to a body
    pub struct BodyHandle;
    /// Handle to a fixture
    pub struct FixtureHandle;
}

/// Default downward gravity (y points down)
pub const GRAVITY_Y: f32 = 9.8;

/// How a body moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyType {
    /// Never moves
    Static,
    /// Moves by its velocity only
    Kinematic,
    /// Moves under gravity and forces
    #[default]
    Dynamic,
}

impl BodyType {
    /// Parse `static`, `kinematic` or `dynamic`
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "static" => Some(Self::Static),
            "kinematic" => Some(Self::Kinematic),
            "dynamic" => Some(Self::Dynamic),
            _ => None,
        }
    }
}

/// Body creation parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDef {
    /// Motion type
    pub body_type: BodyType,
    /// Initial position
    pub position: Vec2,
    /// Initial angle in radians
    pub angle: f32,
    /// Continuous collision hint
    pub bullet: bool,
    /// Multiplier on world gravity
    pub gravity_scale: f32,
    /// Angular velocity damping
    pub angular_damping: f32,
}

impl Default for BodyDef {
    fn default() -> Self {
        Self {
            body_type: BodyType::Dynamic,
            position: Vec2::zeros(),
            angle: 0.0,
            bullet: false,
            gravity_scale: 1.0,
            angular_damping: 0.0,
        }
    }
}

/// Fixture creation parameters
#[derive(Debug, Clone)]
pub struct FixtureDef {
    /// Body-space shape
    pub shape: Shape,
    /// Sensors report overlap without blocking
    pub is_sensor: bool,
    /// Mass per unit area
    pub density: f32,
    /// Surface friction
    pub friction: f32,
    /// Restitution
    pub restitution: f32,
    /// Category and mask
    pub filter: FixtureFilter,
    /// Owning actor
    pub user_data: Option<WeakActor>,
}

impl FixtureDef {
    /// Fixture with default material and filter
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            is_sensor: false,
            density: 1.0,
            friction: 0.3,
            restitution: 0.0,
            filter: FixtureFilter::default(),
            user_data: None,
        }
    }
}

#[derive(Debug)]
struct Body {
    body_type: BodyType,
    position: Vec2,
    angle: f32,
    linear_velocity: Vec2,
    angular_velocity: f32,
    force: Vec2,
    gravity_scale: f32,
    angular_damping: f32,
    bullet: bool,
    fixtures: Vec<FixtureHandle>,
}

#[derive(Debug)]
struct Fixture {
    body: BodyHandle,
    def: FixtureDef,
}

/// Begin or end of a touching pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    /// The fixtures started touching
    Begin,
    /// The fixtures stopped touching
    End,
}

/// One fixture's view of a contact
#[derive(Debug, Clone)]
pub struct ContactSide {
    /// Fixture handle
    pub fixture: FixtureHandle,
    /// Owning actor, if any
    pub actor: Option<WeakActor>,
    /// Whether the fixture is a sensor
    pub is_sensor: bool,
    /// Fixture category
    pub category: CollisionCategory,
}

/// Contact notification produced by a step
#[derive(Debug, Clone)]
pub struct ContactEvent {
    /// Begin or end
    pub phase: ContactPhase,
    /// First fixture
    pub a: ContactSide,
    /// Second fixture
    pub b: ContactSide,
    /// Contact geometry; `None` once the fixtures have separated
    pub manifold: Option<Manifold>,
    /// Velocity of A's body minus velocity of B's body
    pub relative_velocity: Vec2,
}

/// A fixture reported to a ray-cast callback
#[derive(Debug, Clone)]
pub struct FixtureRayHit {
    /// Fixture handle
    pub fixture: FixtureHandle,
    /// Owning actor
    pub user_data: Option<WeakActor>,
    /// Whether the fixture is a sensor
    pub is_sensor: bool,
    /// Fixture category
    pub category: CollisionCategory,
    /// Hit point
    pub point: Vec2,
    /// Surface normal
    pub normal: Vec2,
    /// Fraction along the ray
    pub fraction: f32,
}

type PairKey = (FixtureHandle, FixtureHandle);

/// The simulation world
#[derive(Debug)]
pub struct PhysicsWorld {
    gravity: Vec2,
    bodies: SlotMap<BodyHandle, Body>,
    fixtures: SlotMap<FixtureHandle, Fixture>,
    touching: BTreeMap<PairKey, Manifold>,
    pending_events: Vec<ContactEvent>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(Vec2::new(0.0, GRAVITY_Y))
    }
}

impl PhysicsWorld {
    /// Create an empty world
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            bodies: SlotMap::with_key(),
            fixtures: SlotMap::with_key(),
            touching: BTreeMap::new(),
            pending_events: Vec::new(),
        }
    }
    
    /// Add a body
    pub fn create_body(&mut self, def: &BodyDef) -> BodyHandle {
        self.bodies.insert(Body {
            body_type: def.body_type,
            position: def.position,
            angle: def.angle,
            linear_velocity: Vec2::zeros(),
            angular_velocity: 0.0,
            force: Vec2::zeros(),
            gravity_scale: def.gravity_scale,
            angular_damping: def.angular_damping,
            bullet: def.bullet,
            fixtures: Vec::new(),
        })
    }
    
    /// Attach a fixture to a body
    pub fn create_fixture(&mut self, body: BodyHandle, def: FixtureDef) -> Option<FixtureHandle> {
        if !self.bodies.contains_key(body) {
            return None;
        }
        let handle = self.fixtures.insert(Fixture { body, def });
        self.bodies.get_mut(body)?.fixtures.push(handle);
        Some(handle)
    }
    
    /// Remove a body and its fixtures
    ///
    /// Pairs it was touching are reported as ended on the next step.
    pub fn destroy_body(&mut self, body: BodyHandle) {
        let Some(removed) = self.bodies.remove(body) else {
            return;
        };
        
        let ended: Vec<PairKey> = self
            .touching
            .keys()
            .filter(|(a, b)| removed.fixtures.contains(a) || removed.fixtures.contains(b))
            .copied()
            .collect();
        for pair in ended {
            self.touching.remove(&pair);
            if let Some(event) = self.contact_event(ContactPhase::End, pair, None) {
                self.pending_events.push(event);
            }
        }
        
        for fixture in removed.fixtures {
            self.fixtures.remove(fixture);
        }
    }
    
    /// Number of live bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
    
    /// Whether `body` still exists
    pub fn contains_body(&self, body: BodyHandle) -> bool {
        self.bodies.contains_key(body)
    }
    
    /// Fixtures of a body
    pub fn body_fixtures(&self, body: BodyHandle) -> &[FixtureHandle] {
        self.bodies.get(body).map(|b| b.fixtures.as_slice()).unwrap_or_default()
    }
    
    /// Filter of a fixture
    pub fn fixture_filter(&self, fixture: FixtureHandle) -> Option<FixtureFilter> {
        self.fixtures.get(fixture).map(|f| f.def.filter)
    }
    
    /// Whether a fixture is a sensor
    pub fn fixture_is_sensor(&self, fixture: FixtureHandle) -> Option<bool> {
        self.fixtures.get(fixture).map(|f| f.def.is_sensor)
    }
    
    /// Body position
    pub fn position(&self, body: BodyHandle) -> Option<Vec2> {
        self.bodies.get(body).map(|b| b.position)
    }
    
    /// Body angle in radians
    pub fn angle(&self, body: BodyHandle) -> Option<f32> {
        self.bodies.get(body).map(|b| b.angle)
    }
    
    /// Body linear velocity
    pub fn linear_velocity(&self, body: BodyHandle) -> Option<Vec2> {
        self.bodies.get(body).map(|b| b.linear_velocity)
    }
    
    /// Body angular velocity in radians per second
    pub fn angular_velocity(&self, body: BodyHandle) -> Option<f32> {
        self.bodies.get(body).map(|b| b.angular_velocity)
    }
    
    /// Body gravity scale
    pub fn gravity_scale(&self, body: BodyHandle) -> Option<f32> {
        self.bodies.get(body).map(|b| b.gravity_scale)
    }
    
    /// Whether the body requested continuous collision
    pub fn is_bullet(&self, body: BodyHandle) -> Option<bool> {
        self.bodies.get(body).map(|b| b.bullet)
    }
    
    /// Move a body
    pub fn set_transform(&mut self, body: BodyHandle, position: Vec2, angle: f32) {
        if let Some(b) = self.bodies.get_mut(body) {
            b.position = position;
            b.angle = angle;
        }
    }
    
    /// Set linear velocity (ignored for static bodies)
    pub fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec2) {
        if let Some(b) = self.bodies.get_mut(body).filter(|b| b.body_type != BodyType::Static) {
            b.linear_velocity = velocity;
        }
    }
    
    /// Set angular velocity (ignored for static bodies)
    pub fn set_angular_velocity(&mut self, body: BodyHandle, omega: f32) {
        if let Some(b) = self.bodies.get_mut(body).filter(|b| b.body_type != BodyType::Static) {
            b.angular_velocity = omega;
        }
    }
    
    /// Set gravity scale
    pub fn set_gravity_scale(&mut self, body: BodyHandle, scale: f32) {
        if let Some(b) = self.bodies.get_mut(body) {
            b.gravity_scale = scale;
        }
    }
    
    /// Accumulate a force at the centre of mass until the next step
    pub fn apply_force(&mut self, body: BodyHandle, force: Vec2) {
        if let Some(b) = self.bodies.get_mut(body).filter(|b| b.body_type == BodyType::Dynamic) {
            b.force += force;
        }
    }
    
    fn mass(&self, body: &Body) -> f32 {
        let mass: f32 = body
            .fixtures
            .iter()
            .filter_map(|f| self.fixtures.get(*f))
            .map(|f| f.def.density * f.def.shape.area())
            .sum();
        if mass > 0.0 { mass } else { 1.0 }
    }
    
    fn world_shape(&self, fixture: &Fixture) -> Option<WorldShape> {
        let body = self.bodies.get(fixture.body)?;
        Some(fixture.def.shape.to_world_space(body.position, body.angle))
    }
    
    /// Advance the simulation and return the contact changes, ends before begins
    pub fn step(&mut self, dt: f32) -> Vec<ContactEvent> {
        self.integrate(dt);
        
        let current = self.find_contacts();
        let mut events = std::mem::take(&mut self.pending_events);
        
        let ended: Vec<PairKey> = self.touching.keys().filter(|k| !current.contains_key(k)).copied().collect();
        let began: Vec<(PairKey, Manifold)> = current
            .iter()
            .filter(|(k, _)| !self.touching.contains_key(k))
            .map(|(k, m)| (*k, *m))
            .collect();
        
        self.touching = current;
        events.extend(ended.into_iter().filter_map(|pair| self.contact_event(ContactPhase::End, pair, None)));
        events.extend(began.into_iter().filter_map(|(pair, m)| self.contact_event(ContactPhase::Begin, pair, Some(m))));
        events
    }
    
    fn integrate(&mut self, dt: f32) {
        let masses: Vec<(BodyHandle, f32)> = self.bodies.iter().map(|(h, b)| (h, self.mass(b))).collect();
        for (handle, mass) in masses {
            let Some(body) = self.bodies.get_mut(handle) else {
                continue;
            };
            match body.body_type {
                BodyType::Static => continue,
                BodyType::Kinematic => {}
                BodyType::Dynamic => {
                    body.linear_velocity += (self.gravity * body.gravity_scale + body.force / mass) * dt;
                    body.angular_velocity /= 1.0 + dt * body.angular_damping;
                }
            }
            body.position += body.linear_velocity * dt;
            body.angle += body.angular_velocity * dt;
            body.force = Vec2::zeros();
        }
    }
    
    fn find_contacts(&self) -> BTreeMap<PairKey, Manifold> {
        let placed: Vec<(FixtureHandle, &Fixture, WorldShape)> = self
            .fixtures
            .iter()
            .filter_map(|(h, f)| self.world_shape(f).map(|shape| (h, f, shape)))
            .collect();
        
        let mut contacts = BTreeMap::new();
        for (i, (ha, fa, sa)) in placed.iter().enumerate() {
            for (hb, fb, sb) in &placed[i + 1..] {
                if fa.body == fb.body || !fa.def.filter.should_collide(&fb.def.filter) {
                    continue;
                }
                let dynamic = |f: &Fixture| self.bodies.get(f.body).is_some_and(|b| b.body_type == BodyType::Dynamic);
                if !dynamic(fa) && !dynamic(fb) {
                    continue;
                }
                if let Some(manifold) = sa.overlap(sb) {
                    let key = if ha < hb { (*ha, *hb) } else { (*hb, *ha) };
                    let manifold = if ha < hb { manifold } else { Manifold { normal: -manifold.normal, ..manifold } };
                    contacts.insert(key, manifold);
                }
            }
        }
        contacts
    }
    
    fn contact_event(&self, phase: ContactPhase, (a, b): PairKey, manifold: Option<Manifold>) -> Option<ContactEvent> {
        let fa = self.fixtures.get(a)?;
        let fb = self.fixtures.get(b)?;
        let velocity = |f: &Fixture| self.bodies.get(f.body).map_or(Vec2::zeros(), |body| body.linear_velocity);
        let side = |handle, f: &Fixture| ContactSide {
            fixture: handle,
            actor: f.def.user_data.clone(),
            is_sensor: f.def.is_sensor,
            category: f.def.filter.category,
        };
        
        Some(ContactEvent {
            phase,
            a: side(a, fa),
            b: side(b, fb),
            manifold,
            relative_velocity: velocity(fa) - velocity(fb),
        })
    }
    
    /// Cast the segment `p1 -> p2`, reporting fixtures to `callback`
    ///
    /// The callback's return value controls the cast: `-1` ignores the
    /// fixture, `0` stops, a fraction clips the ray there, and `1` continues
    /// unclipped. Fixtures are only reported if they lie within the current
    /// clip.
    pub fn ray_cast<F>(&self, mut callback: F, p1: Vec2, p2: Vec2)
    where
        F: FnMut(&FixtureRayHit) -> f32,
    {
        let mut max_fraction = 1.0_f32;
        for (handle, fixture) in &self.fixtures {
            let Some(shape) = self.world_shape(fixture) else {
                continue;
            };
            let Some(hit) = shape.ray_cast(p1, p2) else {
                continue;
            };
            if hit.fraction > max_fraction {
                continue;
            }
            
            let report = FixtureRayHit {
                fixture: handle,
                user_data: fixture.def.user_data.clone(),
                is_sensor: fixture.def.is_sensor,
                category: fixture.def.filter.category,
                point: hit.point,
                normal: hit.normal,
                fraction: hit.fraction,
            };
            let value = callback(&report);
            if value == 0.0 {
                return;
            }
            if value > 0.0 && value < max_fraction {
                max_fraction = value;
            }
        }
    }
}
