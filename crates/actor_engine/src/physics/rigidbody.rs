//! Built-in `Rigidbody` component

use super::collision_layers::FixtureFilter;
use super::shape::Shape;
use super::world::{BodyDef, BodyHandle, BodyType, FixtureDef};
use super::PhysicsSystem;
use crate::ecs::{ActorHandle, NativeComponent};
use crate::engine::EngineContext;
use crate::foundation::math::{to_degrees, to_radians, Vec2};
use crate::script::{ScriptError, Value};
use std::any::Any;

/// A physics body attached to an actor
///
/// Fields describe the body until `OnStart` creates it; afterwards the
/// runtime accessors read and write the live body.
#[derive(Debug, Clone)]
pub struct Rigidbody {
    /// Initial x position
    pub x: f32,
    /// Initial y position
    pub y: f32,
    /// `dynamic`, `kinematic` or `static`
    pub body_type: String,
    /// Continuous collision
    pub precise: bool,
    /// Gravity multiplier
    pub gravity_scale: f32,
    /// Fixture density
    pub density: f32,
    /// Angular damping
    pub angular_friction: f32,
    /// Initial rotation in degrees, clockwise
    pub rotation: f32,
    /// Create a solid collider
    pub has_collider: bool,
    /// `box` or `circle`
    pub collider_type: String,
    /// Collider box width
    pub width: f32,
    /// Collider box height
    pub height: f32,
    /// Collider circle radius
    pub radius: f32,
    /// Collider friction
    pub friction: f32,
    /// Collider restitution
    pub bounciness: f32,
    /// Create a trigger volume
    pub has_trigger: bool,
    /// `box` or `circle`
    pub trigger_type: String,
    /// Trigger box width
    pub trigger_width: f32,
    /// Trigger box height
    pub trigger_height: f32,
    /// Trigger circle radius
    pub trigger_radius: f32,
    body: Option<BodyHandle>,
}

impl Default for Rigidbody {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            body_type: "dynamic".to_string(),
            precise: true,
            gravity_scale: 1.0,
            density: 1.0,
            angular_friction: 0.3,
            rotation: 0.0,
            has_collider: true,
            collider_type: "box".to_string(),
            width: 1.0,
            height: 1.0,
            radius: 0.5,
            friction: 0.3,
            bounciness: 0.3,
            has_trigger: true,
            trigger_type: "box".to_string(),
            trigger_width: 1.0,
            trigger_height: 1.0,
            trigger_radius: 0.5,
            body: None,
        }
    }
}

const FIELDS: &[&str] = &[
    "x",
    "y",
    "body_type",
    "precise",
    "gravity_scale",
    "density",
    "angular_friction",
    "rotation",
    "has_collider",
    "collider_type",
    "width",
    "height",
    "radius",
    "friction",
    "bounciness",
    "has_trigger",
    "trigger_type",
    "trigger_width",
    "trigger_height",
    "trigger_radius",
];

fn shape_of(kind: &str, width: f32, height: f32, radius: f32) -> Option<Shape> {
    match kind {
        "box" => Some(Shape::rect(width, height)),
        "circle" => Some(Shape::circle(radius)),
        _ => None,
    }
}

impl Rigidbody {
    /// Registered type name
    pub const KIND: &'static str = "Rigidbody";
    
    /// Live body, once started
    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }
    
    fn float_field(&mut self, name: &str) -> Option<&mut f32> {
        Some(match name {
            "x" => &mut self.x,
            "y" => &mut self.y,
            "gravity_scale" => &mut self.gravity_scale,
            "density" => &mut self.density,
            "angular_friction" => &mut self.angular_friction,
            "rotation" => &mut self.rotation,
            "width" => &mut self.width,
            "height" => &mut self.height,
            "radius" => &mut self.radius,
            "friction" => &mut self.friction,
            "bounciness" => &mut self.bounciness,
            "trigger_width" => &mut self.trigger_width,
            "trigger_height" => &mut self.trigger_height,
            "trigger_radius" => &mut self.trigger_radius,
            _ => return None,
        })
    }
    
    fn bool_field(&mut self, name: &str) -> Option<&mut bool> {
        Some(match name {
            "precise" => &mut self.precise,
            "has_collider" => &mut self.has_collider,
            "has_trigger" => &mut self.has_trigger,
            _ => return None,
        })
    }
    
    fn string_field(&mut self, name: &str) -> Option<&mut String> {
        Some(match name {
            "body_type" => &mut self.body_type,
            "collider_type" => &mut self.collider_type,
            "trigger_type" => &mut self.trigger_type,
            _ => return None,
        })
    }
    
    /// Create the body and its fixtures
    pub fn create_body(&mut self, physics: &PhysicsSystem, owner: Option<&ActorHandle>) -> BodyHandle {
        let mut world = physics.world_mut();
        let body = world.create_body(&BodyDef {
            body_type: BodyType::from_name(&self.body_type).unwrap_or(BodyType::Static),
            position: Vec2::new(self.x, self.y),
            angle: to_radians(self.rotation),
            bullet: self.precise,
            gravity_scale: self.gravity_scale,
            angular_damping: self.angular_friction,
        });
        let user_data = owner.map(ActorHandle::downgrade);
        
        if !self.has_collider && !self.has_trigger {
            let mut phantom = FixtureDef::new(Shape::rect(self.width, self.height));
            phantom.is_sensor = true;
            phantom.density = self.density;
            phantom.filter = FixtureFilter::phantom();
            phantom.user_data = user_data;
            world.create_fixture(body, phantom);
            self.body = Some(body);
            return body;
        }
        
        if self.has_collider {
            if let Some(shape) = shape_of(&self.collider_type, self.width, self.height, self.radius) {
                let mut collider = FixtureDef::new(shape);
                collider.density = self.density;
                collider.friction = self.friction;
                collider.restitution = self.bounciness;
                collider.filter = FixtureFilter::solid();
                collider.user_data = user_data.clone();
                world.create_fixture(body, collider);
            }
        }
        
        if self.has_trigger {
            if let Some(shape) = shape_of(&self.trigger_type, self.trigger_width, self.trigger_height, self.trigger_radius) {
                let mut trigger = FixtureDef::new(shape);
                trigger.is_sensor = true;
                trigger.density = self.density;
                trigger.filter = FixtureFilter::sensor();
                trigger.user_data = user_data;
                world.create_fixture(body, trigger);
            }
        }
        
        self.body = Some(body);
        body
    }
    
    /// Current position
    pub fn position(&self, physics: &PhysicsSystem) -> Vec2 {
        self.body
            .and_then(|b| physics.world().position(b))
            .unwrap_or_else(|| Vec2::new(self.x, self.y))
    }
    
    /// Current rotation in degrees
    pub fn rotation(&self, physics: &PhysicsSystem) -> f32 {
        self.body.and_then(|b| physics.world().angle(b)).map_or(self.rotation, to_degrees)
    }
    
    /// Current linear velocity
    pub fn velocity(&self, physics: &PhysicsSystem) -> Vec2 {
        self.body.and_then(|b| physics.world().linear_velocity(b)).unwrap_or_else(Vec2::zeros)
    }
    
    /// Current angular velocity in degrees per second
    pub fn angular_velocity(&self, physics: &PhysicsSystem) -> f32 {
        self.body.and_then(|b| physics.world().angular_velocity(b)).map_or(0.0, to_degrees)
    }
    
    /// Current gravity scale
    pub fn current_gravity_scale(&self, physics: &PhysicsSystem) -> f32 {
        self.body.and_then(|b| physics.world().gravity_scale(b)).unwrap_or(self.gravity_scale)
    }
    
    /// Unit vector the body's top faces
    pub fn up_direction(&self, physics: &PhysicsSystem) -> Vec2 {
        let angle = to_radians(self.rotation(physics));
        Vec2::new(angle.sin(), -angle.cos())
    }
    
    /// Unit vector the body's right side faces
    pub fn right_direction(&self, physics: &PhysicsSystem) -> Vec2 {
        let angle = to_radians(self.rotation(physics));
        Vec2::new(angle.cos(), angle.sin())
    }
    
    /// Push the body; applied on the next step
    pub fn add_force(&self, physics: &PhysicsSystem, force: Vec2) {
        if let Some(body) = self.body {
            physics.world_mut().apply_force(body, force);
        }
    }
    
    /// Set linear velocity
    pub fn set_velocity(&self, physics: &PhysicsSystem, velocity: Vec2) {
        if let Some(body) = self.body {
            physics.world_mut().set_linear_velocity(body, velocity);
        }
    }
    
    /// Set angular velocity in degrees per second
    pub fn set_angular_velocity(&self, physics: &PhysicsSystem, degrees: f32) {
        if let Some(body) = self.body {
            physics.world_mut().set_angular_velocity(body, to_radians(degrees));
        }
    }
    
    /// Set gravity scale
    pub fn set_gravity_scale(&mut self, physics: &PhysicsSystem, scale: f32) {
        match self.body {
            Some(body) => physics.world_mut().set_gravity_scale(body, scale),
            None => self.gravity_scale = scale,
        }
    }
    
    /// Teleport the body, or move the initial position before start
    pub fn set_position(&mut self, physics: &PhysicsSystem, position: Vec2) {
        match self.body {
            Some(body) => {
                let mut world = physics.world_mut();
                let angle = world.angle(body).unwrap_or_default();
                world.set_transform(body, position, angle);
            }
            None => {
                self.x = position.x;
                self.y = position.y;
            }
        }
    }
    
    /// Set rotation in degrees
    pub fn set_rotation(&mut self, physics: &PhysicsSystem, degrees: f32) {
        match self.body {
            Some(body) => {
                let mut world = physics.world_mut();
                let position = world.position(body).unwrap_or_else(Vec2::zeros);
                world.set_transform(body, position, to_radians(degrees));
            }
            None => self.rotation = degrees,
        }
    }
    
    /// Rotate so the body's top faces `dir`
    pub fn set_up_direction(&mut self, physics: &PhysicsSystem, dir: Vec2) {
        let angle = dir.x.atan2(-dir.y);
        self.set_rotation(physics, to_degrees(angle));
    }
    
    /// Rotate so the body's right side faces `dir`
    pub fn set_right_direction(&mut self, physics: &PhysicsSystem, dir: Vec2) {
        let angle = dir.x.atan2(-dir.y) - std::f32::consts::FRAC_PI_2;
        self.set_rotation(physics, to_degrees(angle));
    }
}

impl NativeComponent for Rigidbody {
    fn kind(&self) -> &'static str {
        Self::KIND
    }
    
    fn field_names(&self) -> &'static [&'static str] {
        FIELDS
    }
    
    fn get_field(&self, name: &str) -> Option<Value> {
        let value: Value = match name {
            "x" => self.x.into(),
            "y" => self.y.into(),
            "body_type" => self.body_type.clone().into(),
            "precise" => self.precise.into(),
            "gravity_scale" => self.gravity_scale.into(),
            "density" => self.density.into(),
            "angular_friction" => self.angular_friction.into(),
            "rotation" => self.rotation.into(),
            "has_collider" => self.has_collider.into(),
            "collider_type" => self.collider_type.clone().into(),
            "width" => self.width.into(),
            "height" => self.height.into(),
            "radius" => self.radius.into(),
            "friction" => self.friction.into(),
            "bounciness" => self.bounciness.into(),
            "has_trigger" => self.has_trigger.into(),
            "trigger_type" => self.trigger_type.clone().into(),
            "trigger_width" => self.trigger_width.into(),
            "trigger_height" => self.trigger_height.into(),
            "trigger_radius" => self.trigger_radius.into(),
            _ => return None,
        };
        Some(value)
    }
    
    fn set_field(&mut self, name: &str, value: &Value) -> bool {
        if let Some(slot) = self.float_field(name) {
            return value.as_f32().map(|v| *slot = v).is_some();
        }
        if let Some(slot) = self.bool_field(name) {
            return value.as_bool().map(|v| *slot = v).is_some();
        }
        if let Some(slot) = self.string_field(name) {
            return value.as_str().map(|v| *slot = v.to_string()).is_some();
        }
        false
    }
    
    fn duplicate(&self) -> Box<dyn NativeComponent> {
        Box::new(Self {
            body: None,
            ..self.clone()
        })
    }
    
    fn on_start(&mut self, ctx: &EngineContext, owner: Option<&ActorHandle>) -> Result<(), ScriptError> {
        self.create_body(&ctx.physics, owner);
        Ok(())
    }
    
    fn on_destroy(&mut self, ctx: &EngineContext) -> Result<(), ScriptError> {
        if let Some(body) = self.body.take() {
            ctx.physics.world_mut().destroy_body(body);
        }
        Ok(())
    }
    
    fn as_any(&self) -> &dyn Any {
        self
    }
    
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_field_access_by_name() {
        let mut rb = Rigidbody::default();
        assert!(rb.set_field("width", &Value::Int(3)));
        assert!(rb.set_field("collider_type", &Value::from("circle")));
        assert!(!rb.set_field("width", &Value::from("wide")));
        assert!(!rb.set_field("mass", &Value::Float(1.0)));

        assert_eq!(rb.get_field("width").and_then(|v| v.as_f32()), Some(3.0));
        assert_eq!(rb.get_field("collider_type").as_ref().and_then(Value::as_str), Some("circle"));
        assert_eq!(rb.field_names().len(), FIELDS.len());
    }

    #[test]
    fn test_phantom_body_when_no_collider_or_trigger() {
        let physics = PhysicsSystem::new();
        let mut rb = Rigidbody {
            has_collider: false,
            has_trigger: false,
            ..Rigidbody::default()
        };
        let body = rb.create_body(&physics, None);

        let world = physics.world();
        let fixtures = world.body_fixtures(body);
        assert_eq!(fixtures.len(), 1);
        assert!(world.fixture_filter(fixtures[0]).unwrap().is_phantom());
        assert_eq!(world.fixture_is_sensor(fixtures[0]), Some(true));
    }

    #[test]
    fn test_collider_and_trigger_fixtures() {
        let physics = PhysicsSystem::new();
        let mut rb = Rigidbody::default();
        let body = rb.create_body(&physics, None);
        assert_eq!(physics.world().body_fixtures(body).len(), 2);
    }

    #[test]
    fn test_rotation_round_trip_through_body() {
        let physics = PhysicsSystem::new();
        let mut rb = Rigidbody {
            rotation: 90.0,
            body_type: "static".to_string(),
            ..Rigidbody::default()
        };
        rb.create_body(&physics, None);
        assert_relative_eq!(rb.rotation(&physics), 90.0, epsilon = 1.0e-4);

        let right = rb.right_direction(&physics);
        assert_relative_eq!(right.y, 1.0, epsilon = 1.0e-4);

        rb.set_up_direction(&physics, Vec2::new(0.0, -1.0));
        assert_relative_eq!(rb.rotation(&physics), 0.0, epsilon = 1.0e-4);
    }
}
