//! Dynamic values exchanged between the engine and scripted components

use crate::ecs::{ActorHandle, ComponentRef};
use crate::engine::{EngineContext, EngineError};
use crate::foundation::math::Vec2;
use crate::physics::Collision;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Result type returned by every scripted function
pub type ScriptResult = Result<Value, ScriptError>;

type ScriptBody = dyn Fn(&EngineContext, &ComponentRef, &[Value]) -> ScriptResult;

/// A callable stored in a class or instance table
///
/// Invoked with the engine context, the receiving component (`self` in
/// script terms) and positional arguments. Two handles are equal only when
/// they wrap the same closure allocation.
#[derive(Clone)]
pub struct ScriptFn(Rc<ScriptBody>);

impl ScriptFn {
    /// Wrap a closure as a script function
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&EngineContext, &ComponentRef, &[Value]) -> ScriptResult + 'static,
    {
        Self(Rc::new(f))
    }
    
    /// Invoke the function
    pub fn call(&self, ctx: &EngineContext, this: &ComponentRef, args: &[Value]) -> ScriptResult {
        (self.0)(ctx, this, args)
    }
    
    /// Identity comparison
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ScriptFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScriptFn({:p})", Rc::as_ptr(&self.0).cast::<()>())
    }
}

/// Errors raised by scripted hooks and handlers
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Recoverable runtime failure; logged with the owning actor's name and skipped
    #[error("{0}")]
    Runtime(String),
    
    /// Configuration error surfaced from inside a hook; aborts the engine
    #[error(transparent)]
    Fatal(#[from] EngineError),
}

impl ScriptError {
    /// Build a runtime error from any message
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime(message.into())
    }
}

/// Dynamically typed value
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Nil,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// String
    Str(String),
    /// 2D vector
    Vec2(Vec2),
    /// Callable
    Function(ScriptFn),
    /// Actor reference
    Actor(ActorHandle),
    /// Component reference
    Component(ComponentRef),
    /// Contact data delivered to collision and trigger callbacks
    Collision(Collision),
}

impl Value {
    /// True for [`Value::Nil`]
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }
    
    /// True for [`Value::Function`]
    pub fn is_function(&self) -> bool {
        matches!(self, Self::Function(_))
    }
    
    /// Boolean view
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
    
    /// Integer view; floats are truncated
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) => Some(*f as i64),
            _ => None,
        }
    }
    
    /// Float view; integers are widened
    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
    
    /// `f32` view used by native fields
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_f32(&self) -> Option<f32> {
        self.as_float().map(|f| f as f32)
    }
    
    /// String view
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
    
    /// Vector view
    pub fn as_vec2(&self) -> Option<Vec2> {
        match self {
            Self::Vec2(v) => Some(*v),
            _ => None,
        }
    }
    
    /// Function view
    pub fn as_function(&self) -> Option<&ScriptFn> {
        match self {
            Self::Function(f) => Some(f),
            _ => None,
        }
    }
    
    /// Actor view
    pub fn as_actor(&self) -> Option<&ActorHandle> {
        match self {
            Self::Actor(a) => Some(a),
            _ => None,
        }
    }
    
    /// Collision view
    pub fn as_collision(&self) -> Option<&Collision> {
        match self {
            Self::Collision(c) => Some(c),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec2> for Value {
    fn from(value: Vec2) -> Self {
        Self::Vec2(value)
    }
}

impl From<ScriptFn> for Value {
    fn from(value: ScriptFn) -> Self {
        Self::Function(value)
    }
}

impl From<ActorHandle> for Value {
    fn from(value: ActorHandle) -> Self {
        Self::Actor(value)
    }
}
