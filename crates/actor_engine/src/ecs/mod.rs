//! Actor/component model
//!
//! Actors own a key-sorted map of components. Components are either native
//! records or scripted instances, both behind [`ComponentRef`]. Every
//! structural change (add/remove component) is staged on the actor and applied
//! by the scene at fixed points of the frame.

pub mod component;
pub mod factory;
pub mod actor;
pub mod template;

pub use component::{Component, ComponentBody, ComponentRef, Hook, NativeComponent, ScriptInstance};
pub use factory::ComponentFactory;
pub use actor::{Actor, ActorHandle, ActorId, WeakActor};
pub use template::{Template, TemplateRegistry};
