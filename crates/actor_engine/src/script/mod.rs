//! Dynamic object capability
//!
//! Scripted behaviour is expressed through class objects ([`ScriptClass`])
//! holding default fields and callable functions. Component instances link to
//! their class and keep their own field table, so lookups fall through from
//! instance to class the way a prototype chain does. Native components expose
//! the same get/set/invoke surface, which lets the scheduler treat both kinds
//! uniformly.

pub mod value;
pub mod class;

pub use value::{Value, ScriptFn, ScriptError, ScriptResult};
pub use class::{ScriptClass, ScriptRegistry};
