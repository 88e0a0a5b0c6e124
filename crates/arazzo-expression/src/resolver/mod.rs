//! Structural extraction and runtime evaluation over a parsed expression.

mod context;
mod evaluate;
mod shape;

pub use context::{ExecutionContext, HttpMessage, RuntimeContext};
pub use evaluate::evaluate;
pub use shape::{resolve_name, ShapeMatcher};
