//! Turns reusable references into concrete objects and merges workflow and step scopes.

mod reference;
mod scope;

pub use reference::ReferenceResolver;
pub use scope::{duplicates, ensure_unique, merge, ParameterIdentity, Scoped};
