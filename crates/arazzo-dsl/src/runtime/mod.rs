//! Criteria evaluation and the directives a host executor follows after each step.

mod condition;
mod criteria;
mod directive;

pub use condition::{Comparison, Condition, Operand};
pub use criteria::{CriteriaEngine, CriterionEvaluator};
pub use directive::{ActionTarget, Directive};
