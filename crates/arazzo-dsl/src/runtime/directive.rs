use arazzo_expression::ExecutionContext;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::document::{FailureAction, FailureActionType, SuccessAction, SuccessActionType};
use crate::error::DslError;
use crate::graph::StepNode;

use super::criteria::CriteriaEngine;

/// Where a goto or retry sends the executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionTarget {
    Step(String),
    /// Local workflow id or `$sourceDescriptions.<name>.<workflowId>`
    Workflow(String),
}

impl fmt::Display for ActionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionTarget::Step(id) => write!(f, "step {}", id),
            ActionTarget::Workflow(id) => write!(f, "workflow {}", id),
        }
    }
}

/// What the executor does after a step
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// No success action applied, run the next step
    Continue,
    End,
    Goto(ActionTarget),
    Retry {
        delay: Duration,
        limit: u32,
        target: ActionTarget,
    },
    /// No failure action applied
    Fail,
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Continue => f.write_str("continue"),
            Directive::End => f.write_str("end"),
            Directive::Goto(target) => write!(f, "goto {}", target),
            Directive::Retry { delay, limit, target } => {
                write!(f, "retry {} after {:?} (limit {})", target, delay, limit)
            }
            Directive::Fail => f.write_str("fail"),
        }
    }
}

impl StepNode {
    /// All success criteria hold
    pub fn succeeded(
        &self,
        engine: &CriteriaEngine,
        context: &dyn ExecutionContext,
    ) -> Result<bool, DslError> {
        engine.all(&self.success_criteria, context)
    }

    /// First effective success action whose criteria hold
    pub fn on_success(
        &self,
        engine: &CriteriaEngine,
        context: &dyn ExecutionContext,
    ) -> Result<Directive, DslError> {
        for action in &self.on_success {
            if engine.all(&action.criteria, context)? {
                debug!(step_id = %self.id, action = %action.name, "Applying success action");
                return self.success_directive(action);
            }
        }
        Ok(Directive::Continue)
    }

    /// First effective failure action whose criteria hold
    pub fn on_failure(
        &self,
        engine: &CriteriaEngine,
        context: &dyn ExecutionContext,
    ) -> Result<Directive, DslError> {
        for action in &self.on_failure {
            if engine.all(&action.criteria, context)? {
                debug!(step_id = %self.id, action = %action.name, "Applying failure action");
                return self.failure_directive(action);
            }
        }
        Ok(Directive::Fail)
    }

    /// Check the success criteria, then pick the matching action
    pub fn next_directive(
        &self,
        engine: &CriteriaEngine,
        context: &dyn ExecutionContext,
    ) -> Result<Directive, DslError> {
        if self.succeeded(engine, context)? {
            self.on_success(engine, context)
        } else {
            self.on_failure(engine, context)
        }
    }

    fn success_directive(&self, action: &SuccessAction) -> Result<Directive, DslError> {
        match action.action_type {
            SuccessActionType::End => Ok(Directive::End),
            SuccessActionType::Goto => {
                let target = target_of(action.workflow_id.as_ref(), action.step_id.as_ref())
                    .ok_or_else(|| missing_target(&action.name))?;
                Ok(Directive::Goto(target))
            }
        }
    }

    fn failure_directive(&self, action: &FailureAction) -> Result<Directive, DslError> {
        let target = target_of(action.workflow_id.as_ref(), action.step_id.as_ref());
        match action.action_type {
            FailureActionType::End => Ok(Directive::End),
            FailureActionType::Goto => Ok(Directive::Goto(
                target.ok_or_else(|| missing_target(&action.name))?,
            )),
            FailureActionType::Retry => {
                let delay =
                    Duration::try_from_secs_f64(action.effective_retry_delay()).map_err(|e| {
                        DslError::Criterion(format!(
                            "invalid retryDelay on '{}': {}",
                            action.name, e
                        ))
                    })?;
                let limit = u32::try_from(action.effective_retry_limit()).map_err(|_| {
                    DslError::Criterion(format!("invalid retryLimit on '{}'", action.name))
                })?;
                Ok(Directive::Retry {
                    delay,
                    limit,
                    target: target.ok_or_else(|| missing_target(&action.name))?,
                })
            }
        }
    }
}

fn target_of(workflow_id: Option<&String>, step_id: Option<&String>) -> Option<ActionTarget> {
    match (workflow_id, step_id) {
        (_, Some(step_id)) => Some(ActionTarget::Step(step_id.clone())),
        (Some(workflow_id), None) => Some(ActionTarget::Workflow(workflow_id.clone())),
        (None, None) => None,
    }
}

fn missing_target(action: &str) -> DslError {
    DslError::NotFound {
        kind: "target of action",
        name: action.to_string(),
    }
}
