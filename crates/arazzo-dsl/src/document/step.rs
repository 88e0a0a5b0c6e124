use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::{
    Criterion, Extensions, FailureActionOrReusable, ParameterOrReusable, RequestBody,
    SuccessActionOrReusable,
};

/// One call inside a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub step_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterOrReusable>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub success_criteria: Vec<Criterion>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_success: Vec<SuccessActionOrReusable>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_failure: Vec<FailureActionOrReusable>,

    /// Output name to runtime expression
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, String>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

/// What a step invokes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StepTarget {
    OperationId(String),
    OperationPath(String),
    Workflow(String),
}

impl fmt::Display for StepTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepTarget::OperationId(id) => write!(f, "operationId {}", id),
            StepTarget::OperationPath(path) => write!(f, "operationPath {}", path),
            StepTarget::Workflow(id) => write!(f, "workflowId {}", id),
        }
    }
}

impl Step {
    /// Every target field that is set
    pub fn targets(&self) -> Vec<StepTarget> {
        let mut targets = Vec::with_capacity(1);
        if let Some(id) = &self.operation_id {
            targets.push(StepTarget::OperationId(id.clone()));
        }
        if let Some(path) = &self.operation_path {
            targets.push(StepTarget::OperationPath(path.clone()));
        }
        if let Some(id) = &self.workflow_id {
            targets.push(StepTarget::Workflow(id.clone()));
        }
        targets
    }

    /// The single target, `None` when zero or several are set
    pub fn target(&self) -> Option<StepTarget> {
        let mut targets = self.targets();
        if targets.len() == 1 {
            targets.pop()
        } else {
            None
        }
    }
}
