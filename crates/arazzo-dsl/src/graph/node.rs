use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use crate::catalog::Operation;
use crate::document::{Criterion, FailureAction, Parameter, RequestBody, StepTarget, SuccessAction};

/// A workflow with its references resolved
#[derive(Debug, Clone)]
pub struct WorkflowNode {
    pub id: String,

    /// Position in the graph arena and in the document
    pub index: usize,

    /// Arena indices of local workflows this one depends on
    pub dependencies: Vec<usize>,

    /// `$sourceDescriptions.<name>.<workflowId>` entries of dependsOn
    pub external_dependencies: Vec<String>,

    /// Input schema with a `#/components/inputs/` reference inlined
    pub inputs: Option<Value>,

    pub parameters: Vec<Parameter>,
    pub success_actions: Vec<SuccessAction>,
    pub failure_actions: Vec<FailureAction>,
    pub outputs: BTreeMap<String, String>,
    pub steps: Vec<StepNode>,

    pub(crate) step_index: HashMap<String, usize>,
}

impl WorkflowNode {
    pub fn step(&self, step_id: &str) -> Option<&StepNode> {
        self.step_index.get(step_id).map(|&i| &self.steps[i])
    }
}

/// A step with its effective parameters and actions
#[derive(Debug, Clone)]
pub struct StepNode {
    pub id: String,

    /// Arena index of the owning workflow
    pub workflow: usize,

    pub target: StepTarget,

    /// Arena index of the called workflow when the target is local
    pub called_workflow: Option<usize>,

    /// Filled in by [`super::WorkflowGraph::bind_operations`]
    pub operation: Option<Operation>,

    /// Workflow parameters overlaid with the step's own
    pub parameters: Vec<Parameter>,

    pub request_body: Option<RequestBody>,
    pub success_criteria: Vec<Criterion>,

    /// Workflow success actions overlaid with the step's own
    pub on_success: Vec<SuccessAction>,

    /// Workflow failure actions overlaid with the step's own
    pub on_failure: Vec<FailureAction>,

    pub outputs: BTreeMap<String, String>,
}
