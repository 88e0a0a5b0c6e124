use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::{
    Extensions, FailureActionOrReusable, ParameterOrReusable, Step, SuccessActionOrReusable,
};

/// An ordered list of steps with its own inputs and outputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub workflow_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// JSON Schema of the inputs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Value>,

    /// Workflows that must complete first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    pub steps: Vec<Step>,

    /// Inherited by every step
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub success_actions: Vec<SuccessActionOrReusable>,

    /// Inherited by every step
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failure_actions: Vec<FailureActionOrReusable>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, String>,

    /// Inherited by every step
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterOrReusable>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Workflow {
    pub fn step(&self, step_id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.step_id == step_id)
    }
}
