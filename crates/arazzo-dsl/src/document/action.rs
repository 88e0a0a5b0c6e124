use serde::{Deserialize, Serialize};

use super::{Criterion, Extensions, OrReusable};

/// What to do after a step succeeds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessAction {
    pub name: String,

    #[serde(rename = "type")]
    pub action_type: SuccessActionType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,

    /// All must hold for the action to apply
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub criteria: Vec<Criterion>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuccessActionType {
    End,
    Goto,
}

/// What to do after a step fails
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureAction {
    pub name: String,

    #[serde(rename = "type")]
    pub action_type: FailureActionType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,

    /// Seconds to wait before retrying
    #[serde(default, alias = "retryAfter", skip_serializing_if = "Option::is_none")]
    pub retry_delay: Option<f64>,

    /// Number of attempts, 1 when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_limit: Option<i64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub criteria: Vec<Criterion>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

impl FailureAction {
    pub const DEFAULT_RETRY_LIMIT: i64 = 1;

    pub fn effective_retry_limit(&self) -> i64 {
        self.retry_limit.unwrap_or(Self::DEFAULT_RETRY_LIMIT)
    }

    pub fn effective_retry_delay(&self) -> f64 {
        self.retry_delay.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureActionType {
    End,
    Retry,
    Goto,
}

pub type SuccessActionOrReusable = OrReusable<SuccessAction>;
pub type FailureActionOrReusable = OrReusable<FailureAction>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_failure_action_defaults() {
        let yaml = "name: retryLater\ntype: retry\nstepId: fetch";
        let action: FailureAction = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(action.action_type, FailureActionType::Retry);
        assert_eq!(action.effective_retry_limit(), 1);
        assert_eq!(action.effective_retry_delay(), 0.0);
        assert_eq!(action.step_id.as_deref(), Some("fetch"));
    }

    #[test]
    fn test_retry_after_alias() {
        let yaml = "name: backoff\ntype: retry\nretryAfter: 2.5\nretryLimit: 3";
        let action: FailureAction = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(action.retry_delay, Some(2.5));
        assert_eq!(action.retry_limit, Some(3));
    }

    #[test]
    fn test_success_action_with_criteria() {
        let yaml = r#"
name: finish
type: end
criteria:
  - condition: $statusCode == 200
"#;
        let action: SuccessAction = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(action.action_type, SuccessActionType::End);
        assert_eq!(action.criteria.len(), 1);
    }
}
