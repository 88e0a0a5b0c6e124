mod action;
mod components;
mod criterion;
mod parameter;
mod request_body;
mod reusable;
mod step;
mod workflow;

pub use action::{
    FailureAction, FailureActionOrReusable, FailureActionType, SuccessAction,
    SuccessActionOrReusable, SuccessActionType,
};
pub use components::Components;
pub use criterion::{
    Criterion, CriterionExpressionType, CriterionType, CriterionTypeOrExpressionType,
    ExpressionLanguage,
};
pub use parameter::{Parameter, ParameterLocation, ParameterOrReusable};
pub use request_body::{PayloadReplacement, RequestBody};
pub use reusable::{OrReusable, Reusable};
pub use step::{Step, StepTarget};
pub use workflow::Workflow;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Specification extensions. Every key should start with `x-`.
pub type Extensions = BTreeMap<String, Value>;

/// Root of an Arazzo document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArazzoDocument {
    /// Arazzo specification version, e.g. "1.0.1"
    pub arazzo: String,

    pub info: Info,

    /// APIs and other Arazzo documents the workflows call into
    #[serde(default)]
    pub source_descriptions: Vec<SourceDescription>,

    #[serde(default)]
    pub workflows: Vec<Workflow>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

impl ArazzoDocument {
    /// Look up a workflow by id
    pub fn workflow(&self, workflow_id: &str) -> Option<&Workflow> {
        self.workflows.iter().find(|w| w.workflow_id == workflow_id)
    }

    /// Look up a source description by name
    pub fn source_description(&self, name: &str) -> Option<&SourceDescription> {
        self.source_descriptions.iter().find(|s| s.name == name)
    }

    /// JSON view used to evaluate `$workflows.`, `$sourceDescriptions.` and `$components.`
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Metadata about the workflows in the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub version: String,

    #[serde(flatten)]
    pub extensions: Extensions,
}

/// A named API description or Arazzo document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescription {
    pub name: String,

    pub url: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<SourceDescriptionType>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceDescriptionType {
    Openapi,
    Arazzo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deserialize_root() {
        let yaml = r#"
arazzo: 1.0.1
info:
  title: Pet adoption
  version: 1.0.0
  x-owner: pets-team
sourceDescriptions:
  - name: petstore
    url: ./petstore.yaml
    type: openapi
workflows: []
x-internal: true
"#;
        let document: ArazzoDocument = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(document.arazzo, "1.0.1");
        assert_eq!(document.info.title, "Pet adoption");
        assert_eq!(
            document.info.extensions.get("x-owner"),
            Some(&Value::from("pets-team"))
        );
        assert_eq!(
            document.source_description("petstore").and_then(|s| s.source_type),
            Some(SourceDescriptionType::Openapi)
        );
        assert_eq!(document.extensions.get("x-internal"), Some(&Value::from(true)));
        assert!(document.components.is_none());
        assert!(document.workflow("missing").is_none());
    }
}
