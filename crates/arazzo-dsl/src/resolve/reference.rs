use arazzo_expression::{resolve_name, NamedRoot};
use serde_json::Value;
use tracing::{debug, warn};

use crate::document::{
    ArazzoDocument, Components, FailureAction, OrReusable, Parameter, Reusable, SuccessAction,
};
use crate::error::DslError;

/// Replaces [`Reusable`] placeholders with the components entries they point at
pub struct ReferenceResolver<'a> {
    components: Option<&'a Components>,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(document: &'a ArazzoDocument) -> Self {
        Self {
            components: document.components.as_ref(),
        }
    }

    pub fn from_components(components: &'a Components) -> Self {
        Self {
            components: Some(components),
        }
    }

    /// Resolve `$components.parameters.<name>`, applying a non-empty value override
    pub fn resolve_parameter(&self, item: &OrReusable<Parameter>) -> Result<Parameter, DslError> {
        match item {
            OrReusable::Object(parameter) => Ok(parameter.clone()),
            OrReusable::Reusable(reusable) => {
                let name = component_name(reusable, NamedRoot::ComponentsParameters)?;
                let mut parameter = self
                    .components
                    .and_then(|c| c.parameters.get(&name))
                    .cloned()
                    .ok_or_else(|| not_found("component parameter", &name))?;

                if let Some(value) = reusable.value.as_ref().filter(|v| !is_empty(v)) {
                    debug!(parameter = %name, "Overriding component parameter value");
                    parameter.value = value.clone();
                }
                Ok(parameter)
            }
        }
    }

    /// Resolve `$components.successActions.<name>`
    pub fn resolve_success_action(
        &self,
        item: &OrReusable<SuccessAction>,
    ) -> Result<SuccessAction, DslError> {
        match item {
            OrReusable::Object(action) => Ok(action.clone()),
            OrReusable::Reusable(reusable) => {
                let name = component_name(reusable, NamedRoot::ComponentsSuccessActions)?;
                warn_ignored_value(reusable, &name);
                self.components
                    .and_then(|c| c.success_actions.get(&name))
                    .cloned()
                    .ok_or_else(|| not_found("component success action", &name))
            }
        }
    }

    /// Resolve `$components.failureActions.<name>`
    pub fn resolve_failure_action(
        &self,
        item: &OrReusable<FailureAction>,
    ) -> Result<FailureAction, DslError> {
        match item {
            OrReusable::Object(action) => Ok(action.clone()),
            OrReusable::Reusable(reusable) => {
                let name = component_name(reusable, NamedRoot::ComponentsFailureActions)?;
                warn_ignored_value(reusable, &name);
                self.components
                    .and_then(|c| c.failure_actions.get(&name))
                    .cloned()
                    .ok_or_else(|| not_found("component failure action", &name))
            }
        }
    }

    pub fn resolve_parameters(
        &self,
        items: &[OrReusable<Parameter>],
    ) -> Result<Vec<Parameter>, DslError> {
        items.iter().map(|item| self.resolve_parameter(item)).collect()
    }

    pub fn resolve_success_actions(
        &self,
        items: &[OrReusable<SuccessAction>],
    ) -> Result<Vec<SuccessAction>, DslError> {
        items.iter().map(|item| self.resolve_success_action(item)).collect()
    }

    pub fn resolve_failure_actions(
        &self,
        items: &[OrReusable<FailureAction>],
    ) -> Result<Vec<FailureAction>, DslError> {
        items.iter().map(|item| self.resolve_failure_action(item)).collect()
    }
}

fn component_name(reusable: &Reusable, expected: NamedRoot) -> Result<String, DslError> {
    resolve_name(&reusable.reference, expected)
        .map_err(|e| DslError::expression(&reusable.reference, e))
}

fn not_found(kind: &'static str, name: &str) -> DslError {
    DslError::NotFound {
        kind,
        name: name.to_string(),
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn warn_ignored_value(reusable: &Reusable, name: &str) {
    if reusable.value.as_ref().is_some_and(|v| !is_empty(v)) {
        warn!(action = %name, "Value override on an action reference is ignored");
    }
}
