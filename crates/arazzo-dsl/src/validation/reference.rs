use arazzo_expression::ast::{walk, Node};
use arazzo_expression::{parse_embedded, Expression, NamedRoot};
use serde_json::Value;
use std::collections::HashSet;

use crate::document::{
    ArazzoDocument, Criterion, FailureAction, OrReusable, Parameter, RequestBody, Step,
    SuccessAction, Workflow,
};
use crate::resolve::ReferenceResolver;
use crate::validation::{error_codes, ValidationError, Validator};

const SOURCE_PREFIX: &str = "$sourceDescriptions.";

/// Validates that references and runtime expressions point at things that exist
pub struct ReferenceValidator {}

impl ReferenceValidator {
    /// Create a new reference validator
    pub fn new() -> Self {
        ReferenceValidator {}
    }
}

impl Validator for ReferenceValidator {
    fn validate(&self, document: &ArazzoDocument) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for (w, workflow) in document.workflows.iter().enumerate() {
            WorkflowReferences::new(document, workflow, &mut errors).check(w);
        }
        errors
    }
}

/// Reference checks within one workflow, where `$steps` names its steps
struct WorkflowReferences<'a, 'e> {
    document: &'a ArazzoDocument,
    workflow: &'a Workflow,
    resolver: ReferenceResolver<'a>,
    step_ids: HashSet<&'a str>,
    errors: &'e mut Vec<ValidationError>,
}

impl<'a, 'e> WorkflowReferences<'a, 'e> {
    fn new(
        document: &'a ArazzoDocument,
        workflow: &'a Workflow,
        errors: &'e mut Vec<ValidationError>,
    ) -> Self {
        Self {
            document,
            workflow,
            resolver: ReferenceResolver::new(document),
            step_ids: workflow.steps.iter().map(|s| s.step_id.as_str()).collect(),
            errors,
        }
    }

    fn check(mut self, w: usize) {
        let workflow = self.workflow;
        let path = format!("workflows[{}]", w);

        self.check_parameters(&workflow.parameters, &path);
        self.check_success_actions(&workflow.success_actions, &format!("{}.successActions", path));
        self.check_failure_actions(&workflow.failure_actions, &format!("{}.failureActions", path));

        for (name, output) in &workflow.outputs {
            self.check_expression(output, &format!("{}.outputs.{}", path, name));
        }

        for (s, step) in workflow.steps.iter().enumerate() {
            self.check_step(step, &format!("{}.steps[{}]", path, s));
        }
    }

    fn check_step(&mut self, step: &'a Step, path: &str) {
        if let Some(workflow_id) = &step.workflow_id {
            self.check_workflow_target(workflow_id, path);
        }

        self.check_parameters(&step.parameters, path);
        if let Some(body) = &step.request_body {
            self.check_request_body(body, &format!("{}.requestBody", path));
        }
        for (c, criterion) in step.success_criteria.iter().enumerate() {
            self.check_criterion(criterion, &format!("{}.successCriteria[{}]", path, c));
        }
        self.check_success_actions(&step.on_success, &format!("{}.onSuccess", path));
        self.check_failure_actions(&step.on_failure, &format!("{}.onFailure", path));

        for (name, output) in &step.outputs {
            self.check_expression(output, &format!("{}.outputs.{}", path, name));
        }
    }

    fn check_parameters(&mut self, parameters: &[OrReusable<Parameter>], path: &str) {
        for (p, item) in parameters.iter().enumerate() {
            let path = format!("{}.parameters[{}]", path, p);
            match self.resolver.resolve_parameter(item) {
                Ok(parameter) => self.check_value(&parameter.value, &path),
                Err(err) => self.push(error_codes::INVALID_REFERENCE, err.to_string(), path),
            }
        }
    }

    fn check_success_actions(&mut self, actions: &[OrReusable<SuccessAction>], path: &str) {
        for (a, item) in actions.iter().enumerate() {
            let path = format!("{}[{}]", path, a);
            match self.resolver.resolve_success_action(item) {
                Ok(action) => {
                    self.check_action_target(
                        action.workflow_id.as_deref(),
                        action.step_id.as_deref(),
                        &path,
                    );
                    for (c, criterion) in action.criteria.iter().enumerate() {
                        self.check_criterion(criterion, &format!("{}.criteria[{}]", path, c));
                    }
                }
                Err(err) => self.push(error_codes::INVALID_REFERENCE, err.to_string(), path),
            }
        }
    }

    fn check_failure_actions(&mut self, actions: &[OrReusable<FailureAction>], path: &str) {
        for (a, item) in actions.iter().enumerate() {
            let path = format!("{}[{}]", path, a);
            match self.resolver.resolve_failure_action(item) {
                Ok(action) => {
                    self.check_action_target(
                        action.workflow_id.as_deref(),
                        action.step_id.as_deref(),
                        &path,
                    );
                    for (c, criterion) in action.criteria.iter().enumerate() {
                        self.check_criterion(criterion, &format!("{}.criteria[{}]", path, c));
                    }
                }
                Err(err) => self.push(error_codes::INVALID_REFERENCE, err.to_string(), path),
            }
        }
    }

    fn check_request_body(&mut self, body: &RequestBody, path: &str) {
        if let Some(payload) = &body.payload {
            self.check_value(payload, &format!("{}.payload", path));
        }
        for (r, replacement) in body.replacements.iter().enumerate() {
            self.check_value(&replacement.value, &format!("{}.replacements[{}]", path, r));
        }
    }

    fn check_criterion(&mut self, criterion: &Criterion, path: &str) {
        if let Some(context) = &criterion.context {
            self.check_expression(context, &format!("{}.context", path));
        }
    }

    fn check_action_target(
        &mut self,
        workflow_id: Option<&str>,
        step_id: Option<&str>,
        path: &str,
    ) {
        if let Some(step_id) = step_id {
            if !self.step_ids.contains(step_id) {
                self.push(
                    error_codes::INVALID_REFERENCE,
                    format!(
                        "Action targets unknown step '{}' in workflow '{}'",
                        step_id, self.workflow.workflow_id
                    ),
                    path,
                );
            }
        }
        if let Some(workflow_id) = workflow_id {
            self.check_workflow_target(workflow_id, path);
        }
    }

    /// Local workflow id or `$sourceDescriptions.<name>.<workflowId>`
    fn check_workflow_target(&mut self, workflow_id: &str, path: &str) {
        let known = match workflow_id.strip_prefix(SOURCE_PREFIX) {
            Some(rest) => {
                let source = rest.split('.').next().unwrap_or_default();
                self.document.source_description(source).is_some()
            }
            None => self.document.workflow(workflow_id).is_some(),
        };
        if !known {
            self.push(
                error_codes::INVALID_REFERENCE,
                format!("Reference to unknown workflow '{}'", workflow_id),
                path,
            );
        }
    }

    /// Strings written as `{$...}` must hold a valid expression
    fn check_value(&mut self, value: &Value, path: &str) {
        if let Value::String(text) = value {
            if text.starts_with("{$") && text.ends_with('}') {
                self.check_expression(text, path);
            }
        }
    }

    fn check_expression(&mut self, text: &str, path: &str) {
        match parse_embedded(text) {
            Ok(expression) => self.check_names(&expression, path),
            Err(err) => self.push(
                error_codes::INVALID_EXPRESSION,
                format!("Invalid runtime expression '{}': {}", text, err),
                path,
            ),
        }
    }

    fn check_names(&mut self, expression: &Expression, path: &str) {
        let mut missing = Vec::new();
        walk(expression, &mut |node| {
            if let Node::WithName(named) = node {
                if let Some(unknown) = self.missing_scope(named.value, &named.name.value) {
                    missing.push(unknown);
                }
            }
        });

        for (scope, name) in missing {
            self.push(
                error_codes::INVALID_REFERENCE,
                format!("Expression '{}' refers to unknown {} '{}'", expression, scope, name),
                path,
            );
        }
    }

    /// Scope and name when `name` does not resolve under `root`
    fn missing_scope(&self, root: NamedRoot, name: &str) -> Option<(&'static str, String)> {
        let head = name.split('.').next().unwrap_or_default();
        let components = self.document.components.as_ref();
        let (scope, exists) = match root {
            NamedRoot::Steps => ("step", self.step_ids.contains(head)),
            NamedRoot::Workflows => ("workflow", self.document.workflow(head).is_some()),
            NamedRoot::SourceDescriptions => (
                "source description",
                self.document.source_description(head).is_some(),
            ),
            NamedRoot::ComponentsInputs => (
                "component input",
                components.is_some_and(|c| has_key(name, |key| c.inputs.contains_key(key))),
            ),
            NamedRoot::ComponentsParameters => (
                "component parameter",
                components.is_some_and(|c| has_key(name, |key| c.parameters.contains_key(key))),
            ),
            NamedRoot::ComponentsSuccessActions => (
                "component success action",
                components
                    .is_some_and(|c| has_key(name, |key| c.success_actions.contains_key(key))),
            ),
            NamedRoot::ComponentsFailureActions => (
                "component failure action",
                components
                    .is_some_and(|c| has_key(name, |key| c.failure_actions.contains_key(key))),
            ),
            NamedRoot::Inputs | NamedRoot::Outputs | NamedRoot::Components => return None,
        };
        if exists {
            return None;
        }
        let reported = match root {
            NamedRoot::Steps | NamedRoot::Workflows | NamedRoot::SourceDescriptions => head,
            _ => name,
        };
        Some((scope, reported.to_string()))
    }

    fn push(&mut self, code: &'static str, message: String, path: impl Into<String>) {
        self.errors.push(ValidationError::new(code, message, path));
    }
}

/// Component keys may contain dots: the full name wins, then any dotted prefix of it
fn has_key(name: &str, contains: impl Fn(&str) -> bool) -> bool {
    contains(name) || name.match_indices('.').any(|(i, _)| contains(&name[..i]))
}
