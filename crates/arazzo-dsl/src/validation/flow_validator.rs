use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

use crate::document::{
    ArazzoDocument, FailureAction, FailureActionType, OrReusable, SuccessAction,
    SuccessActionType,
};
use crate::graph::DependencyGraph;
use crate::resolve::{duplicates, ReferenceResolver, Scoped};
use crate::validation::{error_codes, ValidationError, Validator};

lazy_static! {
    static ref ID_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_\-]+$").unwrap();
    static ref COMPONENT_KEY_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9.\-_]+$").unwrap();
}

const SOURCE_PREFIX: &str = "$sourceDescriptions.";

/// Validates ids, uniqueness, step targets, action invariants and workflow dependencies
pub struct FlowValidator {}

impl FlowValidator {
    /// Create a new flow validator
    pub fn new() -> Self {
        FlowValidator {}
    }

    fn validate_ids(&self, document: &ArazzoDocument) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for (w, workflow) in document.workflows.iter().enumerate() {
            if !ID_REGEX.is_match(&workflow.workflow_id) {
                errors.push(ValidationError::new(
                    error_codes::INVALID_ID,
                    format!(
                        "Invalid workflowId '{}': only letters, digits, '_' and '-' are allowed",
                        workflow.workflow_id
                    ),
                    format!("workflows[{}].workflowId", w),
                ));
            }
            for (s, step) in workflow.steps.iter().enumerate() {
                if !ID_REGEX.is_match(&step.step_id) {
                    errors.push(ValidationError::new(
                        error_codes::INVALID_ID,
                        format!(
                            "Invalid stepId '{}': only letters, digits, '_' and '-' are allowed",
                            step.step_id
                        ),
                        format!("workflows[{}].steps[{}].stepId", w, s),
                    ));
                }
            }
        }

        if let Some(components) = &document.components {
            let keys = components
                .inputs
                .keys()
                .map(|k| ("inputs", k))
                .chain(components.parameters.keys().map(|k| ("parameters", k)))
                .chain(components.success_actions.keys().map(|k| ("successActions", k)))
                .chain(components.failure_actions.keys().map(|k| ("failureActions", k)));
            for (section, key) in keys {
                if !COMPONENT_KEY_REGEX.is_match(key) {
                    errors.push(ValidationError::new(
                        error_codes::INVALID_ID,
                        format!("Invalid component key '{}'", key),
                        format!("components.{}", section),
                    ));
                }
            }
        }

        errors
    }

    /// Workflow ids are unique in the document, step ids within their workflow
    fn validate_unique_ids(&self, document: &ArazzoDocument) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        let workflow_ids = document.workflows.iter().map(|w| w.workflow_id.as_str());
        for duplicate in find_duplicates(workflow_ids) {
            errors.push(ValidationError::new(
                error_codes::DUPLICATE_ID,
                format!(
                    "Duplicate workflow ID: '{}' - workflow IDs must be unique within a document",
                    duplicate
                ),
                "workflows",
            ));
        }

        for (w, workflow) in document.workflows.iter().enumerate() {
            for duplicate in find_duplicates(workflow.steps.iter().map(|s| s.step_id.as_str())) {
                errors.push(ValidationError::new(
                    error_codes::DUPLICATE_ID,
                    format!(
                        "Duplicate step ID: '{}' - step IDs must be unique within a workflow",
                        duplicate
                    ),
                    format!("workflows[{}].steps", w),
                ));
            }
        }

        errors
    }

    fn validate_step_targets(&self, document: &ArazzoDocument) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for (w, workflow) in document.workflows.iter().enumerate() {
            for (s, step) in workflow.steps.iter().enumerate() {
                let count = step.targets().len();
                if count != 1 {
                    errors.push(ValidationError::new(
                        error_codes::INVALID_STEP_TARGET,
                        format!(
                            "Step '{}' must set exactly one of operationId, operationPath and \
                             workflowId, found {}",
                            step.step_id, count
                        ),
                        format!("workflows[{}].steps[{}]", w, s),
                    ));
                }
            }
        }

        errors
    }

    /// Parameter and action identities are unique within each scope
    fn validate_scopes(&self, document: &ArazzoDocument) -> Vec<ValidationError> {
        let resolver = ReferenceResolver::new(document);
        let mut errors = Vec::new();

        for (w, workflow) in document.workflows.iter().enumerate() {
            let path = format!("workflows[{}]", w);
            scope_duplicates(
                &mut errors,
                &path,
                &resolve_all(&workflow.parameters, |p| resolver.resolve_parameter(p).ok()),
            );
            scope_duplicates(
                &mut errors,
                &path,
                &resolve_all(&workflow.success_actions, |a| {
                    resolver.resolve_success_action(a).ok()
                }),
            );
            scope_duplicates(
                &mut errors,
                &path,
                &resolve_all(&workflow.failure_actions, |a| {
                    resolver.resolve_failure_action(a).ok()
                }),
            );

            for (s, step) in workflow.steps.iter().enumerate() {
                let path = format!("workflows[{}].steps[{}]", w, s);
                scope_duplicates(
                    &mut errors,
                    &path,
                    &resolve_all(&step.parameters, |p| resolver.resolve_parameter(p).ok()),
                );
                scope_duplicates(
                    &mut errors,
                    &path,
                    &resolve_all(&step.on_success, |a| resolver.resolve_success_action(a).ok()),
                );
                scope_duplicates(
                    &mut errors,
                    &path,
                    &resolve_all(&step.on_failure, |a| resolver.resolve_failure_action(a).ok()),
                );
            }
        }

        errors
    }

    /// Inline and component actions have the targets their type requires
    fn validate_actions(&self, document: &ArazzoDocument) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for (w, workflow) in document.workflows.iter().enumerate() {
            let path = format!("workflows[{}]", w);
            for (a, action) in inline(&workflow.success_actions) {
                let path = format!("{}.successActions[{}]", path, a);
                check_success_action(&mut errors, action, path);
            }
            for (a, action) in inline(&workflow.failure_actions) {
                let path = format!("{}.failureActions[{}]", path, a);
                check_failure_action(&mut errors, action, path);
            }
            for (s, step) in workflow.steps.iter().enumerate() {
                let path = format!("{}.steps[{}]", path, s);
                for (a, action) in inline(&step.on_success) {
                    check_success_action(&mut errors, action, format!("{}.onSuccess[{}]", path, a));
                }
                for (a, action) in inline(&step.on_failure) {
                    check_failure_action(&mut errors, action, format!("{}.onFailure[{}]", path, a));
                }
            }
        }

        if let Some(components) = &document.components {
            for (name, action) in &components.success_actions {
                let path = format!("components.successActions.{}", name);
                check_success_action(&mut errors, action, path);
            }
            for (name, action) in &components.failure_actions {
                let path = format!("components.failureActions.{}", name);
                check_failure_action(&mut errors, action, path);
            }
        }

        errors
    }

    /// dependsOn names existing workflows and has no cycle
    fn validate_dependencies(&self, document: &ArazzoDocument) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let ids: Vec<&str> = document
            .workflows
            .iter()
            .map(|w| w.workflow_id.as_str())
            .collect();
        let mut graph = DependencyGraph::new(ids.clone());

        for (w, workflow) in document.workflows.iter().enumerate() {
            for dependency in &workflow.depends_on {
                if let Some(rest) = dependency.strip_prefix(SOURCE_PREFIX) {
                    let source = rest.split('.').next().unwrap_or_default();
                    if document.source_description(source).is_none() {
                        errors.push(ValidationError::new(
                            error_codes::INVALID_REFERENCE,
                            format!(
                                "Workflow '{}' depends on '{}' from unknown source \
                                 description '{}'",
                                workflow.workflow_id, dependency, source
                            ),
                            format!("workflows[{}].dependsOn", w),
                        ));
                    }
                    continue;
                }
                match ids.iter().position(|id| id == dependency) {
                    Some(target) => graph.add_edge(w, target),
                    None => errors.push(ValidationError::new(
                        error_codes::INVALID_REFERENCE,
                        format!(
                            "Workflow '{}' depends on unknown workflow '{}'",
                            workflow.workflow_id, dependency
                        ),
                        format!("workflows[{}].dependsOn", w),
                    )),
                }
            }
        }

        for cycle in graph.find_cycles() {
            errors.push(ValidationError::new(
                error_codes::CIRCULAR_DEPENDENCY,
                format!("Circular dependency detected in workflow chain: {}", cycle.join(" → ")),
                "workflows",
            ));
        }

        errors
    }
}

impl Validator for FlowValidator {
    fn validate(&self, document: &ArazzoDocument) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        errors.extend(self.validate_ids(document));
        errors.extend(self.validate_unique_ids(document));
        errors.extend(self.validate_step_targets(document));
        errors.extend(self.validate_scopes(document));
        errors.extend(self.validate_actions(document));
        errors.extend(self.validate_dependencies(document));
        errors
    }
}

fn find_duplicates<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for id in ids {
        if !seen.insert(id) && !duplicates.contains(&id) {
            duplicates.push(id);
        }
    }
    duplicates
}

/// Resolvable entries only; unresolvable references are reported by the reference validator
fn resolve_all<T, U>(items: &[T], resolve: impl Fn(&T) -> Option<U>) -> Vec<U> {
    items.iter().filter_map(resolve).collect()
}

fn scope_duplicates<T: Scoped>(errors: &mut Vec<ValidationError>, path: &str, entries: &[T]) {
    for identity in duplicates(entries) {
        errors.push(ValidationError::new(
            error_codes::DUPLICATE_ID,
            format!("Duplicate {} '{}' in the same scope", T::KIND, identity),
            path,
        ));
    }
}

fn inline<T>(items: &[OrReusable<T>]) -> impl Iterator<Item = (usize, &T)> {
    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| item.as_object().map(|object| (i, object)))
}

fn check_success_action(errors: &mut Vec<ValidationError>, action: &SuccessAction, path: String) {
    if action.action_type == SuccessActionType::Goto
        && action.workflow_id.is_some() == action.step_id.is_some()
    {
        errors.push(ValidationError::new(
            error_codes::INVALID_ACTION,
            format!(
                "Success action '{}' of type goto must set exactly one of workflowId and stepId",
                action.name
            ),
            path,
        ));
    }
}

fn check_failure_action(errors: &mut Vec<ValidationError>, action: &FailureAction, path: String) {
    if matches!(action.action_type, FailureActionType::Goto | FailureActionType::Retry)
        && action.workflow_id.is_some() == action.step_id.is_some()
    {
        errors.push(ValidationError::new(
            error_codes::INVALID_ACTION,
            format!(
                "Failure action '{}' must set exactly one of workflowId and stepId",
                action.name
            ),
            path.clone(),
        ));
    }
    if action.action_type == FailureActionType::Retry {
        if action.retry_limit.is_some_and(|limit| limit < 0) {
            errors.push(ValidationError::new(
                error_codes::INVALID_ACTION,
                format!("Failure action '{}' has a negative retryLimit", action.name),
                path.clone(),
            ));
        }
        if action.retry_delay.is_some_and(|delay| !delay.is_finite() || delay < 0.0) {
            errors.push(ValidationError::new(
                error_codes::INVALID_ACTION,
                format!("Failure action '{}' must have a non-negative retryDelay", action.name),
                path,
            ));
        }
    }
}
