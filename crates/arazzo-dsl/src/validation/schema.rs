use jsonschema::JSONSchema;
use serde_json::Value;
use tracing::warn;

use crate::document::{
    ArazzoDocument, Criterion, CriterionType, Extensions, FailureAction,
    OrReusable, Parameter, RequestBody, SuccessAction,
};
use crate::validation::{error_codes, ValidationError, Validator};

const INPUTS_REF_PREFIX: &str = "#/components/inputs/";
const JSONPATH_VERSIONS: &[&str] = &["draft-goessner-dispatch-jsonpath-00"];
const XPATH_VERSIONS: &[&str] = &["xpath-10", "xpath-20", "xpath-30"];

/// Compile a JSON Schema, reporting failures against `path`
pub fn compile_schema(schema: &Value, path: &str) -> Result<JSONSchema, ValidationError> {
    JSONSchema::compile(schema).map_err(|e| {
        ValidationError::new(
            error_codes::INVALID_SCHEMA,
            format!("Invalid JSON Schema: {}", e),
            path,
        )
    })
}

/// Validates schemas in the document:
/// - Workflow and component input schemas compile
/// - Criteria carry what their type needs
/// - Extension keys use the `x-` prefix
pub struct SchemaValidator {
    /// Report bad extension keys as errors instead of warnings
    strict_extensions: bool,
}

impl SchemaValidator {
    pub fn new(strict_extensions: bool) -> Self {
        Self { strict_extensions }
    }

    fn validate_input_schemas(&self, document: &ArazzoDocument) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let component_inputs = document.components.as_ref().map(|c| &c.inputs);

        for (w, workflow) in document.workflows.iter().enumerate() {
            let Some(schema) = &workflow.inputs else {
                continue;
            };
            let path = format!("workflows[{}].inputs", w);

            let reference = schema.get("$ref").and_then(Value::as_str);
            match reference.and_then(|r| r.strip_prefix(INPUTS_REF_PREFIX)) {
                Some(name) => {
                    if !component_inputs.is_some_and(|inputs| inputs.contains_key(name)) {
                        errors.push(ValidationError::new(
                            error_codes::INVALID_REFERENCE,
                            format!("Input schema refers to unknown component input '{}'", name),
                            path,
                        ));
                    }
                }
                None => {
                    if let Err(err) = compile_schema(schema, &path) {
                        errors.push(err);
                    }
                }
            }
        }

        for (name, schema) in component_inputs.into_iter().flatten() {
            if let Err(err) = compile_schema(schema, &format!("components.inputs.{}", name)) {
                errors.push(err);
            }
        }

        errors
    }

    fn validate_criteria(&self, document: &ArazzoDocument) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for (w, workflow) in document.workflows.iter().enumerate() {
            let path = format!("workflows[{}]", w);
            for (a, action) in inline(&workflow.success_actions) {
                let path = format!("{}.successActions[{}]", path, a);
                check_criteria(&mut errors, &action.criteria, &path);
            }
            for (a, action) in inline(&workflow.failure_actions) {
                let path = format!("{}.failureActions[{}]", path, a);
                check_criteria(&mut errors, &action.criteria, &path);
            }
            for (s, step) in workflow.steps.iter().enumerate() {
                let path = format!("{}.steps[{}]", path, s);
                for (c, criterion) in step.success_criteria.iter().enumerate() {
                    let path = format!("{}.successCriteria[{}]", path, c);
                    check_criterion(&mut errors, criterion, path);
                }
                for (a, action) in inline(&step.on_success) {
                    let path = format!("{}.onSuccess[{}]", path, a);
                    check_criteria(&mut errors, &action.criteria, &path);
                }
                for (a, action) in inline(&step.on_failure) {
                    let path = format!("{}.onFailure[{}]", path, a);
                    check_criteria(&mut errors, &action.criteria, &path);
                }
            }
        }

        if let Some(components) = &document.components {
            for (name, action) in &components.success_actions {
                let path = format!("components.successActions.{}", name);
                check_criteria(&mut errors, &action.criteria, &path);
            }
            for (name, action) in &components.failure_actions {
                let path = format!("components.failureActions.{}", name);
                check_criteria(&mut errors, &action.criteria, &path);
            }
        }

        errors
    }

    fn validate_extensions(&self, document: &ArazzoDocument) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for (path, extensions) in extension_maps(document) {
            for key in extensions.keys().filter(|k| !k.starts_with("x-")) {
                if self.strict_extensions {
                    errors.push(ValidationError::new(
                        error_codes::INVALID_EXTENSION,
                        format!("Unknown field '{}': extensions must start with 'x-'", key),
                        path.clone(),
                    ));
                } else {
                    warn!(field = %key, path = %path, "Ignoring unknown field");
                }
            }
        }

        errors
    }
}

impl Validator for SchemaValidator {
    fn validate(&self, document: &ArazzoDocument) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        errors.extend(self.validate_input_schemas(document));
        errors.extend(self.validate_criteria(document));
        errors.extend(self.validate_extensions(document));
        errors
    }
}

fn inline<T>(items: &[OrReusable<T>]) -> impl Iterator<Item = (usize, &T)> {
    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| item.as_object().map(|object| (i, object)))
}

fn check_criteria(errors: &mut Vec<ValidationError>, criteria: &[Criterion], path: &str) {
    for (c, criterion) in criteria.iter().enumerate() {
        check_criterion(errors, criterion, format!("{}.criteria[{}]", path, c));
    }
}

fn check_criterion(errors: &mut Vec<ValidationError>, criterion: &Criterion, path: String) {
    let kind = criterion.kind();

    if kind != CriterionType::Simple && criterion.context.is_none() {
        errors.push(ValidationError::new(
            error_codes::INVALID_CRITERION,
            format!("A {} criterion requires a context", kind.as_str()),
            path.clone(),
        ));
    }

    if kind == CriterionType::Regex {
        if let Err(e) = regex::Regex::new(&criterion.condition) {
            errors.push(ValidationError::new(
                error_codes::INVALID_CRITERION,
                format!("Invalid regex condition '{}': {}", criterion.condition, e),
                path.clone(),
            ));
        }
    }

    if let Some(version) = criterion.version() {
        let known = match kind {
            CriterionType::Jsonpath => JSONPATH_VERSIONS,
            _ => XPATH_VERSIONS,
        };
        if !known.contains(&version) {
            warn!(
                version = %version,
                language = %kind.as_str(),
                path = %path,
                "Unknown criterion expression version"
            );
        }
    }
}

/// Every extension map in the document with its path
fn extension_maps(document: &ArazzoDocument) -> Vec<(String, &Extensions)> {
    let mut maps = vec![
        ("$".to_string(), &document.extensions),
        ("info".to_string(), &document.info.extensions),
    ];

    for (i, source) in document.source_descriptions.iter().enumerate() {
        maps.push((format!("sourceDescriptions[{}]", i), &source.extensions));
    }

    for (w, workflow) in document.workflows.iter().enumerate() {
        let path = format!("workflows[{}]", w);
        maps.push((path.clone(), &workflow.extensions));
        parameter_maps(&mut maps, &workflow.parameters, &path);
        success_action_maps(
            &mut maps,
            &workflow.success_actions,
            &format!("{}.successActions", path),
        );
        failure_action_maps(
            &mut maps,
            &workflow.failure_actions,
            &format!("{}.failureActions", path),
        );

        for (s, step) in workflow.steps.iter().enumerate() {
            let path = format!("{}.steps[{}]", path, s);
            maps.push((path.clone(), &step.extensions));
            parameter_maps(&mut maps, &step.parameters, &path);
            if let Some(body) = &step.request_body {
                request_body_maps(&mut maps, body, &format!("{}.requestBody", path));
            }
            criteria_maps(&mut maps, &step.success_criteria, &format!("{}.successCriteria", path));
            success_action_maps(&mut maps, &step.on_success, &format!("{}.onSuccess", path));
            failure_action_maps(&mut maps, &step.on_failure, &format!("{}.onFailure", path));
        }
    }

    if let Some(components) = &document.components {
        maps.push(("components".to_string(), &components.extensions));
        for (name, parameter) in &components.parameters {
            maps.push((format!("components.parameters.{}", name), &parameter.extensions));
        }
        for (name, action) in &components.success_actions {
            let path = format!("components.successActions.{}", name);
            criteria_maps(&mut maps, &action.criteria, &format!("{}.criteria", path));
            maps.push((path, &action.extensions));
        }
        for (name, action) in &components.failure_actions {
            let path = format!("components.failureActions.{}", name);
            criteria_maps(&mut maps, &action.criteria, &format!("{}.criteria", path));
            maps.push((path, &action.extensions));
        }
    }

    maps
}

fn parameter_maps<'a>(
    maps: &mut Vec<(String, &'a Extensions)>,
    parameters: &'a [OrReusable<Parameter>],
    path: &str,
) {
    for (p, parameter) in inline(parameters) {
        maps.push((format!("{}.parameters[{}]", path, p), &parameter.extensions));
    }
}

fn success_action_maps<'a>(
    maps: &mut Vec<(String, &'a Extensions)>,
    actions: &'a [OrReusable<SuccessAction>],
    path: &str,
) {
    for (a, action) in inline(actions) {
        let path = format!("{}[{}]", path, a);
        criteria_maps(maps, &action.criteria, &format!("{}.criteria", path));
        maps.push((path, &action.extensions));
    }
}

fn failure_action_maps<'a>(
    maps: &mut Vec<(String, &'a Extensions)>,
    actions: &'a [OrReusable<FailureAction>],
    path: &str,
) {
    for (a, action) in inline(actions) {
        let path = format!("{}[{}]", path, a);
        criteria_maps(maps, &action.criteria, &format!("{}.criteria", path));
        maps.push((path, &action.extensions));
    }
}

fn criteria_maps<'a>(
    maps: &mut Vec<(String, &'a Extensions)>,
    criteria: &'a [Criterion],
    path: &str,
) {
    for (c, criterion) in criteria.iter().enumerate() {
        maps.push((format!("{}[{}]", path, c), &criterion.extensions));
    }
}

fn request_body_maps<'a>(
    maps: &mut Vec<(String, &'a Extensions)>,
    body: &'a RequestBody,
    path: &str,
) {
    maps.push((path.to_string(), &body.extensions));
    for (r, replacement) in body.replacements.iter().enumerate() {
        maps.push((format!("{}.replacements[{}]", path, r), &replacement.extensions));
    }
}
