use serde_json::{Map, Value};
use tracing::debug;

use crate::ast::{
    BodyRef, Exchange, Expression, ExpressionWithName, ExpressionWithSource, NamedRoot, SingleKind,
    Source,
};
use crate::error::EvaluationError;
use crate::resolver::context::ExecutionContext;

/// Evaluate an expression against `context`. The context is only read.
pub fn evaluate(
    expression: &Expression,
    context: &dyn ExecutionContext,
) -> Result<Value, EvaluationError> {
    debug!(expression = %expression, "Evaluating runtime expression");
    match expression {
        Expression::Single(e) => evaluate_single(e.value, context),
        Expression::WithSource(e) => evaluate_source(e, context),
        Expression::WithName(e) => evaluate_named(e, context),
    }
}

fn evaluate_single(
    kind: SingleKind,
    context: &dyn ExecutionContext,
) -> Result<Value, EvaluationError> {
    let value = match kind {
        SingleKind::Url => context.url().map(Value::from),
        SingleKind::Method => context.method().map(Value::from),
        SingleKind::StatusCode => context.status_code().map(Value::from),
    };
    value.ok_or(EvaluationError::MissingExchangeValue(kind.as_str()))
}

fn evaluate_source(
    expression: &ExpressionWithSource,
    context: &dyn ExecutionContext,
) -> Result<Value, EvaluationError> {
    let exchange = expression.value;
    match &expression.source {
        Source::Header(header) => {
            let name = header.token.value.as_str();
            context
                .headers(exchange)
                .and_then(|headers| {
                    headers
                        .iter()
                        .find(|(key, _)| key.eq_ignore_ascii_case(name))
                        .map(|(_, value)| Value::from(value.as_str()))
                })
                .ok_or_else(|| EvaluationError::MissingHeader {
                    exchange: exchange.label(),
                    name: name.to_string(),
                })
        }
        Source::Query(query) => context
            .query(exchange)
            .and_then(|params| params.get(&query.name.value))
            .cloned()
            .ok_or_else(|| EvaluationError::MissingParameter {
                location: "query",
                name: query.name.value.clone(),
            }),
        Source::Path(path) => context
            .path_parameters(exchange)
            .and_then(|params| params.get(&path.name.value))
            .cloned()
            .ok_or_else(|| EvaluationError::MissingParameter {
                location: "path",
                name: path.name.value.clone(),
            }),
        Source::Body(body) => evaluate_body(exchange, body, context),
    }
}

fn evaluate_body(
    exchange: Exchange,
    body: &BodyRef,
    context: &dyn ExecutionContext,
) -> Result<Value, EvaluationError> {
    let value = context
        .body(exchange)
        .ok_or(EvaluationError::MissingBody(exchange.label()))?;

    match &body.pointer {
        None => Ok(value.clone()),
        // serde_json implements RFC 6901, including the ~0 and ~1 escapes
        Some(pointer) => value
            .pointer(&pointer.value)
            .cloned()
            .ok_or_else(|| EvaluationError::PointerNotFound {
                exchange: exchange.label(),
                pointer: pointer.value.clone(),
            }),
    }
}

fn evaluate_named(
    expression: &ExpressionWithName,
    context: &dyn ExecutionContext,
) -> Result<Value, EvaluationError> {
    let name = expression.name.value.as_str();
    let not_found = |scope: &'static str| EvaluationError::NotFound {
        scope,
        name: name.to_string(),
    };

    match expression.value {
        NamedRoot::Inputs => lookup(context.inputs(), name)
            .cloned()
            .ok_or_else(|| not_found("workflow inputs")),
        NamedRoot::Outputs => lookup(context.outputs(), name)
            .cloned()
            .ok_or_else(|| not_found("workflow outputs")),
        NamedRoot::Steps => evaluate_step(name, context),
        NamedRoot::Workflows => evaluate_workflow(name, context),
        NamedRoot::SourceDescriptions => {
            let (id, rest) = split_head(name);
            find_in_document(context, "sourceDescriptions", "name", id)
                .and_then(|source| navigate(source, rest))
                .cloned()
                .ok_or_else(|| not_found("source descriptions"))
        }
        root => {
            let section = match root {
                NamedRoot::ComponentsInputs => "inputs.",
                NamedRoot::ComponentsParameters => "parameters.",
                NamedRoot::ComponentsSuccessActions => "successActions.",
                NamedRoot::ComponentsFailureActions => "failureActions.",
                _ => "",
            };
            context
                .document()
                .and_then(|document| document.get("components"))
                .and_then(|components| navigate(components, &format!("{}{}", section, name)))
                .cloned()
                .ok_or_else(|| not_found("components"))
        }
    }
}

fn evaluate_step(name: &str, context: &dyn ExecutionContext) -> Result<Value, EvaluationError> {
    let (step_id, rest) = split_head(name);
    let outputs = context
        .step_outputs(step_id)
        .ok_or_else(|| EvaluationError::StepNotExecuted(step_id.to_string()))?;

    match rest.split_once('.') {
        None if rest == "outputs" => Ok(Value::Object(outputs.clone())),
        Some(("outputs", output)) => {
            lookup(outputs, output)
                .cloned()
                .ok_or_else(|| EvaluationError::NotFound {
                    scope: "step outputs",
                    name: name.to_string(),
                })
        }
        _ => Err(EvaluationError::UnsupportedPath {
            root: "$steps.",
            path: name.to_string(),
        }),
    }
}

fn evaluate_workflow(name: &str, context: &dyn ExecutionContext) -> Result<Value, EvaluationError> {
    let (workflow_id, rest) = split_head(name);

    // Outputs only exist once the workflow has run; the document holds their expressions
    if rest == "outputs" || rest.starts_with("outputs.") {
        let recorded = context
            .workflow_outputs(workflow_id)
            .ok_or_else(|| EvaluationError::WorkflowNotExecuted(workflow_id.to_string()))?;
        return match rest.split_once('.') {
            None => Ok(Value::Object(recorded.clone())),
            Some((_, output)) => lookup(recorded, output).cloned().ok_or_else(|| {
                EvaluationError::NotFound {
                    scope: "workflow outputs",
                    name: name.to_string(),
                }
            }),
        };
    }

    find_in_document(context, "workflows", "workflowId", workflow_id)
        .and_then(|workflow| navigate(workflow, rest))
        .cloned()
        .ok_or_else(|| EvaluationError::NotFound {
            scope: "workflows",
            name: name.to_string(),
        })
}

/// Find the element of `document.<list>` whose `key` equals `id`
fn find_in_document<'a>(
    context: &'a dyn ExecutionContext,
    list: &str,
    key: &str,
    id: &str,
) -> Option<&'a Value> {
    context
        .document()?
        .get(list)?
        .as_array()?
        .iter()
        .find(|item| item.get(key).and_then(Value::as_str) == Some(id))
}

fn split_head(name: &str) -> (&str, &str) {
    name.split_once('.').unwrap_or((name, ""))
}

/// Resolve a dotted path in a map. Keys that themselves contain dots win over nesting.
fn lookup<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    if let Some(value) = map.get(path) {
        return Some(value);
    }
    path.match_indices('.').find_map(|(i, _)| {
        map.get(&path[..i])
            .and_then(|child| navigate(child, &path[i + 1..]))
    })
}

fn navigate<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    match value {
        Value::Object(map) => lookup(map, path),
        Value::Array(items) => {
            let (head, rest) = split_head(path);
            let index: usize = head.parse().ok()?;
            navigate(items.get(index)?, rest)
        }
        _ => None,
    }
}
