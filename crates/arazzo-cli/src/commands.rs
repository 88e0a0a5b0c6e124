use anyhow::{bail, Context, Result};
use arazzo_dsl::validation::validate_document_with;
use arazzo_dsl::{
    parse_document, parse_json_document, ArazzoDocument, ValidationOptions, WorkflowGraph,
};
use arazzo_expression::printer::stringify;
use arazzo_expression::{evaluate, parse_embedded, RuntimeContext};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

fn read_document(path: &Path) -> Result<ArazzoDocument> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    let is_json = path.extension().is_some_and(|ext| ext == "json");
    let document = if is_json {
        parse_json_document(&text)
    } else {
        parse_document(&text)
    }
    .with_context(|| format!("Failed to parse '{}'", path.display()))?;
    debug!(path = %path.display(), "Read document");
    Ok(document)
}

/// Validate, then build the graph. Validation problems are all written to `out`.
fn load_graph(
    path: &Path,
    options: &ValidationOptions,
    out: &mut dyn Write,
) -> Result<WorkflowGraph> {
    let document = read_document(path)?;

    if let Err(err) = validate_document_with(&document, options) {
        let errors = err.validation_errors();
        if errors.is_empty() {
            return Err(err.into());
        }
        for error in errors {
            writeln!(out, "  {}", error)?;
        }
        bail!("'{}' has {} validation error(s)", path.display(), errors.len());
    }

    WorkflowGraph::build(&document)
        .with_context(|| format!("Failed to build workflow graph for '{}'", path.display()))
}

pub fn validate(path: &Path, options: &ValidationOptions, out: &mut dyn Write) -> Result<()> {
    let graph = load_graph(path, options, out)?;
    let steps: usize = graph.workflows().iter().map(|w| w.steps.len()).sum();

    info!(path = %path.display(), workflows = graph.workflows().len(), steps, "Document is valid");
    writeln!(
        out,
        "{} is valid: {} workflow(s), {} step(s)",
        path.display(),
        graph.workflows().len(),
        steps
    )?;
    Ok(())
}

/// Workflows in dependency order with each step's target and effective parameters
pub fn plan(path: &Path, options: &ValidationOptions, out: &mut dyn Write) -> Result<()> {
    let graph = load_graph(path, options, out)?;

    for (position, workflow) in graph.topological_order().into_iter().enumerate() {
        let mut dependencies: Vec<&str> = graph
            .dependencies(workflow)
            .iter()
            .map(|w| w.id.as_str())
            .collect();
        dependencies.extend(workflow.external_dependencies.iter().map(String::as_str));

        if dependencies.is_empty() {
            writeln!(out, "{}. {}", position + 1, workflow.id)?;
        } else {
            writeln!(out, "{}. {} (after {})", position + 1, workflow.id, dependencies.join(", "))?;
        }

        for step in &workflow.steps {
            writeln!(out, "   - {}: {}", step.id, step.target)?;
            for parameter in &step.parameters {
                let location = parameter.location.map(|location| location.to_string());
                writeln!(
                    out,
                    "       {} ({}) = {}",
                    parameter.name,
                    location.as_deref().unwrap_or("workflow input"),
                    parameter.value
                )?;
            }
        }
    }
    Ok(())
}

/// Print the parenthesised tree of `expression`, then its value when a context file is given
pub fn eval(expression: &str, context: Option<&Path>, out: &mut dyn Write) -> Result<()> {
    let parsed = parse_embedded(expression)
        .with_context(|| format!("Invalid runtime expression '{}'", expression))?;
    writeln!(out, "{}", stringify(&parsed))?;

    if let Some(path) = context {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read '{}'", path.display()))?;
        let context: RuntimeContext = serde_json::from_str(&text)
            .with_context(|| format!("Invalid execution context in '{}'", path.display()))?;
        let value = evaluate(&parsed, &context)
            .with_context(|| format!("Failed to evaluate '{}'", expression))?;
        writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    fn create_test_file(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const DOCUMENT: &str = r#"
arazzo: 1.0.1
info:
  title: Pets
  version: 1.0.0
workflows:
  - workflowId: adopt
    dependsOn: [login]
    parameters:
      - name: token
        in: header
        value: $workflows.login.outputs.token
    steps:
      - stepId: find
        operationId: findPets
  - workflowId: login
    steps:
      - stepId: auth
        operationId: login
"#;

    fn run(command: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> (Result<()>, String) {
        let mut out = Vec::new();
        let result = command(&mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_validate_valid_document() {
        let file = create_test_file(".yaml", DOCUMENT);
        let (result, output) = run(|out| validate(file.path(), &ValidationOptions::default(), out));
        assert!(result.is_ok(), "{:?}", result);
        assert!(output.contains("is valid: 2 workflow(s), 2 step(s)"), "Output: {}", output);
    }

    #[test]
    fn test_validate_lists_every_error() {
        let broken = DOCUMENT.replace("dependsOn: [login]", "dependsOn: [ghost]").replace(
            "operationId: findPets",
            "operationId: findPets\n        workflowId: login",
        );
        let file = create_test_file(".yaml", &broken);
        let (result, output) = run(|out| validate(file.path(), &ValidationOptions::default(), out));

        let err = result.unwrap_err();
        assert!(err.to_string().contains("2 validation error(s)"), "Error: {}", err);
        assert!(output.contains("ERR_DSL_VALIDATION_INVALID_STEP_TARGET"), "Output: {}", output);
        assert!(output.contains("ERR_DSL_VALIDATION_INVALID_REFERENCE"), "Output: {}", output);
    }

    #[test]
    fn test_plan() {
        let file = create_test_file(".yaml", DOCUMENT);
        let (result, output) = run(|out| plan(file.path(), &ValidationOptions::default(), out));
        assert!(result.is_ok(), "{:?}", result);
        assert_eq!(
            output,
            "1. login\n\
             \x20  - auth: operationId login\n\
             2. adopt (after login)\n\
             \x20  - find: operationId findPets\n\
             \x20      token (header) = \"$workflows.login.outputs.token\"\n"
        );
    }

    #[test]
    fn test_eval() {
        let context = create_test_file(
            ".json",
            r#"{"statusCode": 200, "response": {"headers": {"Content-Type": "application/json"}}}"#,
        );
        let expression = "$response.header.content-type";
        let (result, output) = run(|out| eval(expression, Some(context.path()), out));
        assert!(result.is_ok(), "{:?}", result);
        assert_eq!(output, "($response. (header. content-type))\n\"application/json\"\n");

        let (result, _) = run(|out| eval("$request.header", None, out));
        assert!(result.is_err());
    }
}
