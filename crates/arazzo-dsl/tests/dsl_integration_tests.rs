use arazzo_dsl::document::ParameterLocation;
use arazzo_dsl::validation::error_codes;
use arazzo_dsl::{
    load_workflow_graph, parse_and_validate_document, parse_and_validate_document_with,
    parse_document, ActionTarget, CriteriaEngine, Directive, DslError, InMemoryCatalog,
    Operation, ValidationOptions, WorkflowGraph,
};
use arazzo_expression::{HttpMessage, RuntimeContext};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

// Helper function to check for an error code anywhere in an error
fn error_contains(err: &DslError, expected_code: &str) -> bool {
    err.error_code() == expected_code
        || err.validation_errors().iter().any(|e| e.code == expected_code)
}

fn build_graph(yaml: &str) -> Result<WorkflowGraph, DslError> {
    WorkflowGraph::build(&parse_document(yaml)?)
}

const PET_ADOPTION: &str = r#"
arazzo: 1.0.1
info:
  title: Pet adoption
  version: 1.0.0
sourceDescriptions:
  - name: petstore
    url: https://example.com/petstore.yaml
    type: openapi
workflows:
  - workflowId: login
    inputs:
      type: object
      required: [username]
      properties:
        username:
          type: string
    steps:
      - stepId: auth
        operationId: loginUser
        parameters:
          - name: username
            in: query
            value: $inputs.username
        successCriteria:
          - condition: $statusCode == 200
        outputs:
          token: $response.body#/token
    outputs:
      token: $steps.auth.outputs.token
  - workflowId: adopt
    dependsOn: [login]
    parameters:
      - reference: $components.parameters.auth
      - name: limit
        in: query
        value: 10
    failureActions:
      - reference: $components.failureActions.retryLater
    steps:
      - stepId: find
        operationId: findPets
        parameters:
          - reference: $components.parameters.limit
            value: 25
        successCriteria:
          - condition: $statusCode == 200
        onSuccess:
          - name: nothingFound
            type: end
            criteria:
              - context: $response.body
                condition: "^\\[\\]$"
                type: regex
      - stepId: buy
        operationPath: "{$sourceDescriptions.petstore.url}#/paths/~1orders/post"
        requestBody:
          contentType: application/json
          payload:
            petId: 0
          replacements:
            - target: /petId
              value: $steps.find.outputs.petId
        successCriteria:
          - condition: $statusCode == 201
components:
  parameters:
    auth:
      name: Authorization
      in: header
      value: "{$workflows.login.outputs.token}"
    limit:
      name: limit
      in: query
      value: 5
  failureActions:
    retryLater:
      name: retryLater
      type: retry
      stepId: find
      retryAfter: 2
      retryLimit: 3
      criteria:
        - condition: $statusCode == 503
"#;

#[test]
fn test_load_pet_adoption() {
    let graph = load_workflow_graph(PET_ADOPTION).unwrap();

    let order: Vec<&str> = graph.topological_order().iter().map(|w| w.id.as_str()).collect();
    assert_eq!(order, vec!["login", "adopt"]);

    let find = graph.step("adopt", "find").unwrap();
    let parameters: Vec<(&str, &Value)> = find
        .parameters
        .iter()
        .map(|p| (p.name.as_str(), &p.value))
        .collect();
    assert_eq!(
        parameters,
        vec![
            ("Authorization", &json!("{$workflows.login.outputs.token}")),
            ("limit", &json!(25)),
        ],
        "The step's limit overrides the workflow's in place"
    );
    assert_eq!(find.parameters[1].location, Some(ParameterLocation::Query));
    assert_eq!(find.on_failure.len(), 1);
    assert_eq!(graph.parent(find).id, "adopt");
}

#[test]
fn test_directives_end_to_end() {
    let mut graph = load_workflow_graph(PET_ADOPTION).unwrap();

    let mut catalog = InMemoryCatalog::new();
    for (id, path) in [("loginUser", "/login"), ("findPets", "/pets")] {
        catalog.register(Operation {
            source: "petstore".to_string(),
            operation_id: Some(id.to_string()),
            method: "get".to_string(),
            path: path.to_string(),
        });
    }
    catalog.register_path(
        "{$sourceDescriptions.petstore.url}#/paths/~1orders/post",
        Operation {
            source: "petstore".to_string(),
            operation_id: None,
            method: "post".to_string(),
            path: "/orders".to_string(),
        },
    );
    graph.bind_operations(&catalog).unwrap();

    let engine = CriteriaEngine::new();
    let find = graph.step("adopt", "find").unwrap();
    assert_eq!(find.operation.as_ref().map(|o| o.path.as_str()), Some("/pets"));

    let empty = HttpMessage {
        body: Some(json!([])),
        ..Default::default()
    };
    let context = RuntimeContext::new().with_response(200, empty);
    assert_eq!(find.next_directive(&engine, &context).unwrap(), Directive::End);

    let some = HttpMessage {
        body: Some(json!([{"id": 1}])),
        ..Default::default()
    };
    let context = RuntimeContext::new().with_response(200, some);
    assert_eq!(find.next_directive(&engine, &context).unwrap(), Directive::Continue);

    let context = RuntimeContext::new().with_response(503, HttpMessage::default());
    match find.next_directive(&engine, &context).unwrap() {
        Directive::Retry { delay, limit, target } => {
            assert_eq!(delay.as_secs(), 2);
            assert_eq!(limit, 3);
            assert_eq!(target, ActionTarget::Step("find".to_string()));
        }
        other => panic!("Expected Retry, got {:?}", other),
    }

    let context = RuntimeContext::new().with_response(400, HttpMessage::default());
    assert_eq!(find.next_directive(&engine, &context).unwrap(), Directive::Fail);
}

#[test]
fn test_validate_inputs() {
    let graph = load_workflow_graph(PET_ADOPTION).unwrap();
    assert!(graph.validate_inputs("login", &json!({"username": "alice"})).is_ok());

    let err = graph.validate_inputs("login", &json!({})).unwrap_err();
    assert!(error_contains(&err, error_codes::INVALID_INPUT), "Got {:?}", err);
}

#[test]
fn test_json_document() {
    let json = json!({
        "arazzo": "1.0.0",
        "info": {"title": "JSON", "version": "1"},
        "workflows": [{
            "workflowId": "ping",
            "steps": [{"stepId": "call", "operationId": "ping"}]
        }]
    });
    let document = arazzo_dsl::parse_json_document(&json.to_string()).unwrap();
    let graph = WorkflowGraph::build(&document).unwrap();
    assert!(graph.step("ping", "call").is_some());
}

#[test]
fn test_duplicate_parameters_fail_graph_build() {
    let yaml = r#"
arazzo: 1.0.0
info:
  title: Dup
  version: "1"
workflows:
  - workflowId: w
    steps:
      - stepId: s
        operationId: op
        parameters:
          - name: id
            in: query
            value: 1
          - name: id
            in: query
            value: 2
"#;

    match build_graph(yaml).unwrap_err() {
        DslError::DuplicateDefinition { kind, identity, .. } => {
            assert_eq!(kind, "parameter");
            assert_eq!(identity, "id (query)");
        }
        err => panic!("Expected DuplicateDefinition, got {:?}", err),
    }

    let err = parse_and_validate_document(yaml).unwrap_err();
    assert!(error_contains(&err, error_codes::DUPLICATE_ID));
}

#[test]
fn test_cycle_names_both_workflows() {
    let yaml = r#"
arazzo: 1.0.0
info:
  title: Cycle
  version: "1"
workflows:
  - workflowId: A
    dependsOn: [B]
    steps: []
  - workflowId: B
    dependsOn: [A]
    steps: []
"#;

    match build_graph(yaml).unwrap_err() {
        DslError::CircularDependency(cycle) => {
            assert!(cycle.contains(&"A".to_string()));
            assert!(cycle.contains(&"B".to_string()));
        }
        err => panic!("Expected CircularDependency, got {:?}", err),
    }
}

#[test]
fn test_unresolved_dependency() {
    let yaml = r#"
arazzo: 1.0.0
info:
  title: Missing
  version: "1"
workflows:
  - workflowId: A
    dependsOn: [ghost]
    steps: []
"#;

    match build_graph(yaml).unwrap_err() {
        DslError::UnresolvedDependency { workflow_id, dependency } => {
            assert_eq!(workflow_id, "A");
            assert_eq!(dependency, "ghost");
        }
        err => panic!("Expected UnresolvedDependency, got {:?}", err),
    }
}

#[test]
fn test_step_target_errors() {
    let yaml = r#"
arazzo: 1.0.0
info:
  title: Targets
  version: "1"
workflows:
  - workflowId: w
    steps:
      - stepId: twoTargets
        operationId: op
        operationPath: "{$sourceDescriptions.api.url}#/paths/~1x/get"
"#;

    match build_graph(yaml).unwrap_err() {
        DslError::InvalidStepTarget { step_id, found, .. } => {
            assert_eq!(step_id, "twoTargets");
            assert_eq!(found, 2);
        }
        err => panic!("Expected InvalidStepTarget, got {:?}", err),
    }
}

#[test]
fn test_strict_extensions() {
    let yaml = r#"
arazzo: 1.0.0
info:
  title: Extensions
  version: "1"
  x-team: pets
workflows:
  - workflowId: w
    retries: 3
    steps: []
"#;

    assert!(parse_and_validate_document(yaml).is_ok());

    let strict = ValidationOptions {
        strict_extensions: true,
    };
    let err = parse_and_validate_document_with(yaml, &strict).unwrap_err();
    assert!(error_contains(&err, error_codes::INVALID_EXTENSION));
}

#[test]
fn test_all_validation_errors_are_collected() {
    let yaml = r#"
arazzo: 1.0.0
info:
  title: Many problems
  version: "1"
workflows:
  - workflowId: w
    outputs:
      result: $steps.nowhere.outputs.x
    steps:
      - stepId: s
        operationId: op
        parameters:
          - reference: $components.parameters.missing
        onFailure:
          - name: again
            type: retry
"#;

    let err = parse_and_validate_document(yaml).unwrap_err();
    let codes: Vec<&str> = err.validation_errors().iter().map(|e| e.code).collect();
    assert_eq!(
        codes,
        vec![
            error_codes::INVALID_ACTION,
            error_codes::INVALID_REFERENCE,
            error_codes::INVALID_REFERENCE,
        ]
    );
}
