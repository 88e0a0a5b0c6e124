use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::document::{ArazzoDocument, Step, StepTarget, Workflow};
use crate::error::DslError;
use crate::resolve::{ensure_unique, merge, ReferenceResolver};

use super::dependency::DependencyGraph;
use super::node::{StepNode, WorkflowNode};
use super::WorkflowGraph;

const SOURCE_PREFIX: &str = "$sourceDescriptions.";
const INPUTS_REF_PREFIX: &str = "#/components/inputs/";

/// Builds a [`WorkflowGraph`] from a parsed document in one pass.
///
/// The document is only read. Any integrity error discards everything built so far.
pub struct GraphBuilder<'a> {
    document: &'a ArazzoDocument,
    resolver: ReferenceResolver<'a>,
    index: HashMap<&'a str, usize>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(document: &'a ArazzoDocument) -> Self {
        Self {
            document,
            resolver: ReferenceResolver::new(document),
            index: HashMap::with_capacity(document.workflows.len()),
        }
    }

    pub fn build(mut self) -> Result<WorkflowGraph, DslError> {
        for (i, workflow) in self.document.workflows.iter().enumerate() {
            if self.index.insert(workflow.workflow_id.as_str(), i).is_some() {
                return Err(DslError::DuplicateDefinition {
                    kind: "workflow",
                    identity: workflow.workflow_id.clone(),
                    scope: "document".to_string(),
                });
            }
        }

        let mut dependencies = DependencyGraph::new(
            self.document
                .workflows
                .iter()
                .map(|w| w.workflow_id.as_str())
                .collect(),
        );

        let mut workflows = Vec::with_capacity(self.document.workflows.len());
        for (i, workflow) in self.document.workflows.iter().enumerate() {
            let node = self.build_workflow(i, workflow)?;
            for &dependency in &node.dependencies {
                dependencies.add_edge(i, dependency);
            }
            workflows.push(node);
        }

        let order = dependencies
            .topological_order()
            .map_err(DslError::CircularDependency)?;

        info!(
            workflows = workflows.len(),
            steps = workflows.iter().map(|w| w.steps.len()).sum::<usize>(),
            "Built workflow graph"
        );

        let index = self
            .index
            .into_iter()
            .map(|(id, i)| (id.to_string(), i))
            .collect();

        Ok(WorkflowGraph::from_parts(workflows, index, order))
    }

    fn build_workflow(&self, index: usize, workflow: &Workflow) -> Result<WorkflowNode, DslError> {
        let scope = format!("workflow '{}'", workflow.workflow_id);

        let parameters = self.resolver.resolve_parameters(&workflow.parameters)?;
        ensure_unique(&parameters, &scope)?;
        let success_actions = self.resolver.resolve_success_actions(&workflow.success_actions)?;
        ensure_unique(&success_actions, &scope)?;
        let failure_actions = self.resolver.resolve_failure_actions(&workflow.failure_actions)?;
        ensure_unique(&failure_actions, &scope)?;

        let (local, external) = self.resolve_dependencies(workflow)?;

        let mut node = WorkflowNode {
            id: workflow.workflow_id.clone(),
            index,
            dependencies: local,
            external_dependencies: external,
            inputs: self.resolve_input_schema(workflow.inputs.as_ref())?,
            parameters,
            success_actions,
            failure_actions,
            outputs: workflow.outputs.clone(),
            steps: Vec::with_capacity(workflow.steps.len()),
            step_index: HashMap::with_capacity(workflow.steps.len()),
        };

        for step in &workflow.steps {
            if node.step_index.contains_key(&step.step_id) {
                return Err(DslError::DuplicateDefinition {
                    kind: "step",
                    identity: step.step_id.clone(),
                    scope,
                });
            }
            let step_node = self.build_step(&node, step)?;
            node.step_index.insert(step.step_id.clone(), node.steps.len());
            node.steps.push(step_node);
        }

        debug!(workflow_id = %node.id, steps = node.steps.len(), "Resolved workflow");
        Ok(node)
    }

    fn build_step(&self, workflow: &WorkflowNode, step: &Step) -> Result<StepNode, DslError> {
        let scope = format!("step '{}' of workflow '{}'", step.step_id, workflow.id);

        let target = step.target().ok_or_else(|| DslError::InvalidStepTarget {
            workflow_id: workflow.id.clone(),
            step_id: step.step_id.clone(),
            found: step.targets().len(),
        })?;

        let called_workflow = match &target {
            StepTarget::Workflow(id) if id.starts_with(SOURCE_PREFIX) => {
                self.ensure_source_exists(id)?;
                None
            }
            StepTarget::Workflow(id) => Some(self.index.get(id.as_str()).copied().ok_or_else(
                || DslError::NotFound {
                    kind: "workflow",
                    name: id.clone(),
                },
            )?),
            StepTarget::OperationId(_) | StepTarget::OperationPath(_) => None,
        };

        let parameters = self.resolver.resolve_parameters(&step.parameters)?;
        ensure_unique(&parameters, &scope)?;
        let on_success = self.resolver.resolve_success_actions(&step.on_success)?;
        ensure_unique(&on_success, &scope)?;
        let on_failure = self.resolver.resolve_failure_actions(&step.on_failure)?;
        ensure_unique(&on_failure, &scope)?;

        Ok(StepNode {
            id: step.step_id.clone(),
            workflow: workflow.index,
            target,
            called_workflow,
            operation: None,
            parameters: merge(&workflow.parameters, &parameters),
            request_body: step.request_body.clone(),
            success_criteria: step.success_criteria.clone(),
            on_success: merge(&workflow.success_actions, &on_success),
            on_failure: merge(&workflow.failure_actions, &on_failure),
            outputs: step.outputs.clone(),
        })
    }

    /// Split dependsOn into local arena indices and external references
    fn resolve_dependencies(
        &self,
        workflow: &Workflow,
    ) -> Result<(Vec<usize>, Vec<String>), DslError> {
        let mut local = Vec::with_capacity(workflow.depends_on.len());
        let mut external = Vec::new();

        for dependency in &workflow.depends_on {
            if dependency.starts_with(SOURCE_PREFIX) {
                self.ensure_source_exists(dependency)?;
                external.push(dependency.clone());
                continue;
            }
            match self.index.get(dependency.as_str()) {
                Some(&i) => local.push(i),
                None => {
                    return Err(DslError::UnresolvedDependency {
                        workflow_id: workflow.workflow_id.clone(),
                        dependency: dependency.clone(),
                    })
                }
            }
        }

        Ok((local, external))
    }

    /// `$sourceDescriptions.<name>.<rest>` must name a declared source
    fn ensure_source_exists(&self, reference: &str) -> Result<(), DslError> {
        let name = reference
            .trim_start_matches(SOURCE_PREFIX)
            .split('.')
            .next()
            .unwrap_or_default();
        match self.document.source_description(name) {
            Some(_) => Ok(()),
            None => Err(DslError::NotFound {
                kind: "source description",
                name: name.to_string(),
            }),
        }
    }

    /// Inline `{$ref: "#/components/inputs/<name>"}`
    fn resolve_input_schema(&self, inputs: Option<&Value>) -> Result<Option<Value>, DslError> {
        let Some(schema) = inputs else {
            return Ok(None);
        };
        let Some(name) = schema
            .get("$ref")
            .and_then(Value::as_str)
            .and_then(|r| r.strip_prefix(INPUTS_REF_PREFIX))
        else {
            return Ok(Some(schema.clone()));
        };

        self.document
            .components
            .as_ref()
            .and_then(|c| c.inputs.get(name))
            .cloned()
            .map(Some)
            .ok_or_else(|| DslError::NotFound {
                kind: "component input",
                name: name.to_string(),
            })
    }
}
