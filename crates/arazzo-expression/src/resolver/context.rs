use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ast::Exchange;

/// Runtime data an expression can be evaluated against
pub trait ExecutionContext {
    fn url(&self) -> Option<&str>;

    fn method(&self) -> Option<&str>;

    fn status_code(&self) -> Option<u16>;

    fn headers(&self, exchange: Exchange) -> Option<&BTreeMap<String, String>>;

    fn query(&self, exchange: Exchange) -> Option<&Map<String, Value>>;

    fn path_parameters(&self, exchange: Exchange) -> Option<&Map<String, Value>>;

    fn body(&self, exchange: Exchange) -> Option<&Value>;

    /// Inputs of the workflow currently running
    fn inputs(&self) -> &Map<String, Value>;

    /// Outputs the current workflow has produced so far
    fn outputs(&self) -> &Map<String, Value>;

    /// Recorded outputs of a step, `None` if it has not run
    fn step_outputs(&self, step_id: &str) -> Option<&Map<String, Value>>;

    /// Recorded outputs of a completed workflow
    fn workflow_outputs(&self, _workflow_id: &str) -> Option<&Map<String, Value>> {
        None
    }

    /// JSON view of the document for `$workflows.`, `$sourceDescriptions.` and `$components.`
    fn document(&self) -> Option<&Value>;
}

/// One side of an HTTP exchange
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpMessage {
    pub headers: BTreeMap<String, String>,
    pub query: Map<String, Value>,
    pub path: Map<String, Value>,
    pub body: Option<Value>,
}

/// In-memory execution context a host executor fills in as steps complete
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuntimeContext {
    pub url: Option<String>,
    pub method: Option<String>,
    pub status_code: Option<u16>,
    pub request: HttpMessage,
    pub response: HttpMessage,
    pub inputs: Map<String, Value>,
    pub outputs: Map<String, Value>,
    pub steps: HashMap<String, Map<String, Value>>,
    pub workflows: HashMap<String, Map<String, Value>>,
    pub document: Option<Value>,
}

impl RuntimeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, document: Value) -> Self {
        self.document = Some(document);
        self
    }

    pub fn with_input(mut self, name: &str, value: Value) -> Self {
        self.inputs.insert(name.to_string(), value);
        self
    }

    pub fn with_request(mut self, method: &str, url: &str, request: HttpMessage) -> Self {
        self.method = Some(method.to_string());
        self.url = Some(url.to_string());
        self.request = request;
        self
    }

    pub fn with_response(mut self, status_code: u16, response: HttpMessage) -> Self {
        self.status_code = Some(status_code);
        self.response = response;
        self
    }

    /// Record the outputs of a finished step
    pub fn record_step_outputs(&mut self, step_id: &str, outputs: Map<String, Value>) {
        self.steps.insert(step_id.to_string(), outputs);
    }

    /// Record the outputs of a finished workflow
    pub fn record_workflow_outputs(&mut self, workflow_id: &str, outputs: Map<String, Value>) {
        self.workflows.insert(workflow_id.to_string(), outputs);
    }

    pub fn set_output(&mut self, name: &str, value: Value) {
        self.outputs.insert(name.to_string(), value);
    }

    /// Drop the current exchange before the next step runs
    pub fn clear_exchange(&mut self) {
        self.url = None;
        self.method = None;
        self.status_code = None;
        self.request = HttpMessage::default();
        self.response = HttpMessage::default();
    }

    fn message(&self, exchange: Exchange) -> &HttpMessage {
        match exchange {
            Exchange::Request => &self.request,
            Exchange::Response => &self.response,
        }
    }
}

impl ExecutionContext for RuntimeContext {
    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    fn headers(&self, exchange: Exchange) -> Option<&BTreeMap<String, String>> {
        Some(&self.message(exchange).headers)
    }

    fn query(&self, exchange: Exchange) -> Option<&Map<String, Value>> {
        Some(&self.message(exchange).query)
    }

    fn path_parameters(&self, exchange: Exchange) -> Option<&Map<String, Value>> {
        Some(&self.message(exchange).path)
    }

    fn body(&self, exchange: Exchange) -> Option<&Value> {
        self.message(exchange).body.as_ref()
    }

    fn inputs(&self) -> &Map<String, Value> {
        &self.inputs
    }

    fn outputs(&self) -> &Map<String, Value> {
        &self.outputs
    }

    fn step_outputs(&self, step_id: &str) -> Option<&Map<String, Value>> {
        self.steps.get(step_id)
    }

    fn workflow_outputs(&self, workflow_id: &str) -> Option<&Map<String, Value>> {
        self.workflows.get(workflow_id)
    }

    fn document(&self) -> Option<&Value> {
        self.document.as_ref()
    }
}
