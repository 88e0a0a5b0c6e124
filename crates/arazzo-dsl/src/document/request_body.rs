use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Extensions;

/// Payload sent with an operation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Literal payload, or a runtime expression producing it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replacements: Vec<PayloadReplacement>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Overwrites the payload location `target` (a JSON pointer or XPath) with `value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadReplacement {
    pub target: String,

    pub value: Value,

    #[serde(flatten)]
    pub extensions: Extensions,
}
