use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::{Extensions, OrReusable};

/// A value passed to an operation or to a called workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    /// Absent when the step targets a workflow
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ParameterLocation>,

    /// A constant or a runtime expression
    pub value: Value,

    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Parameter {
    /// Two parameters with the same identity may not share a scope
    pub fn identity(&self) -> (&str, Option<ParameterLocation>) {
        (&self.name, self.location)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Cookie => "cookie",
        })
    }
}

pub type ParameterOrReusable = OrReusable<Parameter>;
