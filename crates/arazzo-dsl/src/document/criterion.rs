use serde::de::{Deserializer, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Extensions;

/// An assertion deciding whether a step succeeded or an action applies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    /// Runtime expression the condition is applied to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    pub condition: String,

    /// Defaults to `simple`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub criterion_type: Option<CriterionTypeOrExpressionType>,

    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Criterion {
    pub fn simple(condition: &str) -> Self {
        Self {
            context: None,
            condition: condition.to_string(),
            criterion_type: None,
            extensions: Extensions::new(),
        }
    }

    /// Effective type, `simple` when none is given
    pub fn kind(&self) -> CriterionType {
        match &self.criterion_type {
            None => CriterionType::Simple,
            Some(CriterionTypeOrExpressionType::Type(kind)) => *kind,
            Some(CriterionTypeOrExpressionType::Expression(e)) => match e.language {
                ExpressionLanguage::Jsonpath => CriterionType::Jsonpath,
                ExpressionLanguage::Xpath => CriterionType::Xpath,
            },
        }
    }

    /// Version of the expression language, when given explicitly
    pub fn version(&self) -> Option<&str> {
        match &self.criterion_type {
            Some(CriterionTypeOrExpressionType::Expression(e)) => Some(&e.version),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriterionType {
    Simple,
    Regex,
    Jsonpath,
    Xpath,
}

impl CriterionType {
    pub fn as_str(self) -> &'static str {
        match self {
            CriterionType::Simple => "simple",
            CriterionType::Regex => "regex",
            CriterionType::Jsonpath => "jsonpath",
            CriterionType::Xpath => "xpath",
        }
    }
}

/// `{type: jsonpath|xpath, version}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionExpressionType {
    #[serde(rename = "type")]
    pub language: ExpressionLanguage,

    /// e.g. `draft-goessner-dispatch-jsonpath-00` or `xpath-30`
    pub version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpressionLanguage {
    Jsonpath,
    Xpath,
}

/// Decoding order: a string is a [`CriterionType`], a mapping is a [`CriterionExpressionType`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CriterionTypeOrExpressionType {
    Type(CriterionType),
    Expression(CriterionExpressionType),
}

impl<'de> Deserialize<'de> for CriterionTypeOrExpressionType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let decoded = match value {
            Value::String(_) => {
                serde_json::from_value(value).map(CriterionTypeOrExpressionType::Type)
            }
            Value::Object(_) => {
                serde_json::from_value(value).map(CriterionTypeOrExpressionType::Expression)
            }
            other => {
                return Err(D::Error::custom(format!(
                    "criterion type must be a string or a {{type, version}} mapping, found {}",
                    other
                )))
            }
        };
        decoded.map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_is_simple() {
        let criterion: Criterion = serde_yaml::from_str("condition: $statusCode == 200").unwrap();
        assert_eq!(criterion.kind(), CriterionType::Simple);
        assert_eq!(criterion.version(), None);
    }

    #[test]
    fn test_plain_type() {
        let criterion: Criterion =
            serde_yaml::from_str("context: $response.body\ncondition: '^ok'\ntype: regex").unwrap();
        assert_eq!(criterion.kind(), CriterionType::Regex);
    }

    #[test]
    fn test_expression_type() {
        let yaml = r#"
context: $response.body
condition: $[?count(@.pets) > 0]
type:
  type: jsonpath
  version: draft-goessner-dispatch-jsonpath-00
"#;
        let criterion: Criterion = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(criterion.kind(), CriterionType::Jsonpath);
        assert_eq!(criterion.version(), Some("draft-goessner-dispatch-jsonpath-00"));
    }

    #[test]
    fn test_invalid_type() {
        assert!(serde_yaml::from_str::<Criterion>("condition: x\ntype: 3").is_err());
        assert!(serde_yaml::from_str::<Criterion>("condition: x\ntype: sql").is_err());
    }
}
