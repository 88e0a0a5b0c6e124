use arazzo_expression::{evaluate, parse_embedded, ExecutionContext};
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

use crate::document::{Criterion, CriterionType, ExpressionLanguage};
use crate::error::DslError;

use super::condition::Condition;

/// Evaluates `jsonpath` or `xpath` conditions against an already resolved context value
pub trait CriterionEvaluator: Send + Sync {
    /// `version` is only given when the criterion names one explicitly
    fn evaluate(&self, condition: &str, version: Option<&str>, context: &Value)
        -> Result<bool, DslError>;
}

/// Evaluates criteria of every type. `simple` and `regex` are built in, the
/// others need a registered [`CriterionEvaluator`].
#[derive(Clone, Default)]
pub struct CriteriaEngine {
    evaluators: HashMap<ExpressionLanguage, Arc<dyn CriterionEvaluator>>,
}

impl CriteriaEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_evaluator(
        mut self,
        language: ExpressionLanguage,
        evaluator: Arc<dyn CriterionEvaluator>,
    ) -> Self {
        self.register(language, evaluator);
        self
    }

    pub fn register(
        &mut self,
        language: ExpressionLanguage,
        evaluator: Arc<dyn CriterionEvaluator>,
    ) {
        self.evaluators.insert(language, evaluator);
    }

    /// Whether `criterion` holds in `context`
    pub fn evaluate(
        &self,
        criterion: &Criterion,
        context: &dyn ExecutionContext,
    ) -> Result<bool, DslError> {
        let kind = criterion.kind();
        let result = match kind {
            CriterionType::Simple => Condition::parse(&criterion.condition)?.evaluate(context)?,
            CriterionType::Regex => {
                let subject = match self.context_value(criterion, context)? {
                    Value::String(text) => text,
                    other => other.to_string(),
                };
                let pattern = Regex::new(&criterion.condition).map_err(|e| {
                    DslError::Criterion(format!("invalid regex '{}': {}", criterion.condition, e))
                })?;
                pattern.is_match(&subject)
            }
            CriterionType::Jsonpath | CriterionType::Xpath => {
                let language = match kind {
                    CriterionType::Xpath => ExpressionLanguage::Xpath,
                    _ => ExpressionLanguage::Jsonpath,
                };
                let evaluator = self.evaluators.get(&language).ok_or_else(|| {
                    DslError::Criterion(format!("no evaluator registered for {}", kind.as_str()))
                })?;
                let value = self.context_value(criterion, context)?;
                evaluator.evaluate(&criterion.condition, criterion.version(), &value)?
            }
        };

        trace!(
            condition = %criterion.condition,
            kind = kind.as_str(),
            result,
            "Evaluated criterion"
        );
        Ok(result)
    }

    /// True when every criterion holds; an empty list always holds
    pub fn all(
        &self,
        criteria: &[Criterion],
        context: &dyn ExecutionContext,
    ) -> Result<bool, DslError> {
        for criterion in criteria {
            if !self.evaluate(criterion, context)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn context_value(
        &self,
        criterion: &Criterion,
        context: &dyn ExecutionContext,
    ) -> Result<Value, DslError> {
        let text = criterion.context.as_deref().ok_or_else(|| {
            DslError::Criterion(format!(
                "a {} criterion requires a context",
                criterion.kind().as_str()
            ))
        })?;
        let expression = parse_embedded(text).map_err(|e| DslError::expression(text, e))?;
        Ok(evaluate(&expression, context)?)
    }
}

impl std::fmt::Debug for CriteriaEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CriteriaEngine")
            .field("evaluators", &self.evaluators.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arazzo_expression::{HttpMessage, RuntimeContext};
    use serde_json::json;

    /// Treats the condition as a top-level key that must be present
    struct KeyPresent;

    impl CriterionEvaluator for KeyPresent {
        fn evaluate(
            &self,
            condition: &str,
            _version: Option<&str>,
            context: &Value,
        ) -> Result<bool, DslError> {
            Ok(context.get(condition.trim_start_matches("$.")).is_some())
        }
    }

    fn create_test_context() -> RuntimeContext {
        let response = HttpMessage {
            body: Some(json!({"id": 7, "name": "Rex"})),
            ..Default::default()
        };
        RuntimeContext::new().with_response(201, response)
    }

    fn criterion(yaml: &str) -> Criterion {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_simple_and_regex() {
        let engine = CriteriaEngine::new();
        let context = create_test_context();

        assert!(engine
            .evaluate(&criterion("condition: $statusCode == 201"), &context)
            .unwrap());
        let status = criterion("context: $statusCode\ncondition: '^2\\d\\d$'\ntype: regex");
        assert!(engine.evaluate(&status, &context).unwrap());
        let name = criterion("context: $response.body#/name\ncondition: '^Max'\ntype: regex");
        assert!(!engine.evaluate(&name, &context).unwrap());
    }

    #[test]
    fn test_delegated_criteria() {
        let yaml = "context: $response.body\ncondition: $.id\ntype:\n  type: jsonpath\n  \
                    version: draft-goessner-dispatch-jsonpath-00";
        let context = create_test_context();

        let err = CriteriaEngine::new().evaluate(&criterion(yaml), &context).unwrap_err();
        assert_eq!(err.error_code(), "ERR_DSL_CRITERION");

        let engine = CriteriaEngine::new()
            .with_evaluator(ExpressionLanguage::Jsonpath, Arc::new(KeyPresent));
        assert!(engine.evaluate(&criterion(yaml), &context).unwrap());
    }

    #[test]
    fn test_all() {
        let engine = CriteriaEngine::new();
        let context = create_test_context();
        assert!(engine.all(&[], &context).unwrap());

        let criteria = vec![
            Criterion::simple("$statusCode == 201"),
            Criterion::simple("$response.body#/id > 10"),
        ];
        assert!(!engine.all(&criteria, &context).unwrap());
    }

    #[test]
    fn test_regex_without_context() {
        let err = CriteriaEngine::new()
            .evaluate(&criterion("condition: '^2'\ntype: regex"), &create_test_context())
            .unwrap_err();
        assert!(err.to_string().contains("requires a context"));
    }
}
