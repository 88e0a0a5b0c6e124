use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A reference to a components entry, e.g. `$components.parameters.page`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reusable {
    pub reference: String,

    /// Replaces the value of a referenced parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Either an inline object or a [`Reusable`] pointing at one in `components`.
///
/// Decoding order: a mapping with a `reference` key is read as a `Reusable`
/// first. If that fails, or there is no such key, it is read as `T`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OrReusable<T> {
    Reusable(Reusable),
    Object(T),
}

impl<T> OrReusable<T> {
    pub fn as_object(&self) -> Option<&T> {
        match self {
            OrReusable::Object(object) => Some(object),
            OrReusable::Reusable(_) => None,
        }
    }

    pub fn as_reusable(&self) -> Option<&Reusable> {
        match self {
            OrReusable::Reusable(reusable) => Some(reusable),
            OrReusable::Object(_) => None,
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for OrReusable<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;

        if value.get("reference").is_some() {
            if let Ok(reusable) = serde_json::from_value::<Reusable>(value.clone()) {
                return Ok(OrReusable::Reusable(reusable));
            }
        }

        serde_json::from_value::<T>(value)
            .map(OrReusable::Object)
            .map_err(|e| {
                D::Error::custom(format!(
                    "data did not match a reusable object or an inline object: {}",
                    e
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Parameter;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reference_key_selects_reusable() {
        let decoded: OrReusable<Parameter> =
            serde_yaml::from_str("reference: $components.parameters.page\nvalue: 3").unwrap();
        assert_eq!(
            decoded,
            OrReusable::Reusable(Reusable {
                reference: "$components.parameters.page".to_string(),
                value: Some(Value::from(3)),
            })
        );
    }

    #[test]
    fn test_inline_object() {
        let decoded: OrReusable<Parameter> =
            serde_yaml::from_str("name: page\nin: query\nvalue: 1").unwrap();
        let parameter = decoded.as_object().unwrap();
        assert_eq!(parameter.name, "page");
        assert!(decoded.as_reusable().is_none());
    }

    #[test]
    fn test_neither_shape() {
        let result: Result<OrReusable<Parameter>, _> = serde_yaml::from_str("value: 1");
        let message = result.unwrap_err().to_string();
        assert!(
            message.contains("did not match"),
            "Unexpected error message: {}",
            message
        );
    }
}
