use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::document::ArazzoDocument;
use crate::error::DslError;

lazy_static! {
    static ref VERSION_REGEX: Regex = Regex::new(r"^1\.0\.\d(-.+)?$").unwrap();
}

/// Parse a YAML string into an ArazzoDocument.
///
/// Only the structure and the `arazzo` version are checked here. References,
/// ids and expressions are left to the validation module.
///
/// # Arguments
///
/// * `yaml_str` - A YAML (or JSON) string containing an Arazzo document
pub fn parse_document(yaml_str: &str) -> Result<ArazzoDocument, DslError> {
    let document: ArazzoDocument = serde_yaml::from_str(yaml_str)?;
    check_version(document)
}

/// Parse a JSON string into an ArazzoDocument
pub fn parse_json_document(json_str: &str) -> Result<ArazzoDocument, DslError> {
    let document: ArazzoDocument = serde_json::from_str(json_str)?;
    check_version(document)
}

/// Whether `version` is a supported `arazzo` field value
pub fn is_supported_version(version: &str) -> bool {
    VERSION_REGEX.is_match(version)
}

fn check_version(document: ArazzoDocument) -> Result<ArazzoDocument, DslError> {
    if !is_supported_version(&document.arazzo) {
        return Err(DslError::UnsupportedVersion(document.arazzo));
    }
    debug!(
        version = %document.arazzo,
        title = %document.info.title,
        workflows = document.workflows.len(),
        "Parsed Arazzo document"
    );
    Ok(document)
}
