//! Shape validation of the raw configuration document.
//!
//! Runs before any resolution; everything downstream assumes a valid
//! document and does not re-check shapes.

use serde_json::Value;
use tracing::debug;

use crate::config::document::{
    value_shape, ConfigDocument, OPT_CRITICAL_SECTION_DIRECTORY, OPT_CRITICAL_SECTION_DRIVER,
    OPT_LOG_SERVICE, OPT_MAX_EXECUTION_TIME, OPT_SHOW_DIAGNOSTICS_PANEL, OPT_TASKS,
    OPT_TIMESTAMP_STORAGE,
};
use crate::core::errors::{AssemblyError, Result};

/// Acceptable shapes for one option.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Shape {
    String,
    Integer,
    Boolean,
    Mapping,
    Array,
    Null,
}

impl Shape {
    fn matches(self, value: &Value) -> bool {
        match self {
            Shape::String => value.is_string(),
            Shape::Integer => value.as_u64().is_some(),
            Shape::Boolean => value.is_boolean(),
            Shape::Mapping => value.is_object(),
            Shape::Array => value.is_array(),
            Shape::Null => value.is_null(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Shape::String => "string",
            Shape::Integer => "non-negative integer",
            Shape::Boolean => "boolean",
            Shape::Mapping => "descriptor",
            Shape::Array => "array",
            Shape::Null => "null",
        }
    }
}

/// Assert every recognized option matches one of its declared shapes.
///
/// Unknown option names are tolerated (the host may stack further options on
/// the same document); unknown shapes of recognized options are fatal.
pub fn validate_shapes(doc: &ConfigDocument) -> Result<()> {
    use Shape::*;

    assert_shape(doc, OPT_TIMESTAMP_STORAGE, &[String, Mapping, Null])?;
    assert_shape(doc, OPT_MAX_EXECUTION_TIME, &[Integer, Null])?;
    assert_shape(doc, OPT_CRITICAL_SECTION_DIRECTORY, &[String, Null])?;
    assert_shape(doc, OPT_CRITICAL_SECTION_DRIVER, &[String, Mapping, Null])?;
    assert_shape(doc, OPT_SHOW_DIAGNOSTICS_PANEL, &[Boolean, Null])?;
    assert_shape(doc, OPT_LOG_SERVICE, &[String, Null])?;
    assert_shape(doc, OPT_TASKS, &[Array, Null])?;

    // Task entries are themselves string-or-descriptor.
    if let Some(Value::Array(entries)) = doc.get(OPT_TASKS) {
        for entry in entries {
            if !Shape::String.matches(entry) && !Shape::Mapping.matches(entry) {
                return Err(AssemblyError::config_shape(
                    OPT_TASKS,
                    "string|descriptor",
                    value_shape(entry),
                ));
            }
        }
    }

    debug!("configuration document passed shape validation");
    Ok(())
}

fn assert_shape(doc: &ConfigDocument, option: &str, accepted: &[Shape]) -> Result<()> {
    let Some(value) = doc.get(option) else {
        return Ok(());
    };
    if accepted.iter().any(|shape| shape.matches(value)) {
        return Ok(());
    }
    let expected = accepted
        .iter()
        .map(|shape| shape.name())
        .collect::<Vec<_>>()
        .join("|");
    Err(AssemblyError::config_shape(
        option,
        expected,
        value_shape(value),
    ))
}
