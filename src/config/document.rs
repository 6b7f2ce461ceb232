//! Configuration document and the typed view extracted from it.
//!
//! A document arrives as a raw mapping (from YAML, JSON, or built in code)
//! and is read exactly once, at assembly time. Shape validation runs over the
//! raw mapping first; the typed [`AssemblyConfig`] is extracted afterwards
//! and later stages assume validity.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::errors::{AssemblyError, Result};

/// Recognized option names.
pub const OPT_TIMESTAMP_STORAGE: &str = "timestampStorage";
pub const OPT_MAX_EXECUTION_TIME: &str = "maxExecutionTime";
pub const OPT_CRITICAL_SECTION_DIRECTORY: &str = "criticalSectionDirectory";
pub const OPT_CRITICAL_SECTION_DRIVER: &str = "criticalSectionDriver";
pub const OPT_TASKS: &str = "tasks";
pub const OPT_SHOW_DIAGNOSTICS_PANEL: &str = "showDiagnosticsPanel";
pub const OPT_LOG_SERVICE: &str = "logService";

/// A raw configuration document: option name to value.
///
/// Unknown option names are tolerated; unknown shapes of known options are
/// rejected by [`crate::config::validate::validate_shapes`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(flatten)]
    options: Map<String, Value>,
}

impl ConfigDocument {
    /// Create an empty document. Every option takes its declared default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from a JSON value, which must be a mapping.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(options) => Ok(Self { options }),
            other => Err(AssemblyError::config_shape(
                "<document>",
                "mapping",
                value_shape(&other),
            )),
        }
    }

    /// Load a document from a YAML string.
    pub fn from_yaml_str(input: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(input)?;
        Self::from_value(value)
    }

    /// Load a document from a JSON string.
    pub fn from_json_str(input: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(input)?;
        Self::from_value(value)
    }

    /// Set an option, replacing any previous value.
    pub fn set<K: Into<String>>(&mut self, option: K, value: Value) {
        self.options.insert(option.into(), value);
    }

    /// Fluent variant of [`set`](Self::set).
    pub fn with_option<K: Into<String>>(mut self, option: K, value: Value) -> Self {
        self.set(option, value);
        self
    }

    /// Look up an option. Absent and explicit null are distinct here;
    /// extraction treats both as "take the default".
    pub fn get(&self, option: &str) -> Option<&Value> {
        self.options.get(option)
    }

    /// Iterate over all supplied options.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.options.iter()
    }
}

/// A fully-described construction statement: constructor reference plus
/// ordered argument list. Arguments may contain `%param%` placeholders that
/// are expanded against the parameter table before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    pub entity: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl Descriptor {
    pub fn new<S: Into<String>>(entity: S) -> Self {
        Self {
            entity: entity.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }
}

/// A pluggable-component option: bare identifier, full descriptor, or absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ComponentSpec {
    Identifier(String),
    Descriptor(Descriptor),
    #[default]
    Absent,
}

impl ComponentSpec {
    /// Extract a spec from a validated option value.
    pub(crate) fn from_value(value: Option<&Value>) -> Result<Self> {
        match value {
            None | Some(Value::Null) => Ok(Self::Absent),
            Some(Value::String(name)) => Ok(Self::Identifier(name.clone())),
            Some(obj @ Value::Object(_)) => {
                let descriptor: Descriptor = serde_json::from_value(obj.clone())?;
                Ok(Self::Descriptor(descriptor))
            }
            Some(other) => Err(AssemblyError::config_shape(
                "<component>",
                "string|descriptor|null",
                value_shape(other),
            )),
        }
    }
}

/// A task declaration: bare identifier or full descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskSpec {
    Identifier(String),
    Descriptor(Descriptor),
}

impl TaskSpec {
    pub(crate) fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(name) => Ok(Self::Identifier(name.clone())),
            obj @ Value::Object(_) => {
                let descriptor: Descriptor = serde_json::from_value(obj.clone())?;
                Ok(Self::Descriptor(descriptor))
            }
            other => Err(AssemblyError::config_shape(
                OPT_TASKS,
                "string|descriptor",
                value_shape(other),
            )),
        }
    }
}

/// Typed view of a validated document. Absent options carry their declared
/// defaults where the default is static; defaults derived from the host
/// (debug flag, temp directory) are applied by the assembler.
#[derive(Debug, Clone, Default)]
pub struct AssemblyConfig {
    pub timestamp_storage: ComponentSpec,
    pub max_execution_time: Option<u64>,
    pub critical_section_directory: Option<String>,
    pub critical_section_driver: ComponentSpec,
    pub tasks: Vec<TaskSpec>,
    pub show_diagnostics_panel: Option<bool>,
    pub log_service: Option<String>,
}

impl AssemblyConfig {
    /// Extract the typed view. The document must already have passed
    /// [`crate::config::validate::validate_shapes`].
    pub fn from_document(doc: &ConfigDocument) -> Result<Self> {
        let tasks = match doc.get(OPT_TASKS) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(entries)) => entries
                .iter()
                .map(TaskSpec::from_value)
                .collect::<Result<Vec<_>>>()?,
            Some(other) => {
                return Err(AssemblyError::config_shape(
                    OPT_TASKS,
                    "array",
                    value_shape(other),
                ))
            }
        };

        Ok(Self {
            timestamp_storage: ComponentSpec::from_value(doc.get(OPT_TIMESTAMP_STORAGE))?,
            max_execution_time: match doc.get(OPT_MAX_EXECUTION_TIME) {
                Some(Value::Number(n)) => n.as_u64(),
                _ => None,
            },
            critical_section_directory: match doc.get(OPT_CRITICAL_SECTION_DIRECTORY) {
                Some(Value::String(path)) => Some(path.clone()),
                _ => None,
            },
            critical_section_driver: ComponentSpec::from_value(doc.get(OPT_CRITICAL_SECTION_DRIVER))?,
            tasks,
            show_diagnostics_panel: match doc.get(OPT_SHOW_DIAGNOSTICS_PANEL) {
                Some(Value::Bool(flag)) => Some(*flag),
                _ => None,
            },
            log_service: match doc.get(OPT_LOG_SERVICE) {
                Some(Value::String(name)) => Some(name.clone()),
                _ => None,
            },
        })
    }
}

/// Human-readable shape name of a JSON value, for error messages.
pub(crate) fn value_shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_u64() || n.is_i64() => "integer",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "mapping",
    }
}
