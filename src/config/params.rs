//! Global parameter table and `%param%` placeholder expansion.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::core::errors::{AssemblyError, Result};

/// Parameter names the assembler itself consults.
pub const PARAM_TEMP_DIR: &str = "tempDir";
pub const PARAM_DEBUG_MODE: &str = "debugMode";

/// Process-wide parameters available to argument expansion.
///
/// Hosts seed this with at least the temp directory and the debug flag; any
/// further entries are available to `%name%` placeholders in descriptor
/// arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterTable {
    params: BTreeMap<String, Value>,
}

impl ParameterTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Conventional host table: temp directory plus debug flag.
    pub fn with_defaults<S: Into<String>>(temp_dir: S, debug_mode: bool) -> Self {
        Self::new()
            .with(PARAM_TEMP_DIR, Value::String(temp_dir.into()))
            .with(PARAM_DEBUG_MODE, Value::Bool(debug_mode))
    }

    pub fn with<K: Into<String>>(mut self, name: K, value: Value) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// Host debug flag; absent means not debugging.
    pub fn debug_mode(&self) -> bool {
        matches!(self.get(PARAM_DEBUG_MODE), Some(Value::Bool(true)))
    }

    /// Expand placeholders in one value, recursing into arrays and mappings.
    ///
    /// A string that is exactly one placeholder takes the parameter's native
    /// value; an embedded placeholder stringifies it. Unknown names fail with
    /// [`AssemblyError::UnknownParameter`].
    pub fn expand(&self, value: &Value) -> Result<Value> {
        match value {
            Value::String(s) => self.expand_str(s),
            Value::Array(items) => Ok(Value::Array(
                items
                    .iter()
                    .map(|item| self.expand(item))
                    .collect::<Result<Vec<_>>>()?,
            )),
            Value::Object(map) => {
                let mut expanded = serde_json::Map::with_capacity(map.len());
                for (key, item) in map {
                    expanded.insert(key.clone(), self.expand(item)?);
                }
                Ok(Value::Object(expanded))
            }
            other => Ok(other.clone()),
        }
    }

    /// Expand every value in an argument list.
    pub fn expand_args(&self, args: &[Value]) -> Result<Vec<Value>> {
        args.iter().map(|arg| self.expand(arg)).collect()
    }

    fn expand_str(&self, input: &str) -> Result<Value> {
        // Whole-string placeholder keeps the parameter's native type.
        if let Some(name) = whole_placeholder(input) {
            let value = self
                .params
                .get(name)
                .ok_or_else(|| AssemblyError::unknown_parameter(name))?;
            return Ok(value.clone());
        }

        let mut out = String::with_capacity(input.len());
        let mut rest = input;
        while let Some(start) = rest.find('%') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            match after.find('%') {
                Some(end) if end > 0 => {
                    let name = &after[..end];
                    let value = self
                        .params
                        .get(name)
                        .ok_or_else(|| AssemblyError::unknown_parameter(name))?;
                    out.push_str(&stringify(value));
                    rest = &after[end + 1..];
                }
                // Lone or doubled '%' passes through untouched.
                _ => {
                    out.push('%');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        Ok(Value::String(out))
    }
}

fn whole_placeholder(input: &str) -> Option<&str> {
    let inner = input.strip_prefix('%')?.strip_suffix('%')?;
    if inner.is_empty() || inner.contains('%') {
        return None;
    }
    Some(inner)
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
