use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use crate::tool_source::{ToolCallContent, ToolCallContext, ToolSourceError, ToolSpec};
use crate::tools::r#trait::Tool;

/// Problems found while registering or validating tools. Fatal at startup.
#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("tool name must not be empty")]
    EmptyName,
    #[error("tool registered twice: {0}")]
    DuplicateName(String),
    /// `spec().name` differs from `name()`.
    #[error("tool {name} reports spec name {spec_name}")]
    NameMismatch { name: String, spec_name: String },
    #[error("tool {name} has an invalid schema: {reason}")]
    InvalidSchema { name: String, reason: String },
}

/// Registry of the tools one agent may call.
///
/// Keeps registration order (the order tools are offered to the model) and rejects
/// duplicate names. Call [`validate`](Self::validate) once at startup.
///
/// # Examples
///
/// ```
/// use weft::tools::{register_arithmetic_tools, ToolRegistry};
///
/// let mut registry = ToolRegistry::new();
/// register_arithmetic_tools(&mut registry).unwrap();
/// registry.validate().unwrap();
/// let names: Vec<_> = registry.list().into_iter().map(|s| s.name).collect();
/// assert_eq!(names, ["add", "subtract", "multiply", "divide"]);
/// ```
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Registers a tool. Empty and duplicate names are rejected.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Checks every spec: name matches, schema is an object schema, and every
    /// `required` parameter is declared under `properties`.
    pub fn validate(&self) -> Result<(), RegistryError> {
        for tool in &self.tools {
            let spec = tool.spec();
            if spec.name != tool.name() {
                return Err(RegistryError::NameMismatch {
                    name: tool.name().to_string(),
                    spec_name: spec.name,
                });
            }
            validate_schema(&spec).map_err(|reason| RegistryError::InvalidSchema {
                name: spec.name.clone(),
                reason,
            })?;
        }
        Ok(())
    }

    /// Specs of all registered tools, in registration order.
    pub fn list(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|tool| tool.spec()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Calls a tool by name. Unknown names are `ToolSourceError::NotFound`.
    pub async fn call(
        &self,
        name: &str,
        args: Value,
        ctx: Option<&ToolCallContext>,
    ) -> Result<ToolCallContent, ToolSourceError> {
        let tool = self
            .index
            .get(name)
            .and_then(|&i| self.tools.get(i))
            .ok_or_else(|| ToolSourceError::NotFound(name.to_string()))?;
        tool.call(args, ctx).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_schema(spec: &ToolSpec) -> Result<(), String> {
    let schema = spec
        .input_schema
        .as_object()
        .ok_or_else(|| "input_schema must be a JSON object".to_string())?;
    if schema.get("type").and_then(Value::as_str) != Some("object") {
        return Err("input_schema type must be \"object\"".into());
    }
    let properties = match schema.get("properties") {
        None => None,
        Some(Value::Object(p)) => Some(p),
        Some(_) => return Err("properties must be an object".into()),
    };
    if let Some(required) = schema.get("required") {
        let required = required
            .as_array()
            .ok_or_else(|| "required must be an array".to_string())?;
        for param in required {
            let param = param
                .as_str()
                .ok_or_else(|| "required entries must be strings".to_string())?;
            if !properties.map_or(false, |p| p.contains_key(param)) {
                return Err(format!("required parameter {} is not declared", param));
            }
        }
    }
    Ok(())
}
