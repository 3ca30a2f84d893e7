/// Tool Registry
///
/// Holds the fixed set of tools the server exposes. Each tool is described by
/// a `ToolDescriptor` (name, title, description, parameter schema) and tagged
/// with a `ToolKind` that selects its computation. The registry is built once
/// at startup and only read afterwards, so it is shared across transports and
/// worker threads behind an `Arc` without locking.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::core::clock::Clock;
use crate::core::config::ServerInfo;
use crate::core::error::ToolError;
use crate::tools::{self, ToolOutput};

/// Declared type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
    Boolean,
}

impl ParamType {
    fn as_str(self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
        }
    }
}

/// A validated argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl ParamValue {
    fn to_json(&self) -> Value {
        match self {
            ParamValue::String(s) => json!(s),
            ParamValue::Number(n) => json!(n),
            ParamValue::Boolean(b) => json!(b),
        }
    }
}

/// One entry of a tool's parameter schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamType,
    pub description: String,
    pub required: bool,
    /// Applied when an optional parameter is absent.
    pub default: Option<ParamValue>,
}

impl ParamSpec {
    pub fn required(name: &str, kind: ParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            description: description.to_string(),
            required: true,
            default: None,
        }
    }

    pub fn optional(name: &str, kind: ParamType, description: &str, default: ParamValue) -> Self {
        Self {
            name: name.to_string(),
            kind,
            description: description.to_string(),
            required: false,
            default: Some(default),
        }
    }

    /// Coerce a supplied JSON value to the declared type.
    fn coerce(&self, value: &Value) -> Result<ParamValue, ToolError> {
        let coerced = match (self.kind, value) {
            (ParamType::String, Value::String(s)) => Some(ParamValue::String(s.clone())),
            (ParamType::Number, Value::Number(n)) => n.as_f64().map(ParamValue::Number),
            (ParamType::Number, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(ParamValue::Number),
            (ParamType::Boolean, Value::Bool(b)) => Some(ParamValue::Boolean(*b)),
            (ParamType::Boolean, Value::String(s)) => match s.as_str() {
                "true" => Some(ParamValue::Boolean(true)),
                "false" => Some(ParamValue::Boolean(false)),
                _ => None,
            },
            _ => None,
        };
        coerced.ok_or_else(|| {
            ToolError::invalid(format!(
                "Parameter '{}' must be a {}",
                self.name,
                self.kind.as_str()
            ))
        })
    }
}

/// The closed set of computations the server knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    CurrentTime,
    RectangleArea,
    ReverseString,
    Health,
}

/// Registration metadata for one tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub title: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
    pub kind: ToolKind,
}

/// Discovery view of a tool, serialized as an MCP tool definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub title: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDescriptor {
    /// JSON Schema for the tool's arguments, derived from `params`.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in &self.params {
            let mut property = Map::new();
            property.insert("type".to_string(), json!(param.kind.as_str()));
            property.insert("description".to_string(), json!(param.description));
            if let Some(default) = &param.default {
                property.insert("default".to_string(), default.to_json());
            }
            properties.insert(param.name.clone(), Value::Object(property));
            if param.required {
                required.push(json!(param.name));
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema(),
        }
    }

    /// Check `arguments` against the schema and fill in defaults.
    ///
    /// `null` or a missing arguments value is treated as an empty object, and
    /// a `null` parameter counts as absent. Undeclared keys are ignored.
    pub fn validate(&self, arguments: &Value) -> Result<Arguments, ToolError> {
        let empty = Map::new();
        let supplied = match arguments {
            Value::Object(map) => map,
            Value::Null => &empty,
            _ => return Err(ToolError::invalid("Arguments must be a JSON object")),
        };

        let mut values = HashMap::with_capacity(self.params.len());
        for param in &self.params {
            match supplied.get(&param.name).filter(|v| !v.is_null()) {
                Some(value) => {
                    values.insert(param.name.clone(), param.coerce(value)?);
                }
                None if param.required => {
                    return Err(ToolError::invalid(format!(
                        "Missing required parameter: {}",
                        param.name
                    )));
                }
                None => {
                    if let Some(default) = &param.default {
                        values.insert(param.name.clone(), default.clone());
                    }
                }
            }
        }
        Ok(Arguments { values })
    }
}

/// Arguments that passed validation, keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: HashMap<String, ParamValue>,
}

impl Arguments {
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn string(&self, name: &str) -> Result<&str, ToolError> {
        match self.values.get(name) {
            Some(ParamValue::String(s)) => Ok(s.as_str()),
            _ => Err(ToolError::invalid(format!("Parameter '{}' must be a string", name))),
        }
    }

    pub fn number(&self, name: &str) -> Result<f64, ToolError> {
        match self.values.get(name) {
            Some(ParamValue::Number(n)) => Ok(*n),
            _ => Err(ToolError::invalid(format!("Parameter '{}' must be a number", name))),
        }
    }
}

/// Read-only dependencies available to every computation.
#[derive(Clone)]
pub struct ToolContext {
    pub clock: Arc<dyn Clock>,
    pub server: ServerInfo,
}

/// Registry of available MCP tools.
///
/// Tools keep their registration order for discovery; lookup by name goes
/// through an index.
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
    context: ToolContext,
}

impl ToolRegistry {
    /// Create an empty registry. Use `tools::build_registry` for the
    /// server's standard tool set.
    pub fn new(context: ToolContext) -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
            context,
        }
    }

    /// Register a tool. Names must be unique.
    pub fn register(&mut self, tool: ToolDescriptor) -> Result<(), ToolError> {
        if self.index.contains_key(&tool.name) {
            return Err(ToolError::DuplicateTool(tool.name));
        }
        self.index.insert(tool.name.clone(), self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn server_info(&self) -> &ServerInfo {
        &self.context.server
    }

    /// Tool definitions in registration order, for `tools/list`.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(ToolDescriptor::definition).collect()
    }

    /// Validate `arguments` and run the named tool.
    pub fn invoke(&self, name: &str, arguments: &Value) -> Result<ToolOutput, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let args = tool.validate(arguments)?;
        let outcome = tools::execute(tool.kind, &args, &self.context);
        if let Err(e) = &outcome {
            tracing::debug!(tool = name, kind = e.kind(), error = %e, "tool invocation failed");
        }
        outcome
    }
}
