//! Arithmetic tools for the calculator agent: `add`, `subtract`, `multiply`, `divide`.
//!
//! Each takes two integers `a` and `b`. Integer results render as plain integers
//! (`"12"`); `divide` uses real division and renders like a float (`"3.0"`).
//! Overflow and division by zero are `ToolSourceError::Execution`, which ActNode turns
//! into an error tool message.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::tool_source::{ToolCallContent, ToolCallContext, ToolSourceError, ToolSpec};
use crate::tools::{RegistryError, Tool, ToolRegistry};

pub const TOOL_ADD: &str = "add";
pub const TOOL_SUBTRACT: &str = "subtract";
pub const TOOL_MULTIPLY: &str = "multiply";
pub const TOOL_DIVIDE: &str = "divide";

fn two_integer_spec(name: &str, description: &str) -> ToolSpec {
    ToolSpec {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "a": { "type": "integer", "description": "First operand" },
                "b": { "type": "integer", "description": "Second operand" }
            },
            "required": ["a", "b"]
        }),
    }
}

/// Reads integer argument `key`. Integral floats (`3.0`) are accepted since some
/// providers send every number as a float.
fn integer_arg(args: &Value, key: &str) -> Result<i64, ToolSourceError> {
    let value = args
        .get(key)
        .ok_or_else(|| ToolSourceError::InvalidInput(format!("missing argument {}", key)))?;
    if let Some(n) = value.as_i64() {
        return Ok(n);
    }
    match value.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
            Ok(f as i64)
        }
        _ => Err(ToolSourceError::InvalidInput(format!(
            "argument {} must be an integer, got {}",
            key, value
        ))),
    }
}

fn operands(args: &Value) -> Result<(i64, i64), ToolSourceError> {
    Ok((integer_arg(args, "a")?, integer_arg(args, "b")?))
}

fn overflow(op: &str, a: i64, b: i64) -> ToolSourceError {
    ToolSourceError::Execution(format!("integer overflow computing {} of {} and {}", op, a, b))
}

/// Adds two integers.
pub struct AddTool;

#[async_trait]
impl Tool for AddTool {
    fn name(&self) -> &str {
        TOOL_ADD
    }

    fn spec(&self) -> ToolSpec {
        two_integer_spec(
            TOOL_ADD,
            "This is an Addition function that adds two numbers (int) together.",
        )
    }

    async fn call(
        &self,
        args: Value,
        _ctx: Option<&ToolCallContext>,
    ) -> Result<ToolCallContent, ToolSourceError> {
        let (a, b) = operands(&args)?;
        let sum = a.checked_add(b).ok_or_else(|| overflow("sum", a, b))?;
        Ok(ToolCallContent::text(sum.to_string()))
    }
}

/// Subtracts `b` from `a`.
pub struct SubtractTool;

#[async_trait]
impl Tool for SubtractTool {
    fn name(&self) -> &str {
        TOOL_SUBTRACT
    }

    fn spec(&self) -> ToolSpec {
        two_integer_spec(
            TOOL_SUBTRACT,
            "This is a Subtraction function that subtracts two numbers (int) from each other. Returns a - b.",
        )
    }

    async fn call(
        &self,
        args: Value,
        _ctx: Option<&ToolCallContext>,
    ) -> Result<ToolCallContent, ToolSourceError> {
        let (a, b) = operands(&args)?;
        let diff = a.checked_sub(b).ok_or_else(|| overflow("difference", a, b))?;
        Ok(ToolCallContent::text(diff.to_string()))
    }
}

/// Multiplies two integers.
pub struct MultiplyTool;

#[async_trait]
impl Tool for MultiplyTool {
    fn name(&self) -> &str {
        TOOL_MULTIPLY
    }

    fn spec(&self) -> ToolSpec {
        two_integer_spec(
            TOOL_MULTIPLY,
            "This is a Multiplication function that multiplies two numbers (int) together.",
        )
    }

    async fn call(
        &self,
        args: Value,
        _ctx: Option<&ToolCallContext>,
    ) -> Result<ToolCallContent, ToolSourceError> {
        let (a, b) = operands(&args)?;
        let product = a.checked_mul(b).ok_or_else(|| overflow("product", a, b))?;
        Ok(ToolCallContent::text(product.to_string()))
    }
}

/// Divides `a` by `b` with real-number semantics.
pub struct DivideTool;

#[async_trait]
impl Tool for DivideTool {
    fn name(&self) -> &str {
        TOOL_DIVIDE
    }

    fn spec(&self) -> ToolSpec {
        two_integer_spec(
            TOOL_DIVIDE,
            "This is a Division function that divides two numbers (int) by each other. Returns a / b as a real number.",
        )
    }

    async fn call(
        &self,
        args: Value,
        _ctx: Option<&ToolCallContext>,
    ) -> Result<ToolCallContent, ToolSourceError> {
        let (a, b) = operands(&args)?;
        if b == 0 {
            return Err(ToolSourceError::Execution(format!(
                "division by zero: cannot divide {} by 0",
                a
            )));
        }
        let quotient = a as f64 / b as f64;
        Ok(ToolCallContent::text(format!("{:?}", quotient)))
    }
}

/// Registers the four arithmetic tools in `add, subtract, multiply, divide` order.
pub fn register_arithmetic_tools(registry: &mut ToolRegistry) -> Result<(), RegistryError> {
    registry.register(Box::new(AddTool))?;
    registry.register(Box::new(SubtractTool))?;
    registry.register(Box::new(MultiplyTool))?;
    registry.register(Box::new(DivideTool))?;
    Ok(())
}
