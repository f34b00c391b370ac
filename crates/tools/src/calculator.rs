//! Calculator tool — one binary arithmetic operation per call.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};
use toolchat_core::error::ToolError;
use toolchat_core::schema::{parse_input, schema_of};
use toolchat_core::tool::{Tool, error_payload};

use crate::js_number;

pub struct CalculatorTool;

/// The math operation to perform
#[derive(Debug, Clone, Copy, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    fn symbol(self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "×",
            Operation::Divide => "÷",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Divide => "divide",
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct CalculatorInput {
    operation: Operation,
    /// First number
    a: f64,
    /// Second number
    b: f64,
}

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Perform basic math calculations (add, subtract, multiply, divide)"
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<CalculatorInput>()
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let CalculatorInput { operation, a, b } = parse_input(self.name(), input)?;

        let result = match operation {
            Operation::Add => a + b,
            Operation::Subtract => a - b,
            Operation::Multiply => a * b,
            Operation::Divide => {
                if b == 0.0 {
                    return Ok(json!({
                        "type": "error",
                        "message": "Cannot divide by zero",
                    }));
                }
                a / b
            }
        };

        if !result.is_finite() {
            return Ok(error_payload(
                "Result is not a finite number",
                format!("{a} {} {b} overflowed", operation.symbol()),
            ));
        }

        Ok(json!({
            "type": "calculation_complete",
            "operation": operation.as_str(),
            "operands": { "a": js_number(a), "b": js_number(b) },
            "result": js_number(result),
            "message": format!("{a} {} {b} = {result}", operation.symbol()),
        }))
    }
}
