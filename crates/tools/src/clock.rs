//! Current time tool, optionally in an IANA timezone.

use async_trait::async_trait;
use chrono::{DateTime, Local, SecondsFormat, Utc};
use chrono_tz::Tz;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};
use toolchat_core::error::ToolError;
use toolchat_core::schema::{parse_input, schema_of};
use toolchat_core::tool::Tool;

/// Long US-style rendering: "Monday, January 15, 2024 at 10:30:00 AM UTC".
const DISPLAY_FORMAT: &str = "%A, %B %-d, %Y at %I:%M:%S %p %Z";

pub struct ClockTool;

#[derive(Debug, Deserialize, JsonSchema)]
struct ClockInput {
    /// Optional timezone (e.g., "America/New_York", "UTC")
    timezone: Option<String>,
}

#[async_trait]
impl Tool for ClockTool {
    fn name(&self) -> &str {
        "getCurrentTime"
    }

    fn description(&self) -> &str {
        "Get the current date and time"
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<ClockInput>()
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let ClockInput { timezone } = parse_input(self.name(), input)?;
        render(Utc::now(), timezone.as_deref())
    }
}

fn render(now: DateTime<Utc>, timezone: Option<&str>) -> Result<Value, ToolError> {
    let formatted = match timezone {
        Some(name) => {
            let tz: Tz = name.parse().map_err(|_| ToolError::ExecutionFailed {
                tool_name: "getCurrentTime".into(),
                reason: format!("Unknown timezone: {name}"),
            })?;
            now.with_timezone(&tz).format(DISPLAY_FORMAT).to_string()
        }
        None => now.with_timezone(&Local).format(DISPLAY_FORMAT).to_string(),
    };

    Ok(json!({
        "type": "time_retrieved",
        "timestamp": now.to_rfc3339_opts(SecondsFormat::Millis, true),
        "formatted": formatted,
        "timezone": timezone.unwrap_or("Local"),
        "message": format!("Current time: {formatted}"),
    }))
}
