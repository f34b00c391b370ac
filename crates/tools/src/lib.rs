//! Built-in tool implementations for toolchat.
//!
//! The demo set gives the agent arithmetic, the clock, a mock asset
//! inventory, and a natural-language query demonstration. The [`ledger`]
//! tools talk to a Code-In asset ledger through the [`ledger::AssetLedger`]
//! trait and are registered separately.

pub mod asset_search;
pub mod asset_statistics;
pub mod calculator;
pub mod clock;
pub mod ledger;
pub mod nl_query;

use serde_json::Value;
use std::sync::Arc;
use toolchat_core::error::ToolError;
use toolchat_core::provider::Provider;
use toolchat_core::tool::ToolRegistry;

/// Create the demo tool registry.
///
/// `provider` and `query_model` back the natural-language query tool's
/// inner structured-output call.
pub fn demo_registry(
    provider: Arc<dyn Provider>,
    query_model: impl Into<String>,
) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(calculator::CalculatorTool))?;
    registry.register(Box::new(clock::ClockTool))?;
    registry.register(Box::new(asset_search::AssetSearchTool))?;
    registry.register(Box::new(asset_statistics::AssetStatisticsTool))?;
    registry.register(Box::new(nl_query::NlQueryTool::new(provider, query_model)))?;
    Ok(registry)
}

/// Render a float the way a JSON-native client expects: whole numbers as
/// integers, everything else as a float.
pub(crate) fn js_number(n: f64) -> Value {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}
