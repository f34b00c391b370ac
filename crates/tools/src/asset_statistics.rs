//! Asset statistics tool — fixed demo figures for three metrics.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use toolchat_core::error::ToolError;
use toolchat_core::schema::{parse_input, schema_of};
use toolchat_core::tool::Tool;

pub struct AssetStatisticsTool;

/// The statistic to retrieve
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
enum Metric {
    TotalCount,
    ByManufacturer,
    ByStatus,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct StatisticsInput {
    metric: Metric,
}

fn metric_table(metric: Metric) -> Map<String, Value> {
    let table = match metric {
        Metric::TotalCount => json!({
            "total": 24,
            "message": "Total assets in inventory: 24 (Demo data)",
        }),
        Metric::ByManufacturer => json!({
            "data": [
                { "manufacturer": "Apple", "count": 8 },
                { "manufacturer": "Dell", "count": 6 },
                { "manufacturer": "Microsoft", "count": 5 },
                { "manufacturer": "HP", "count": 5 },
            ],
            "message": "Asset count by manufacturer (Demo data)",
        }),
        Metric::ByStatus => json!({
            "data": [
                { "status": "Active", "count": 18 },
                { "status": "Maintenance", "count": 4 },
                { "status": "Inactive", "count": 2 },
            ],
            "message": "Asset count by status (Demo data)",
        }),
    };
    match table {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[async_trait]
impl Tool for AssetStatisticsTool {
    fn name(&self) -> &str {
        "getAssetStatistics"
    }

    fn description(&self) -> &str {
        "Get statistics about IT assets in the inventory. Demo tool for analytics integration."
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<StatisticsInput>()
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let StatisticsInput { metric } = parse_input(self.name(), input)?;

        let mut out = Map::new();
        out.insert("type".into(), json!("statistics_retrieved"));
        out.insert("metric".into(), json!(metric));
        out.extend(metric_table(metric));
        out.insert(
            "note".into(),
            json!("This is mock data for demonstration purposes."),
        );
        Ok(Value::Object(out))
    }
}
