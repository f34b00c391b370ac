//! Asset search tool — filters a fixed demo inventory.
//!
//! Stands in for a real asset database lookup so the tool-calling flow can
//! be demonstrated without one.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use toolchat_core::error::ToolError;
use toolchat_core::schema::{NonEmptyString, parse_input, schema_of};
use toolchat_core::tool::Tool;

pub struct AssetSearchTool;

#[derive(Debug, Deserialize, JsonSchema)]
struct SearchInput {
    /// Search terms to find assets by name, model, or manufacturer
    search_query: NonEmptyString,
}

#[derive(Debug, Clone, Serialize)]
pub struct DemoAsset {
    pub id: &'static str,
    pub name: &'static str,
    pub model: &'static str,
    pub manufacturer: &'static str,
    pub status: &'static str,
}

pub static DEMO_ASSETS: [DemoAsset; 4] = [
    DemoAsset {
        id: "1",
        name: "MacBook Pro 16\"",
        model: "M3 Max",
        manufacturer: "Apple",
        status: "Active",
    },
    DemoAsset {
        id: "2",
        name: "Dell XPS 15",
        model: "XPS-9530",
        manufacturer: "Dell",
        status: "Active",
    },
    DemoAsset {
        id: "3",
        name: "iPhone 15 Pro",
        model: "A2848",
        manufacturer: "Apple",
        status: "Active",
    },
    DemoAsset {
        id: "4",
        name: "Surface Laptop 5",
        model: "SL5-001",
        manufacturer: "Microsoft",
        status: "Maintenance",
    },
];

/// Case-insensitive substring match on name, model, or manufacturer.
pub fn search(query: &str) -> Vec<&'static DemoAsset> {
    let needle = query.to_lowercase();
    DEMO_ASSETS
        .iter()
        .filter(|asset| {
            [asset.name, asset.model, asset.manufacturer]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}

#[async_trait]
impl Tool for AssetSearchTool {
    fn name(&self) -> &str {
        "searchAssets"
    }

    fn description(&self) -> &str {
        "Search for IT assets in the inventory. This is a demo tool showing how asset management integrates."
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<SearchInput>()
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let SearchInput { search_query } = parse_input(self.name(), input)?;
        let query = search_query.as_str();
        let results = search(query);

        if results.is_empty() {
            return Ok(json!({
                "type": "no_assets_found",
                "message": format!("No assets found matching \"{query}\". (This is demo data)"),
            }));
        }

        Ok(json!({
            "type": "assets_found",
            "message": format!(
                "Found {} asset(s) matching \"{query}\". (Demo data)",
                results.len()
            ),
            "assets": results,
            "note": "This is mock data for demonstration purposes. Real integration would connect to your asset database.",
        }))
    }
}
