//! The five Code-In ledger tools.
//!
//! Each one parses its typed input, calls the ledger, and shapes the
//! answer. Ledger failures become `{type: "error"}` payloads.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use toolchat_core::error::ToolError;
use toolchat_core::schema::{parse_input, schema_of};
use toolchat_core::tool::{Tool, error_payload};
use tracing::info;

use super::{AssetLedger, AssetQuery, AssetStatus, AssetUpdates, NewAsset, TimelineEvent};

const PLACEHOLDER_NOTE: &str = "Placeholder data: no Code-In ledger client is connected yet.";

const DEFAULT_QUERY_LIMIT: usize = 20;
const DEFAULT_TIMELINE_LIMIT: usize = 50;

/// Limits arrive as JSON numbers; fractions truncate and negatives clamp to 0.
fn to_limit(limit: Option<f64>, default: usize) -> usize {
    limit.map_or(default, |n| n as usize)
}

// ── queryCodeInAssets ─────────────────────────────────────────────────────

pub struct QueryAssetsTool {
    ledger: Arc<dyn AssetLedger>,
}

impl QueryAssetsTool {
    pub fn new(ledger: Arc<dyn AssetLedger>) -> Self {
        Self { ledger }
    }
}

#[derive(Deserialize, JsonSchema)]
struct QueryInput {
    #[serde(flatten)]
    query: AssetQuery,
    /// Maximum results to return (default 20)
    limit: Option<f64>,
}

#[async_trait]
impl Tool for QueryAssetsTool {
    fn name(&self) -> &str {
        "queryCodeInAssets"
    }

    fn description(&self) -> &str {
        "Query asset inventory from Code-In (on-chain database). Use for: \"Show my assets\", \"Find Dell laptops\", \"List all active devices\""
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<QueryInput>()
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let QueryInput { query, limit } = parse_input(self.name(), input)?;
        let limit = to_limit(limit, DEFAULT_QUERY_LIMIT);
        info!(tool = self.name(), ?query, limit, "Ledger query");

        match self.ledger.query_assets(&query).await {
            Ok(assets) => Ok(json!({
                "type": "assets_retrieved",
                "message": format!("Found {} asset(s) from Code-In", assets.len()),
                "assets": assets.into_iter().take(limit).collect::<Vec<_>>(),
                "source": "code-in-placeholder",
                "note": PLACEHOLDER_NOTE,
            })),
            Err(e) => Ok(error_payload("Failed to query Code-In", e.to_string())),
        }
    }
}

// ── storeAssetToCodeIn ────────────────────────────────────────────────────

pub struct StoreAssetTool {
    ledger: Arc<dyn AssetLedger>,
}

impl StoreAssetTool {
    pub fn new(ledger: Arc<dyn AssetLedger>) -> Self {
        Self { ledger }
    }
}

/// Initial status (default active)
#[derive(Debug, Clone, Copy, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
enum InitialStatus {
    Active,
    Maintenance,
    Inactive,
}

impl From<InitialStatus> for AssetStatus {
    fn from(status: InitialStatus) -> Self {
        match status {
            InitialStatus::Active => AssetStatus::Active,
            InitialStatus::Maintenance => AssetStatus::Maintenance,
            InitialStatus::Inactive => AssetStatus::Inactive,
        }
    }
}

#[derive(Deserialize, JsonSchema)]
struct StoreInput {
    /// Asset name
    name: String,
    /// Model number
    model: String,
    /// Manufacturer
    manufacturer: String,
    /// Purchase cost in USD
    purchase_cost: f64,
    status: Option<InitialStatus>,
    /// Physical location
    location: Option<String>,
    /// Additional notes
    notes: Option<String>,
}

impl From<StoreInput> for NewAsset {
    fn from(input: StoreInput) -> Self {
        NewAsset {
            name: input.name,
            model: input.model,
            manufacturer: input.manufacturer,
            purchase_cost: input.purchase_cost,
            status: input.status.map(AssetStatus::from).unwrap_or_default(),
            location: input.location,
            notes: input.notes,
        }
    }
}

#[async_trait]
impl Tool for StoreAssetTool {
    fn name(&self) -> &str {
        "storeAssetToCodeIn"
    }

    fn description(&self) -> &str {
        "Store a new asset to Code-In (on-chain database). Use for: \"Add new laptop\", \"Register device\", \"Create asset\""
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<StoreInput>()
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let asset = NewAsset::from(parse_input::<StoreInput>(self.name(), input)?);
        info!(tool = self.name(), name = %asset.name, "Ledger store");

        match self.ledger.store_asset(&asset).await {
            Ok(receipt) => Ok(json!({
                "type": "asset_stored",
                "message": format!("Asset \"{}\" would be stored on-chain", asset.name),
                "asset_id": receipt.asset_id,
                "tx_signature": receipt.tx_signature,
                "db_pda": receipt.db_pda,
                "explorer_url": receipt.explorer_url(),
                "note": PLACEHOLDER_NOTE,
            })),
            Err(e) => Ok(error_payload("Failed to store asset to Code-In", e.to_string())),
        }
    }
}

// ── updateCodeInAsset ─────────────────────────────────────────────────────

pub struct UpdateAssetTool {
    ledger: Arc<dyn AssetLedger>,
}

impl UpdateAssetTool {
    pub fn new(ledger: Arc<dyn AssetLedger>) -> Self {
        Self { ledger }
    }
}

#[derive(Deserialize, JsonSchema)]
struct UpdateInput {
    /// Asset ID to update
    asset_id: String,
    updates: AssetUpdates,
}

#[async_trait]
impl Tool for UpdateAssetTool {
    fn name(&self) -> &str {
        "updateCodeInAsset"
    }

    fn description(&self) -> &str {
        "Update an existing asset in Code-In. Adds a state change to the asset's transaction history. Use for: \"Update asset status\", \"Change location\", \"Modify asset\""
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<UpdateInput>()
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let UpdateInput { asset_id, updates } = parse_input(self.name(), input)?;
        info!(tool = self.name(), %asset_id, "Ledger update");

        match self.ledger.update_asset(&asset_id, &updates).await {
            Ok(receipt) => Ok(json!({
                "type": "asset_updated",
                "message": "Asset updated successfully (placeholder)",
                "asset_id": receipt.asset_id,
                "tx_signature": receipt.tx_signature,
                "changes": updates,
                "explorer_url": receipt.explorer_url(),
                "note": PLACEHOLDER_NOTE,
            })),
            Err(e) => Ok(error_payload("Failed to update asset", e.to_string())),
        }
    }
}

// ── getAssetHistoryTimeline ───────────────────────────────────────────────

pub struct AssetHistoryTool {
    ledger: Arc<dyn AssetLedger>,
}

impl AssetHistoryTool {
    pub fn new(ledger: Arc<dyn AssetLedger>) -> Self {
        Self { ledger }
    }
}

#[derive(Deserialize, JsonSchema)]
struct HistoryInput {
    /// Asset ID to get history for
    asset_id: String,
    /// Maximum timeline events to return (default 50)
    limit: Option<f64>,
}

#[async_trait]
impl Tool for AssetHistoryTool {
    fn name(&self) -> &str {
        "getAssetHistoryTimeline"
    }

    fn description(&self) -> &str {
        "Retrieve the transaction history for an asset as a timeline. Use for: \"Show asset history\", \"Timeline of changes\", \"Audit trail\""
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<HistoryInput>()
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let HistoryInput { asset_id, limit } = parse_input(self.name(), input)?;
        let limit = to_limit(limit, DEFAULT_TIMELINE_LIMIT);
        info!(tool = self.name(), %asset_id, limit, "Ledger history");

        match self.ledger.asset_history(&asset_id).await {
            Ok(chain) => {
                let total = chain.len();
                let timeline: Vec<TimelineEvent> = chain
                    .iter()
                    .take(limit)
                    .enumerate()
                    .map(|(i, tx)| TimelineEvent::from_transaction(i + 1, tx))
                    .collect();
                Ok(json!({
                    "type": "timeline_retrieved",
                    "message": format!("Retrieved {} timeline event(s) (placeholder)", timeline.len()),
                    "asset_id": asset_id,
                    "timeline": timeline,
                    "total_events": total,
                    "note": PLACEHOLDER_NOTE,
                }))
            }
            Err(e) => Ok(error_payload("Failed to retrieve asset history", e.to_string())),
        }
    }
}

// ── searchCodeInDatabase ──────────────────────────────────────────────────

pub struct SearchDatabaseTool {
    ledger: Arc<dyn AssetLedger>,
}

impl SearchDatabaseTool {
    pub fn new(ledger: Arc<dyn AssetLedger>) -> Self {
        Self { ledger }
    }
}

#[derive(Deserialize, JsonSchema)]
struct DatabaseSearchInput {
    /// Natural language search query
    query: String,
}

#[async_trait]
impl Tool for SearchDatabaseTool {
    fn name(&self) -> &str {
        "searchCodeInDatabase"
    }

    fn description(&self) -> &str {
        "Search across all data in the user's Code-In database. Use for: \"Find all laptops over $2000\", \"Show retired assets\", \"Assets by location\""
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<DatabaseSearchInput>()
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let DatabaseSearchInput { query } = parse_input(self.name(), input)?;
        info!(tool = self.name(), %query, "Ledger search");

        match self.ledger.search(&query).await {
            Ok(results) => Ok(json!({
                "type": "search_complete",
                "message": format!("Found {} result(s) (placeholder)", results.len()),
                "query": query,
                "results": results,
                "note": PLACEHOLDER_NOTE,
            })),
            Err(e) => Ok(error_payload("Search failed", e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{
        LedgerAsset, LedgerError, LedgerTransaction, PlaceholderLedger, WriteReceipt,
        register_ledger_tools,
    };
    use toolchat_core::tool::{ToolCall, ToolRegistry};

    /// A ledger whose every operation fails.
    struct DownLedger;

    #[async_trait]
    impl AssetLedger for DownLedger {
        async fn query_assets(&self, _: &AssetQuery) -> Result<Vec<LedgerAsset>, LedgerError> {
            Err(LedgerError::Unavailable("rpc timeout".into()))
        }
        async fn store_asset(&self, _: &NewAsset) -> Result<WriteReceipt, LedgerError> {
            Err(LedgerError::Rejected("insufficient funds".into()))
        }
        async fn update_asset(
            &self,
            asset_id: &str,
            _: &AssetUpdates,
        ) -> Result<WriteReceipt, LedgerError> {
            Err(LedgerError::AssetNotFound(asset_id.into()))
        }
        async fn asset_history(&self, _: &str) -> Result<Vec<LedgerTransaction>, LedgerError> {
            Err(LedgerError::Unavailable("rpc timeout".into()))
        }
        async fn search(&self, _: &str) -> Result<Vec<Value>, LedgerError> {
            Err(LedgerError::Unavailable("rpc timeout".into()))
        }
    }

    fn registry(ledger: Arc<dyn AssetLedger>) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        register_ledger_tools(&mut registry, ledger).unwrap();
        registry
    }

    async fn invoke(registry: &ToolRegistry, name: &str, arguments: Value) -> Value {
        registry
            .invoke(&ToolCall {
                id: "call_1".into(),
                name: name.into(),
                arguments,
            })
            .await
            .output
    }

    #[tokio::test]
    async fn query_applies_default_limit_and_filters() {
        let registry = registry(Arc::new(PlaceholderLedger));
        let out = invoke(&registry, "queryCodeInAssets", json!({"search_query": "xps"})).await;
        assert_eq!(out["type"], "assets_retrieved");
        assert_eq!(out["message"], "Found 1 asset(s) from Code-In");
        assert_eq!(out["source"], "code-in-placeholder");

        let out = invoke(&registry, "queryCodeInAssets", json!({"limit": 1})).await;
        assert_eq!(out["assets"].as_array().unwrap().len(), 1);
        assert_eq!(out["message"], "Found 2 asset(s) from Code-In");
    }

    #[tokio::test]
    async fn store_defaults_status_and_returns_explorer_link() {
        let registry = registry(Arc::new(PlaceholderLedger));
        let out = invoke(
            &registry,
            "storeAssetToCodeIn",
            json!({"name": "ThinkPad X1", "model": "Gen 11", "manufacturer": "Lenovo", "purchase_cost": 1899}),
        )
        .await;
        assert_eq!(out["type"], "asset_stored");
        assert_eq!(out["message"], "Asset \"ThinkPad X1\" would be stored on-chain");
        let sig = out["tx_signature"].as_str().unwrap();
        assert_eq!(
            out["explorer_url"],
            format!("https://explorer.solana.com/tx/{sig}")
        );
    }

    #[tokio::test]
    async fn update_echoes_changes() {
        let registry = registry(Arc::new(PlaceholderLedger));
        let out = invoke(
            &registry,
            "updateCodeInAsset",
            json!({"asset_id": "asset-1", "updates": {"status": "retired"}}),
        )
        .await;
        assert_eq!(out["type"], "asset_updated");
        assert_eq!(out["changes"], json!({"status": "retired"}));
    }

    #[tokio::test]
    async fn update_rejects_unknown_status() {
        let registry = registry(Arc::new(PlaceholderLedger));
        let out = invoke(
            &registry,
            "updateCodeInAsset",
            json!({"asset_id": "asset-1", "updates": {"status": "stolen"}}),
        )
        .await;
        assert_eq!(out["type"], "error");
    }

    #[tokio::test]
    async fn timeline_respects_limit() {
        let registry = registry(Arc::new(PlaceholderLedger));
        let out = invoke(
            &registry,
            "getAssetHistoryTimeline",
            json!({"asset_id": "asset-1", "limit": 2}),
        )
        .await;
        assert_eq!(out["type"], "timeline_retrieved");
        assert_eq!(out["timeline"].as_array().unwrap().len(), 2);
        assert_eq!(out["total_events"], 3);
        assert_eq!(out["timeline"][1]["title"], "Status Changed");
    }

    #[tokio::test]
    async fn fractional_limits_truncate() {
        let registry = registry(Arc::new(PlaceholderLedger));
        let out = invoke(
            &registry,
            "getAssetHistoryTimeline",
            json!({"asset_id": "asset-1", "limit": 2.0}),
        )
        .await;
        assert_eq!(out["type"], "timeline_retrieved");
        assert_eq!(out["timeline"].as_array().unwrap().len(), 2);

        let out = invoke(&registry, "queryCodeInAssets", json!({"limit": 1.7})).await;
        assert_eq!(out["type"], "assets_retrieved");
        assert_eq!(out["assets"].as_array().unwrap().len(), 1);

        let out = invoke(&registry, "getAssetHistoryTimeline", json!({"asset_id": "asset-1"})).await;
        assert_eq!(out["timeline"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn limits_are_declared_as_numbers() {
        let query = QueryAssetsTool::new(Arc::new(PlaceholderLedger)).parameters_schema();
        assert_eq!(query["properties"]["limit"]["type"], "number");
        assert_eq!(
            query["properties"]["status"]["enum"],
            json!(["active", "maintenance", "inactive", "retired", "all"])
        );
        assert!(query.get("required").is_none());

        let history = AssetHistoryTool::new(Arc::new(PlaceholderLedger)).parameters_schema();
        assert_eq!(history["properties"]["limit"]["type"], "number");
        assert_eq!(history["required"], json!(["asset_id"]));
    }

    #[tokio::test]
    async fn store_rejects_retired_initial_status() {
        let registry = registry(Arc::new(PlaceholderLedger));
        let out = invoke(
            &registry,
            "storeAssetToCodeIn",
            json!({"name": "Old", "model": "M", "manufacturer": "HP", "purchase_cost": 10, "status": "retired"}),
        )
        .await;
        assert_eq!(out["type"], "error");
        assert_eq!(out["message"], "Invalid arguments for storeAssetToCodeIn");
    }

    #[tokio::test]
    async fn search_reports_hits() {
        let registry = registry(Arc::new(PlaceholderLedger));
        let out = invoke(&registry, "searchCodeInDatabase", json!({"query": "laptops"})).await;
        assert_eq!(out["type"], "search_complete");
        assert_eq!(out["results"][0]["relevance_score"], 0.95);
    }

    #[tokio::test]
    async fn ledger_failures_become_error_payloads() {
        let registry = registry(Arc::new(DownLedger));
        let out = invoke(&registry, "queryCodeInAssets", json!({})).await;
        assert_eq!(out["type"], "error");
        assert_eq!(out["message"], "Failed to query Code-In");
        assert!(out["error"].as_str().unwrap().contains("rpc timeout"));

        let out = invoke(
            &registry,
            "updateCodeInAsset",
            json!({"asset_id": "asset-404", "updates": {}}),
        )
        .await;
        assert_eq!(out["message"], "Failed to update asset");
    }
}
