//! Code-In asset ledger integration.
//!
//! [`AssetLedger`] describes the five operations the ledger tools need.
//! [`PlaceholderLedger`] answers them with fixed data until a real client
//! exists. Writes fabricate identifiers and promise nothing about
//! idempotency: a retried call produces a second, different signature.

pub mod placeholder;
pub mod tools;
pub mod types;

use async_trait::async_trait;
use std::sync::Arc;
use toolchat_core::error::ToolError;
use toolchat_core::tool::ToolRegistry;

pub use placeholder::PlaceholderLedger;
pub use types::*;

/// Ledger operation failures. The tools report these to the model as
/// `{type: "error"}` payloads.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Transaction rejected: {0}")]
    Rejected(String),
}

/// An on-chain asset store.
#[async_trait]
pub trait AssetLedger: Send + Sync {
    /// Assets matching the query, in ledger order.
    async fn query_assets(&self, query: &AssetQuery) -> Result<Vec<LedgerAsset>, LedgerError>;

    /// Create a new asset record.
    async fn store_asset(&self, asset: &NewAsset) -> Result<WriteReceipt, LedgerError>;

    /// Apply a partial update to an existing record.
    async fn update_asset(
        &self,
        asset_id: &str,
        updates: &AssetUpdates,
    ) -> Result<WriteReceipt, LedgerError>;

    /// The asset's transaction chain, oldest first.
    async fn asset_history(&self, asset_id: &str) -> Result<Vec<LedgerTransaction>, LedgerError>;

    /// Free-text search across the user's database. Each hit is a JSON
    /// object with at least `id` and `relevance_score`.
    async fn search(&self, query: &str) -> Result<Vec<serde_json::Value>, LedgerError>;
}

/// Register the five ledger tools against `ledger`.
pub fn register_ledger_tools(
    registry: &mut ToolRegistry,
    ledger: Arc<dyn AssetLedger>,
) -> Result<(), ToolError> {
    registry.register(Box::new(tools::QueryAssetsTool::new(ledger.clone())))?;
    registry.register(Box::new(tools::StoreAssetTool::new(ledger.clone())))?;
    registry.register(Box::new(tools::UpdateAssetTool::new(ledger.clone())))?;
    registry.register(Box::new(tools::AssetHistoryTool::new(ledger.clone())))?;
    registry.register(Box::new(tools::SearchDatabaseTool::new(ledger)))?;
    Ok(())
}
