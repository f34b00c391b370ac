//! Record shapes exchanged with the Code-In asset ledger.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    #[default]
    Active,
    Maintenance,
    Inactive,
    Retired,
}

/// An asset record as stored on the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerAsset {
    pub id: String,
    pub name: String,
    pub model: String,
    pub manufacturer: String,
    pub status: AssetStatus,

    pub purchase_cost: f64,
    pub current_value: f64,
    pub currency: String,

    pub purchase_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty_expiry: Option<String>,
    pub created_at: String,
    pub updated_at: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Address of the database account holding this record
    pub db_pda: String,
    /// Most recent transaction in the record's history chain
    pub tail_txid: String,
    pub datatype: String,
}

/// Filter by asset status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    Active,
    Maintenance,
    Inactive,
    Retired,
    All,
}

impl StatusFilter {
    pub fn matches(self, status: AssetStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => status == AssetStatus::Active,
            StatusFilter::Maintenance => status == AssetStatus::Maintenance,
            StatusFilter::Inactive => status == AssetStatus::Inactive,
            StatusFilter::Retired => status == AssetStatus::Retired,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct AssetQuery {
    /// Optional search terms (name, model, manufacturer)
    #[serde(default)]
    pub search_query: Option<String>,
    #[serde(default)]
    pub status: Option<StatusFilter>,
    /// Filter by manufacturer
    #[serde(default)]
    pub manufacturer: Option<String>,
}

impl AssetQuery {
    /// Substring match on name/model/manufacturer, exact status unless `all`,
    /// case-insensitive exact manufacturer.
    pub fn matches(&self, asset: &LedgerAsset) -> bool {
        let text_ok = self.search_query.as_deref().is_none_or(|q| {
            let q = q.to_lowercase();
            [&asset.name, &asset.model, &asset.manufacturer]
                .iter()
                .any(|field| field.to_lowercase().contains(&q))
        });
        let status_ok = self.status.is_none_or(|s| s.matches(asset.status));
        let maker_ok = self
            .manufacturer
            .as_deref()
            .is_none_or(|m| asset.manufacturer.eq_ignore_ascii_case(m));
        text_ok && status_ok && maker_ok
    }
}

/// Fields for a new asset record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAsset {
    pub name: String,
    pub model: String,
    pub manufacturer: String,
    pub purchase_cost: f64,
    pub status: AssetStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Fields to update
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AssetUpdates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AssetStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Identifiers returned by a ledger write.
#[derive(Debug, Clone, Serialize)]
pub struct WriteReceipt {
    pub asset_id: String,
    pub tx_signature: String,
    pub db_pda: String,
}

impl WriteReceipt {
    pub fn explorer_url(&self) -> String {
        format!("https://explorer.solana.com/tx/{}", self.tx_signature)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionAction {
    Created,
    Updated,
    StatusChanged,
    Transferred,
    Retired,
}

/// One link in an asset's transaction history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub tx_id: String,
    pub timestamp: String,
    pub block_height: u64,

    pub asset_id: String,

    pub action: TransactionAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_changed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,

    pub wallet_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_tx_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_tx_id: Option<String>,

    pub db_pda: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub field: String,
    pub from: Value,
    pub to: Value,
}

/// A history entry shaped for display.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineEvent {
    pub id: String,
    pub timestamp: String,
    pub title: String,
    pub description: String,
    pub action: TransactionAction,
    pub actor: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<FieldChange>,
    pub tx_id: String,
    pub block_height: u64,
    pub icon: &'static str,
    pub color: &'static str,
}

impl TimelineEvent {
    /// Derive the display event for the `seq`-th (1-based) transaction.
    pub fn from_transaction(seq: usize, tx: &LedgerTransaction) -> Self {
        let field = tx.field_changed.as_deref();
        let (title, description, icon, color) = match (tx.action, field) {
            (TransactionAction::Created, _) => (
                "Asset Created".to_string(),
                "Asset was registered in the system".to_string(),
                "plus",
                "success",
            ),
            (TransactionAction::StatusChanged, _) => (
                "Status Changed".to_string(),
                "Asset status was updated".to_string(),
                "edit",
                "warning",
            ),
            (TransactionAction::Updated, Some("location")) => (
                "Location Updated".to_string(),
                "Asset was moved to a new location".to_string(),
                "map-pin",
                "primary",
            ),
            (TransactionAction::Updated, Some(other)) => (
                format!("{} Updated", capitalize(&other.replace('_', " "))),
                format!("Asset {} was changed", other.replace('_', " ")),
                "edit",
                "primary",
            ),
            (TransactionAction::Updated, None) => (
                "Asset Updated".to_string(),
                "Asset details were changed".to_string(),
                "edit",
                "primary",
            ),
            (TransactionAction::Transferred, _) => (
                "Asset Transferred".to_string(),
                "Asset was assigned to a new holder".to_string(),
                "user",
                "primary",
            ),
            (TransactionAction::Retired, _) => (
                "Asset Retired".to_string(),
                "Asset was retired from service".to_string(),
                "archive",
                "danger",
            ),
        };

        let changes = match field {
            Some(name) => vec![FieldChange {
                field: name.to_string(),
                from: tx.old_value.clone().unwrap_or(Value::Null),
                to: tx.new_value.clone().unwrap_or(Value::Null),
            }],
            None => Vec::new(),
        };

        Self {
            id: format!("event-{seq}"),
            timestamp: tx.timestamp.clone(),
            title,
            description,
            action: tx.action,
            actor: tx
                .actor_name
                .clone()
                .unwrap_or_else(|| tx.wallet_address.clone()),
            changes,
            tx_id: tx.tx_id.clone(),
            block_height: tx.block_height,
            icon,
            color,
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
