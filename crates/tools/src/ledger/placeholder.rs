//! Fixed-data stand-in for the Code-In ledger.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use uuid::Uuid;

use super::{
    AssetLedger, AssetQuery, AssetStatus, AssetUpdates, LedgerAsset, LedgerError,
    LedgerTransaction, NewAsset, TransactionAction, WriteReceipt,
};

pub const PLACEHOLDER_DB_PDA: &str = "mock_db_pda_address";

#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderLedger;

impl PlaceholderLedger {
    pub fn new() -> Self {
        Self
    }

    fn assets() -> Vec<LedgerAsset> {
        vec![
            LedgerAsset {
                id: "asset-1".into(),
                name: "MacBook Pro 16\"".into(),
                model: "M3 Max".into(),
                manufacturer: "Apple".into(),
                status: AssetStatus::Active,
                purchase_cost: 3500.0,
                current_value: 3200.0,
                currency: "USD".into(),
                purchase_date: "2024-01-15T00:00:00Z".into(),
                warranty_expiry: None,
                created_at: "2024-01-15T10:30:00Z".into(),
                updated_at: "2024-01-15T10:30:00Z".into(),
                location: Some("San Francisco Office".into()),
                assigned_to: Some("Engineering Team".into()),
                department: None,
                tags: vec![],
                notes: None,
                db_pda: PLACEHOLDER_DB_PDA.into(),
                tail_txid: "mock_tail_txid_1".into(),
                datatype: "asset_record".into(),
            },
            LedgerAsset {
                id: "asset-2".into(),
                name: "Dell XPS 15".into(),
                model: "XPS-9530".into(),
                manufacturer: "Dell".into(),
                status: AssetStatus::Active,
                purchase_cost: 2200.0,
                current_value: 1900.0,
                currency: "USD".into(),
                purchase_date: "2024-02-20T00:00:00Z".into(),
                warranty_expiry: None,
                created_at: "2024-02-20T14:20:00Z".into(),
                updated_at: "2024-02-20T14:20:00Z".into(),
                location: Some("New York Office".into()),
                assigned_to: None,
                department: None,
                tags: vec![],
                notes: None,
                db_pda: PLACEHOLDER_DB_PDA.into(),
                tail_txid: "mock_tail_txid_2".into(),
                datatype: "asset_record".into(),
            },
        ]
    }

    fn history(asset_id: &str) -> Vec<LedgerTransaction> {
        let tx = |tx_id: &str,
                  timestamp: &str,
                  block_height: u64,
                  action: TransactionAction,
                  change: Option<(&str, Value, Value)>,
                  actor: &str,
                  wallet: &str| {
            let (field_changed, old_value, new_value) = match change {
                Some((field, from, to)) => (Some(field.to_string()), Some(from), Some(to)),
                None => (None, None, None),
            };
            LedgerTransaction {
                tx_id: tx_id.into(),
                timestamp: timestamp.into(),
                block_height,
                asset_id: asset_id.into(),
                action,
                field_changed,
                old_value,
                new_value,
                wallet_address: wallet.into(),
                actor_name: Some(actor.into()),
                previous_tx_id: None,
                next_tx_id: None,
                db_pda: PLACEHOLDER_DB_PDA.into(),
            }
        };

        let mut chain = vec![
            tx(
                "mock_tx_creation",
                "2024-01-15T10:30:00.000Z",
                123_456_789,
                TransactionAction::Created,
                None,
                "John Doe",
                "mock_wallet_john",
            ),
            tx(
                "mock_tx_update_1",
                "2024-02-01T14:20:00.000Z",
                123_457_890,
                TransactionAction::StatusChanged,
                Some(("status", json!("active"), json!("maintenance"))),
                "Jane Smith",
                "mock_wallet_jane",
            ),
            tx(
                "mock_tx_update_2",
                "2024-02-10T09:15:00.000Z",
                123_458_901,
                TransactionAction::Updated,
                Some((
                    "location",
                    json!("San Francisco Office"),
                    json!("New York Office"),
                )),
                "John Doe",
                "mock_wallet_john",
            ),
        ];

        // Link the chain both ways
        for i in 0..chain.len() {
            if i > 0 {
                chain[i].previous_tx_id = Some(chain[i - 1].tx_id.clone());
            }
            if i + 1 < chain.len() {
                chain[i].next_tx_id = Some(chain[i + 1].tx_id.clone());
            }
        }
        chain
    }

    fn receipt(asset_id: String) -> WriteReceipt {
        WriteReceipt {
            asset_id,
            tx_signature: fake_signature(),
            db_pda: PLACEHOLDER_DB_PDA.into(),
        }
    }
}

/// `mock_tx_<millis>_<9 random chars>`; unique per call.
fn fake_signature() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("mock_tx_{}_{}", Utc::now().timestamp_millis(), &random[..9])
}

#[async_trait]
impl AssetLedger for PlaceholderLedger {
    async fn query_assets(&self, query: &AssetQuery) -> Result<Vec<LedgerAsset>, LedgerError> {
        Ok(Self::assets()
            .into_iter()
            .filter(|asset| query.matches(asset))
            .collect())
    }

    async fn store_asset(&self, _asset: &NewAsset) -> Result<WriteReceipt, LedgerError> {
        Ok(Self::receipt(format!(
            "asset_{}",
            Utc::now().timestamp_millis()
        )))
    }

    async fn update_asset(
        &self,
        asset_id: &str,
        _updates: &AssetUpdates,
    ) -> Result<WriteReceipt, LedgerError> {
        Ok(Self::receipt(asset_id.to_string()))
    }

    async fn asset_history(&self, asset_id: &str) -> Result<Vec<LedgerTransaction>, LedgerError> {
        Ok(Self::history(asset_id))
    }

    async fn search(&self, _query: &str) -> Result<Vec<Value>, LedgerError> {
        Ok(vec![json!({
            "id": "asset-1",
            "name": "MacBook Pro 16\"",
            "manufacturer": "Apple",
            "status": "active",
            "relevance_score": 0.95,
        })])
    }
}
