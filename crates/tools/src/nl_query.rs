//! Natural-language asset query tool.
//!
//! Makes a second, independent model call that turns the user's question
//! into a structured [`QueryPlan`], then answers from a canned table keyed
//! by the plan's query type. Any failure of the inner call is reported as a
//! `query_error` payload rather than a tool error.

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use toolchat_core::error::{ProviderError, ToolError};
use toolchat_core::provider::{ObjectRequest, Provider};
use toolchat_core::schema::{NonEmptyString, parse_input, schema_of};
use toolchat_core::tool::Tool;
use tracing::{debug, error};

const PLANNER_SYSTEM_PROMPT: &str = "You are an IT asset analytics expert. Convert natural language queries into structured query descriptions.

The asset database contains:
- name, model, manufacturer (text fields)
- status: Active, Inactive, Maintenance
- purchase_cost, current_value (numeric)
- purchase_date (date)
- location (text)

Analyze the user's query and describe what information they're looking for.";

/// Type of analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Count,
    Sum,
    Average,
    List,
    Comparison,
}

/// The structured description produced by the planner model.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct QueryPlan {
    /// Brief description of what the query is finding
    pub description: String,
    pub query_type: QueryType,
    /// Main insight or takeaway from the query
    pub takeaway: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct NlQueryInput {
    /// Natural language query about assets (e.g., "How many assets cost over $1000?", "Show total value by status")
    query: NonEmptyString,
}

/// Canned result rows for each query type.
fn sample_rows(query_type: QueryType) -> Value {
    match query_type {
        QueryType::Count => json!([
            { "category": "Apple", "count": 8 },
            { "category": "Dell", "count": 6 },
            { "category": "Microsoft", "count": 5 },
            { "category": "HP", "count": 5 },
        ]),
        QueryType::Sum | QueryType::Average => json!([
            { "category": "Apple", "value": 24500, "count": 8 },
            { "category": "Dell", "value": 15600, "count": 6 },
            { "category": "Microsoft", "value": 12800, "count": 5 },
        ]),
        QueryType::Comparison => json!([
            { "category": "Active", "count": 18, "percentage": 75 },
            { "category": "Maintenance", "count": 4, "percentage": 17 },
            { "category": "Inactive", "count": 2, "percentage": 8 },
        ]),
        QueryType::List => json!([
            { "name": "MacBook Pro 16\"", "manufacturer": "Apple", "value": 3500, "status": "Active" },
            { "name": "Dell XPS 15", "manufacturer": "Dell", "value": 2200, "status": "Active" },
            { "name": "Surface Laptop 5", "manufacturer": "Microsoft", "value": 1800, "status": "Maintenance" },
        ]),
    }
}

pub struct NlQueryTool {
    provider: Arc<dyn Provider>,
    model: String,
}

impl NlQueryTool {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    async fn plan(&self, query: &str) -> Result<QueryPlan, ProviderError> {
        let object = self
            .provider
            .generate_object(ObjectRequest {
                model: self.model.clone(),
                system: PLANNER_SYSTEM_PROMPT.into(),
                prompt: format!("Convert this query into a structured description: \"{query}\""),
                schema_name: "asset_query".into(),
                schema: schema_of::<QueryPlan>(),
            })
            .await?;
        serde_json::from_value(object).map_err(|e| ProviderError::InvalidObject(e.to_string()))
    }
}

#[async_trait]
impl Tool for NlQueryTool {
    fn name(&self) -> &str {
        "queryAssetsNaturalLanguage"
    }

    fn description(&self) -> &str {
        "Advanced natural language query tool for complex asset analytics. \
         Converts natural language into a structured query description. \
         Use this for complex questions like: \"Show me the total cost of all Dell laptops\", \
         \"What's the average value of assets by manufacturer?\", \
         \"How many assets were purchased in the last 6 months?\", \
         \"Compare active vs inactive asset counts\""
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<NlQueryInput>()
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let NlQueryInput { query } = parse_input(self.name(), input)?;
        let query = query.as_str();

        let plan = match self.plan(query).await {
            Ok(plan) => plan,
            Err(e) => {
                error!(error = %e, "Natural language query planning failed");
                return Ok(json!({
                    "type": "query_error",
                    "message": "Failed to process natural language query",
                    "error": e.to_string(),
                }));
            }
        };
        debug!(query_type = ?plan.query_type, "Query planned");

        let rows = sample_rows(plan.query_type);
        let row_count = rows.as_array().map_or(0, Vec::len);

        Ok(json!({
            "type": "query_success",
            "message": "Natural language query processed successfully",
            "original_query": query,
            "description": plan.description,
            "query_type": plan.query_type,
            "takeaway": plan.takeaway,
            "data": rows,
            "rowCount": row_count,
            "note": "This demonstrates model-driven query generation with structured output. Real integration would execute against your database.",
        }))
    }
}
