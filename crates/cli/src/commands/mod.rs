pub mod agent;
pub mod doctor;
pub mod gateway;
pub mod onboard;
pub mod tools;

use toolchat_agent::Agent;
use toolchat_config::AppConfig;

/// Build the agent the way the gateway does.
pub fn build_agent(config: &AppConfig) -> Result<Agent, Box<dyn std::error::Error>> {
    let providers = toolchat_providers::build_from_config(config);
    let provider = providers
        .default_provider()
        .ok_or_else(|| format!("Provider '{}' is not configured", config.default_provider))?;
    Ok(Agent::from_config(config, provider)?)
}
