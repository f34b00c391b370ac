//! `toolchat gateway` — Start the HTTP chat server.

use toolchat_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    if !config.has_api_key() {
        return Err("No API key configured. Run `toolchat doctor` for details.".into());
    }

    println!("toolchat gateway");
    println!("   Listening:  {}:{}", config.gateway.host, config.gateway.port);
    println!("   Model:      {}", config.default_model);
    println!("   Time limit: {}s per chat", config.gateway.max_duration_secs);

    toolchat_gateway::start(config).await?;

    Ok(())
}
