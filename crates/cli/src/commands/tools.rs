//! `toolchat tools` — List the agent's tools.

use toolchat_agent::tool_display_name;
use toolchat_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let agent = super::build_agent(&config)?;

    println!("Tools ({})", agent.tools().len());
    println!("=========\n");
    for def in agent.tools().definitions() {
        println!("  {} ({})", tool_display_name(&def.name), def.name);
        println!("    {}", def.description);
        if let Some(props) = def.parameters.get("properties").and_then(|p| p.as_object()) {
            let names: Vec<&str> = props.keys().map(String::as_str).collect();
            if !names.is_empty() {
                println!("    args: {}", names.join(", "));
            }
        }
        println!();
    }

    if !config.agent.enable_ledger_tools {
        println!("  Ledger tools are off; set agent.enable_ledger_tools = true to attach them.");
    }

    Ok(())
}
