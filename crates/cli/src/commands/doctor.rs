//! `toolchat doctor` — Diagnose configuration and provider reachability.

use std::time::Duration;
use toolchat_config::AppConfig;
use toolchat_core::Provider;

const PING_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of asking the provider whether it is up.
#[derive(Debug, PartialEq)]
enum Reachability {
    Reachable,
    Unhealthy,
    Failed(String),
    TimedOut,
}

async fn ping_provider(provider: &dyn Provider, timeout: Duration) -> Reachability {
    match tokio::time::timeout(timeout, provider.health_check()).await {
        Ok(Ok(true)) => Reachability::Reachable,
        Ok(Ok(false)) => Reachability::Unhealthy,
        Ok(Err(e)) => Reachability::Failed(e.to_string()),
        Err(_) => Reachability::TimedOut,
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("toolchat doctor");
    println!("===============\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found: {}", config_path.display());
    } else {
        println!("  ⚠️  No config file; using defaults (run `toolchat onboard`)");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  1 issue(s) found. See above for details.");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  ✅ API key configured for '{}'", config.default_provider);
    } else {
        println!("  ❌ No API key; set OPENAI_API_KEY or api_key in config.toml");
        issues += 1;
    }

    println!("  ℹ️  Model: {}", config.default_model);
    println!("  ℹ️  Query model: {}", config.query_model());
    println!("  ℹ️  Max steps: {}", config.agent.max_steps);

    match super::build_agent(&config) {
        Ok(agent) => println!("  ✅ {} tools registered", agent.tools().len()),
        Err(e) => {
            println!("  ❌ Agent setup failed: {e}");
            issues += 1;
        }
    }

    if config.has_api_key() {
        let providers = toolchat_providers::build_from_config(&config);
        if let Some(provider) = providers.default_provider() {
            match ping_provider(provider.as_ref(), PING_TIMEOUT).await {
                Reachability::Reachable => {
                    println!("  ✅ Provider '{}' is reachable", provider.name())
                }
                Reachability::Unhealthy => {
                    println!("  ❌ Provider '{}' rejected the health check", provider.name());
                    issues += 1;
                }
                Reachability::Failed(e) => {
                    println!("  ❌ Provider '{}' unreachable: {e}", provider.name());
                    issues += 1;
                }
                Reachability::TimedOut => {
                    println!(
                        "  ❌ Provider '{}' did not answer within {}s",
                        provider.name(),
                        PING_TIMEOUT.as_secs()
                    );
                    issues += 1;
                }
            }
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
