//! `toolchat agent` — Interactive or single-message chat mode.
//!
//! Runs the agent in-process and folds its events through a `ChatState`,
//! the same way a browser client would.

use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use toolchat_agent::{Agent, AgentStreamEvent, ChatState, ChatStatus, tool_display_name};
use toolchat_config::AppConfig;

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for API key early — give a clear error
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    OPENAI_API_KEY   = 'sk-...'");
        eprintln!("    TOOLCHAT_API_KEY = 'sk-...'   (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let agent = super::build_agent(&config)?;
    let mut chat = ChatState::new();

    if let Some(msg) = message {
        // Single message mode
        turn(&agent, &mut chat, &msg).await?;
        if chat.status() == ChatStatus::Error {
            return Err(chat.error().unwrap_or("Agent run failed").to_string().into());
        }
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  toolchat agent — interactive mode");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", agent.model());
    println!("  Tools:     {}", agent.tools().names().join(", "));
    println!("  Steps:     up to {} per message", agent.max_steps());
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }
        turn(&agent, &mut chat, line).await?;
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}

/// Submit one message and render the streamed response.
async fn turn(
    agent: &Agent,
    chat: &mut ChatState,
    text: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if chat.submit(text).is_none() {
        return Ok(());
    }

    let mut rx = agent.run_stream(chat.model_messages());
    let mut at_line_start = true;

    while let Some(event) = rx.recv().await {
        match &event {
            AgentStreamEvent::Start { .. } => {
                print!("  Assistant > ");
                at_line_start = false;
            }
            AgentStreamEvent::TextDelta { delta } => {
                print!("{delta}");
                at_line_start = delta.ends_with('\n');
            }
            AgentStreamEvent::ToolCall { tool_name, .. } => {
                if !at_line_start {
                    println!();
                }
                println!("    [{}] running…", tool_display_name(tool_name));
                at_line_start = true;
            }
            AgentStreamEvent::ToolResult {
                tool_name,
                output,
                is_error,
                ..
            } => {
                let summary = output
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("done");
                let mark = if *is_error { "failed" } else { "done" };
                println!(
                    "    [{}] {mark}: {summary}",
                    tool_display_name(tool_name)
                );
                at_line_start = true;
            }
            AgentStreamEvent::Finish { finish_reason, .. } => {
                if !at_line_start {
                    println!();
                }
                if *finish_reason == toolchat_agent::FinishReason::StepLimit {
                    println!("    (stopped after {} steps)", agent.max_steps());
                }
                println!();
            }
            AgentStreamEvent::Error { message } => {
                if !at_line_start {
                    println!();
                }
                eprintln!("  [Error] {message}");
                println!();
            }
            AgentStreamEvent::StepStart { .. } | AgentStreamEvent::StepFinish { .. } => {}
        }
        std::io::stdout().flush()?;
        chat.apply(&event);
    }

    Ok(())
}
