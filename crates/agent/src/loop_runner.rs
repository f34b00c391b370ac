//! The agent definition and its bounded run loop.

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use std::sync::Arc;
use tokio::sync::mpsc;
use toolchat_config::AppConfig;
use toolchat_core::error::{ProviderError, ToolError};
use toolchat_core::message::{Message, MessageToolCall};
use toolchat_core::provider::{Provider, ProviderRequest, Usage};
use toolchat_core::tool::{ToolCall, ToolRegistry, ToolResult};
use toolchat_tools::ledger::{PlaceholderLedger, register_ledger_tools};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::stream_event::{AgentStreamEvent, FinishReason};

/// System prompt for the demo agent.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a helpful AI assistant with access to various tools for demonstrations.

**Your Tools:**
1. **calculator** - Perform math calculations (add, subtract, multiply, divide)
2. **getCurrentTime** - Get current date and time (optionally in specific timezone)
3. **searchAssets** - Search for IT assets (demo with mock data)
4. **getAssetStatistics** - Get predefined asset statistics (demo with mock data)
5. **queryAssetsNaturalLanguage** - AI-powered natural language analytics queries (demonstrates structured output)

**Guidelines:**
- When users ask questions that need tools, use them naturally
- Explain what you're doing in a friendly, conversational way
- After using a tool, interpret the results for the user
- For asset tools, note that this is demo data for integration testing

**Tool Selection:**
- Simple searches → Use searchAssets (e.g., "find Dell laptops")
- Predefined metrics → Use getAssetStatistics (e.g., "total count")
- Complex analytics → Use queryAssetsNaturalLanguage (e.g., "total cost of Dell laptops", "average value by manufacturer")

**Examples:**
- Math questions → Use calculator
- "What time is it?" → Use getCurrentTime
- "Find Apple devices" → Use searchAssets
- "How many assets total?" → Use getAssetStatistics
- "What's the total value of active assets?" → Use queryAssetsNaturalLanguage

Be concise, helpful, and demonstrate clear tool usage patterns."#;

/// Appended to the system prompt when the ledger tools are attached.
const LEDGER_PROMPT_SUFFIX: &str = r#"

**Code-In Ledger Tools (placeholder):**
- **queryCodeInAssets**, **storeAssetToCodeIn**, **updateCodeInAsset**, **getAssetHistoryTimeline**, **searchCodeInDatabase**
- These return placeholder data until the ledger integration is complete; say so when you use them."#;

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub message_id: String,
    pub finish_reason: FinishReason,
    /// All streamed text, across steps
    pub text: String,
    /// Model calls made
    pub steps: usize,
    /// Tool calls executed
    pub tool_calls: usize,
    pub usage: Option<Usage>,
}

/// An agent definition: model, instructions, tools and a step budget.
///
/// Immutable once built and cheap to clone; every run gets its own history
/// and step counter.
#[derive(Clone)]
pub struct Agent {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    system_prompt: String,

    /// Tool registry
    tools: Arc<ToolRegistry>,

    /// Maximum model calls per run
    max_steps: usize,

    temperature: Option<f32>,

    max_tokens: Option<u32>,
}

impl Agent {
    /// Create an agent with the default prompt and a budget of 5 steps.
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, tools: ToolRegistry) -> Self {
        Self {
            provider,
            model: model.into(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            tools: Arc::new(tools),
            max_steps: 5,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Build the demo agent described by `config`.
    ///
    /// Registers the demo tools, plus the ledger tools when
    /// `agent.enable_ledger_tools` is set.
    pub fn from_config(config: &AppConfig, provider: Arc<dyn Provider>) -> Result<Self, ToolError> {
        let mut tools = toolchat_tools::demo_registry(provider.clone(), config.query_model())?;

        let mut system_prompt = config
            .agent
            .system_prompt_override
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        if config.agent.enable_ledger_tools {
            register_ledger_tools(&mut tools, Arc::new(PlaceholderLedger::new()))?;
            if config.agent.system_prompt_override.is_none() {
                system_prompt.push_str(LEDGER_PROMPT_SUFFIX);
            }
        }

        let mut agent = Self::new(provider, &config.default_model, tools)
            .with_system_prompt(system_prompt)
            .with_max_steps(config.agent.max_steps);
        if let Some(temperature) = config.default_temperature {
            agent = agent.with_temperature(temperature);
        }
        if let Some(max_tokens) = config.default_max_tokens {
            agent = agent.with_max_tokens(max_tokens);
        }
        Ok(agent)
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Set the maximum number of model calls per run (at least 1).
    pub fn with_max_steps(mut self, max: usize) -> Self {
        self.max_steps = max.max(1);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Start a run on its own task and return the event stream.
    ///
    /// Dropping the receiver does not cancel the run.
    pub fn run_stream(&self, history: Vec<Message>) -> mpsc::Receiver<AgentStreamEvent> {
        let (tx, rx) = mpsc::channel(128);
        let agent = self.clone();
        tokio::spawn(async move {
            let _ = agent.run(history, tx).await;
        });
        rx
    }

    /// Drive one run to completion, sending events to `tx`.
    ///
    /// Send failures are ignored so a departed receiver never interrupts
    /// tool execution. Transport failures emit an `error` event and are
    /// returned.
    pub async fn run(
        &self,
        mut history: Vec<Message>,
        tx: mpsc::Sender<AgentStreamEvent>,
    ) -> Result<RunSummary, ProviderError> {
        let message_id = Uuid::new_v4().to_string();
        let tool_defs = self.tools.definitions();
        let mut text = String::new();
        let mut usage: Option<Usage> = None;
        let mut total_tool_calls = 0usize;

        info!(
            message_id = %message_id,
            model = %self.model,
            messages = history.len(),
            "Starting agent run"
        );

        let _ = tx
            .send(AgentStreamEvent::Start {
                message_id: message_id.clone(),
            })
            .await;

        for step in 1..=self.max_steps {
            let _ = tx.send(AgentStreamEvent::StepStart { step }).await;

            let mut messages = Vec::with_capacity(history.len() + 1);
            messages.push(Message::system(&self.system_prompt));
            messages.extend(history.iter().cloned());

            let request = ProviderRequest {
                model: self.model.clone(),
                messages,
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: tool_defs.clone(),
                stream: true,
            };

            let (content, calls, step_usage) = match self.stream_step(request, &tx).await {
                Ok(parts) => parts,
                Err(e) => {
                    error!(message_id = %message_id, step, error = %e, "Model call failed");
                    let _ = tx
                        .send(AgentStreamEvent::Error {
                            message: e.to_string(),
                        })
                        .await;
                    return Err(e);
                }
            };

            text.push_str(&content);
            if let Some(u) = step_usage {
                usage = Some(usage.unwrap_or_default().add(u));
            }

            // ── Final answer ──
            if calls.is_empty() {
                history.push(Message::assistant(content));
                let _ = tx
                    .send(AgentStreamEvent::StepFinish {
                        step,
                        finish_reason: FinishReason::Stop,
                    })
                    .await;
                return Ok(self
                    .finish(&tx, message_id, FinishReason::Stop, text, step, total_tool_calls, usage)
                    .await);
            }

            // ── Tool calls ──
            debug!(step, count = calls.len(), "Model requested tools");
            history.push(Message::assistant(content).with_tool_calls(calls.clone()));

            let calls: Vec<ToolCall> = calls.iter().map(ToolCall::from).collect();
            for call in &calls {
                let _ = tx
                    .send(AgentStreamEvent::ToolCall {
                        tool_call_id: call.id.clone(),
                        tool_name: call.name.clone(),
                        input: call.arguments.clone(),
                    })
                    .await;
            }

            let results = self.execute_tools(&calls, &tx).await;
            for result in results {
                history.push(Message::tool_result(
                    result.call_id,
                    result.output.to_string(),
                ));
            }
            total_tool_calls += calls.len();

            let _ = tx
                .send(AgentStreamEvent::StepFinish {
                    step,
                    finish_reason: FinishReason::ToolCalls,
                })
                .await;
        }

        warn!(
            message_id = %message_id,
            max_steps = self.max_steps,
            "Step limit reached with tool calls outstanding"
        );
        Ok(self
            .finish(
                &tx,
                message_id,
                FinishReason::StepLimit,
                text,
                self.max_steps,
                total_tool_calls,
                usage,
            )
            .await)
    }

    /// Stream one model call, forwarding text deltas.
    ///
    /// Returns the full text, the completed tool calls in the order the
    /// model issued them, and the call's usage.
    async fn stream_step(
        &self,
        request: ProviderRequest,
        tx: &mpsc::Sender<AgentStreamEvent>,
    ) -> Result<(String, Vec<MessageToolCall>, Option<Usage>), ProviderError> {
        let mut stream_rx = self.provider.stream(request).await?;

        let mut content = String::new();
        let mut calls: Vec<MessageToolCall> = Vec::new();
        let mut usage = None;

        while let Some(chunk) = stream_rx.recv().await {
            let chunk = chunk?;

            if let Some(text) = chunk.content
                && !text.is_empty()
            {
                content.push_str(&text);
                let _ = tx.send(AgentStreamEvent::TextDelta { delta: text }).await;
            }

            // Merge argument fragments that share an id
            for tc in chunk.tool_calls {
                match calls.iter_mut().find(|existing| existing.id == tc.id) {
                    Some(existing) => existing.arguments.push_str(&tc.arguments),
                    None => calls.push(tc),
                }
            }

            if chunk.usage.is_some() {
                usage = chunk.usage;
            }
            if chunk.done {
                break;
            }
        }

        Ok((content, calls, usage))
    }

    /// Run every call concurrently.
    ///
    /// Emits `tool_result` as each call completes and returns the results in
    /// issue order.
    async fn execute_tools(
        &self,
        calls: &[ToolCall],
        tx: &mpsc::Sender<AgentStreamEvent>,
    ) -> Vec<ToolResult> {
        let mut pending: FuturesUnordered<_> = calls
            .iter()
            .enumerate()
            .map(|(index, call)| async move { (index, self.tools.invoke(call).await) })
            .collect();

        let mut slots: Vec<Option<ToolResult>> = vec![None; calls.len()];
        while let Some((index, result)) = pending.next().await {
            debug!(
                tool = %result.tool_name,
                call_id = %result.call_id,
                success = result.success,
                "Tool call completed"
            );
            let _ = tx
                .send(AgentStreamEvent::ToolResult {
                    tool_call_id: result.call_id.clone(),
                    tool_name: result.tool_name.clone(),
                    output: result.output.clone(),
                    is_error: !result.success,
                })
                .await;
            slots[index] = Some(result);
        }

        slots.into_iter().flatten().collect()
    }

    #[allow(clippy::too_many_arguments)]
    async fn finish(
        &self,
        tx: &mpsc::Sender<AgentStreamEvent>,
        message_id: String,
        finish_reason: FinishReason,
        text: String,
        steps: usize,
        tool_calls: usize,
        usage: Option<Usage>,
    ) -> RunSummary {
        info!(
            message_id = %message_id,
            steps,
            tool_calls,
            finish_reason = ?finish_reason,
            "Agent run finished"
        );
        let _ = tx
            .send(AgentStreamEvent::Finish {
                message_id: message_id.clone(),
                finish_reason,
                steps,
                tool_calls,
                usage,
            })
            .await;
        RunSummary {
            message_id,
            finish_reason,
            text,
            steps,
            tool_calls,
            usage,
        }
    }
}
