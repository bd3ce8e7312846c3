//! Core agent loop implementation.

use std::sync::Arc;

use thiserror::Error;

use crate::config::Config;
use crate::credential::Credential;
use crate::llm::{ChatMessage, CompletionRequest, LlmClient, LlmError};
use crate::session::Message;
use crate::tools::{ToolError, ToolRegistry};

use super::parser::{parse_step, AgentStep};
use super::prompt::{build_prompt, record_step, STOP_SEQUENCES};

/// Answer returned when the loop runs out of iterations.
pub const ITERATION_LIMIT_ANSWER: &str = "Agent stopped due to iteration limit or time limit.";

#[derive(Debug, Error)]
pub enum AgentError {
    /// The model's reply could not be interpreted as an action or an answer.
    #[error("Could not parse LLM output: `{output}`")]
    OutputParsing { output: String, reason: String },

    #[error("tool '{tool}' failed: {source}")]
    Tool {
        tool: String,
        #[source]
        source: ToolError,
    },

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("no model API key was provided")]
    MissingCredential,
}

/// Loop settings.
#[derive(Debug, Clone)]
pub struct AgentOptions {
    pub model: String,
    pub max_iterations: usize,
    /// Feed parse failures back to the model instead of ending the turn
    pub recover_parse_errors: bool,
}

impl From<&Config> for AgentOptions {
    fn from(config: &Config) -> Self {
        Self {
            model: config.model.clone(),
            max_iterations: config.max_iterations,
            recover_parse_errors: config.recover_parse_errors,
        }
    }
}

/// The reason-act agent.
pub struct Agent {
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    options: AgentOptions,
}

impl Agent {
    pub fn new(llm: Arc<dyn LlmClient>, tools: ToolRegistry, options: AgentOptions) -> Self {
        Self {
            llm,
            tools,
            options,
        }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Answer the latest question in `history`.
    ///
    /// Tool observations stay in the scratchpad; only the final text is
    /// returned to the caller.
    pub async fn run(&self, history: &[Message], api_key: &Credential) -> Result<String, AgentError> {
        let mut scratchpad = String::new();

        for iteration in 0..self.options.max_iterations {
            tracing::debug!("Agent iteration {}", iteration + 1);

            let prompt = build_prompt(&self.tools, history, &scratchpad);
            let messages = [ChatMessage::user(prompt)];
            let output = self
                .llm
                .complete(
                    api_key,
                    CompletionRequest {
                        model: &self.options.model,
                        messages: &messages,
                        stop: STOP_SEQUENCES,
                    },
                )
                .await?;

            match parse_step(&output) {
                AgentStep::FinalAnswer(answer) => {
                    tracing::debug!("Agent finished after {} iteration(s)", iteration + 1);
                    return Ok(answer);
                }
                AgentStep::ToolCall { tool, input } => {
                    let observation = self.call_tool(&tool, &input).await?;
                    record_step(&mut scratchpad, &output, &observation);
                }
                AgentStep::ParseFailure { reason, output } => {
                    if !self.options.recover_parse_errors {
                        tracing::debug!("Unparseable model output: {}", reason);
                        return Err(AgentError::OutputParsing { output, reason });
                    }
                    tracing::debug!("Feeding parse failure back to the model: {}", reason);
                    record_step(&mut scratchpad, &output, &reason);
                }
            }
        }

        tracing::warn!(
            "Max iterations ({}) reached without a final answer",
            self.options.max_iterations
        );
        Ok(ITERATION_LIMIT_ANSWER.to_string())
    }

    /// Run a tool; unknown names become an observation listing the valid ones.
    async fn call_tool(&self, name: &str, input: &str) -> Result<String, AgentError> {
        let Some(tool) = self.tools.get(name) else {
            tracing::debug!("Model asked for unknown tool '{}'", name);
            return Ok(format!(
                "{} is not a valid tool, try one of [{}].",
                name,
                self.tools.names().join(", ")
            ));
        };

        tracing::debug!("Calling tool {} with input: {}", name, input);
        let result = tool.invoke(input).await.map_err(|source| {
            tracing::warn!("Tool {} failed: {}", name, source);
            AgentError::Tool {
                tool: name.to_string(),
                source,
            }
        })?;
        tracing::debug!("Tool {} returned {} chars", name, result.chars().count());

        Ok(result)
    }
}
