//! Parse one model reply into the next agent step.

use std::sync::LazyLock;

use regex::Regex;

pub const FINAL_ANSWER_ACTION: &str = "Final Answer:";

const MISSING_ACTION_AFTER_THOUGHT: &str = "Invalid Format: Missing 'Action:' after 'Thought:'";
const MISSING_ACTION_INPUT_AFTER_ACTION: &str =
    "Invalid Format: Missing 'Action Input:' after 'Action:'";
const FINAL_ANSWER_AND_ACTION: &str =
    "Parsing LLM output produced both a final answer and a parse-able action";

static ACTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
        .expect("valid regex")
});
static ACTION_ONLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)").expect("valid regex"));
static ACTION_INPUT_ONLY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)").expect("valid regex")
});

/// What the model asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentStep {
    /// The model is done; the text is the answer.
    FinalAnswer(String),
    /// The model wants a tool run.
    ToolCall { tool: String, input: String },
    /// The reply does not follow the expected format.
    ParseFailure {
        /// Short description fed back to the model when recovering
        reason: String,
        /// The raw model output
        output: String,
    },
}

/// Classify a model reply.
pub fn parse_step(text: &str) -> AgentStep {
    let includes_answer = text.contains(FINAL_ANSWER_ACTION);

    if let Some(caps) = ACTION_RE.captures(text) {
        if includes_answer {
            return failure(format!("{}: {}", FINAL_ANSWER_AND_ACTION, text), text);
        }
        let tool = caps[1].trim().to_string();
        // Only spaces, then double quotes; other whitespace is part of the input
        let input = caps[2].trim_matches(' ').trim_matches('"').to_string();
        return AgentStep::ToolCall { tool, input };
    }

    if includes_answer {
        let answer = text
            .rsplit(FINAL_ANSWER_ACTION)
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        return AgentStep::FinalAnswer(answer);
    }

    if !ACTION_ONLY_RE.is_match(text) {
        failure(MISSING_ACTION_AFTER_THOUGHT.to_string(), text)
    } else if !ACTION_INPUT_ONLY_RE.is_match(text) {
        failure(MISSING_ACTION_INPUT_AFTER_ACTION.to_string(), text)
    } else {
        failure(format!("Could not parse LLM output: `{}`", text), text)
    }
}

fn failure(reason: String, output: &str) -> AgentStep {
    AgentStep::ParseFailure {
        reason,
        output: output.to_string(),
    }
}
