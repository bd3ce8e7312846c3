//! Zero-shot reason-act prompt for the agent.

use crate::session::Message;
use crate::tools::ToolRegistry;

/// Sequences that end a model turn before it invents its own observation.
pub const STOP_SEQUENCES: &[&str] = &["\nObservation:", "\n\tObservation:"];

/// Build the full prompt: tool list, format instructions, the conversation as
/// the question, and the reasoning so far.
pub fn build_prompt(tools: &ToolRegistry, history: &[Message], scratchpad: &str) -> String {
    let tool_descriptions = tools
        .list_tools()
        .iter()
        .map(|t| format!("{}: {}", t.name, t.description))
        .collect::<Vec<_>>()
        .join("\n");
    let tool_names = tools.names().join(", ");

    format!(
        r#"Answer the following questions as best you can. You have access to the following tools:

{tool_descriptions}

Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question

Begin!

Question: {question}
Thought:{scratchpad}"#,
        tool_descriptions = tool_descriptions,
        tool_names = tool_names,
        question = format_history(history),
        scratchpad = scratchpad
    )
}

/// Render the conversation as `role: content` lines.
fn format_history(history: &[Message]) -> String {
    history
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Append one completed step to the scratchpad.
pub fn record_step(scratchpad: &mut String, model_output: &str, observation: &str) {
    scratchpad.push_str(model_output);
    scratchpad.push_str("\nObservation: ");
    scratchpad.push_str(observation);
    scratchpad.push_str("\nThought: ");
}
