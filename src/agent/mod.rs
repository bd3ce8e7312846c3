//! Agent module - the reason-act loop.
//!
//! The agent follows a "tools in a loop" pattern:
//! 1. Build a prompt with the tool list and the conversation so far
//! 2. Call the model and parse its reply into an [`AgentStep`]
//! 3. If the model asks for a tool, run it and feed the observation back
//! 4. Repeat until a final answer, a parse failure, or max iterations

mod agent_loop;
mod parser;
mod prompt;

pub use agent_loop::{Agent, AgentError, AgentOptions, ITERATION_LIMIT_ANSWER};
pub use parser::{parse_step, AgentStep};
pub use prompt::build_prompt;

#[cfg(test)]
pub(crate) use agent_loop::testing;
