//! # Search Bot
//!
//! A chat-style web search assistant.
//!
//! This library provides:
//! - A server-rendered chat page and a JSON API over per-session conversations
//! - A reason-act agent loop over a hosted chat model (Groq by default)
//! - Lookup tools for web search, Arxiv abstracts and Wikipedia summaries
//!
//! ## Architecture
//!
//! The agent follows the "tools in a loop" pattern:
//! 1. Receive a question on a session
//! 2. Build a prompt with the conversation and the available tools
//! 3. Call the model, parse its reply, run a tool if it asked for one
//! 4. Feed the observation back, repeat until a final answer
//!
//! ## Example
//!
//! ```rust,ignore
//! use search_bot::{api, config::Config};
//!
//! let config = Config::from_env()?;
//! api::serve(config).await?;
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod credential;
pub mod llm;
pub mod session;
pub mod tools;
pub mod ui;

pub use config::Config;
