//! Mentord - goal-tracking coach daemon
//!
//! Mentord keeps a fixed set of goal "domains" with bounded progress
//! percentages, runs free-form chat through an LLM provider that may emit
//! structured progress directives, and serves prayer-time data for a
//! configured location. When the provider is unavailable the coach degrades
//! to a deterministic keyword-matched reply - the assistant is never down
//! from the caller's perspective.
//!
//! # Modules
//!
//! - [`coach`] - response interpreter: context, fallback table, directives
//! - [`llm`] - LLM client trait and the Messages-API implementation
//! - [`prompts`] - system prompt template (embedded + overridable)
//! - [`prayer`] - prayer-time client with an explicit TTL cache
//! - [`server`] - HTTP API
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod coach;
pub mod config;
pub mod defaults;
pub mod llm;
pub mod prayer;
pub mod prompts;
pub mod server;

// Re-export commonly used types
pub use coach::{ChatError, ChatOutcome, Coach, HistoryTurn, ProgressUpdate};
pub use config::{ChatConfig, Config, LlmConfig, PrayerConfig, ServerConfig, StorageConfig};
pub use llm::{AnthropicClient, CompletionRequest, CompletionResponse, LlmClient, LlmError};
pub use prayer::{PrayerClient, PrayerService, TtlCache};
