//! Conversation context assembly
//!
//! Builds the per-domain context block embedded in the system framing and
//! applies the history window before a provider call.

use goalstore::{ChatMessage, ChatRole, Domain};
use serde::{Deserialize, Serialize};

/// One prior conversation turn as supplied by the caller.
///
/// Callers pass history alongside each message; the interpreter never
/// re-reads the chat log inside a cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: ChatRole,
    pub content: String,
}

impl From<&ChatMessage> for HistoryTurn {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role,
            content: msg.content.clone(),
        }
    }
}

/// Render one descriptive line per domain for the system framing.
pub fn goals_block(domains: &[Domain]) -> String {
    if domains.is_empty() {
        return "No goals loaded.".to_string();
    }
    domains
        .iter()
        .map(|d| {
            format!(
                "{}: {}% done, {} days left, urgency {}, status \"{}\"",
                d.label, d.progress, d.days, d.urgency, d.status
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The most recent `window` turns, original order preserved. Earlier
/// history is dropped, never reordered.
pub fn window_history(history: &[HistoryTurn], window: usize) -> &[HistoryTurn] {
    let start = history.len().saturating_sub(window);
    &history[start..]
}
