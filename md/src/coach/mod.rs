//! Coach - the response interpreter
//!
//! One chat cycle takes (user message, domain snapshot, recent history) to
//! (reply text, applied progress mutations). The provider's free text may
//! carry a trailing `[PROGRESS_UPDATE]` marker block; extracting and
//! applying it is the only path by which the assistant moves progress bars.
//! Provider failures degrade to a deterministic keyword-matched reply and
//! never mutate anything.

mod context;
mod directives;
mod fallback;
mod interpreter;

pub use context::{HistoryTurn, goals_block, window_history};
pub use directives::{DirectiveParseError, ProgressDirective, extract_directives};
pub use fallback::{FallbackReply, FallbackRule, default_rules, fallback_reply};
pub use interpreter::{ChatError, ChatOutcome, Coach, ProgressUpdate};
