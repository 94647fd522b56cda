//! Progress directive extraction
//!
//! Grammar: a literal `[PROGRESS_UPDATE]` marker line followed by a fenced
//! ```json block containing a JSON array of `{id, progress}` objects. This
//! is the wire format between the provider's free text and the structured
//! mutation list. Parse failures are typed and recoverable; they never
//! reach the reply-generation path.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

static MARKER_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\[PROGRESS_UPDATE\]\s*```json\s*(.*?)```").expect("marker regex is valid")
});

/// A transient instruction to set one domain's progress. Exists only for
/// the duration of one response-processing cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressDirective {
    pub domain_id: String,
    pub requested_progress: f64,
}

/// Errors from a present-but-malformed marker payload
#[derive(Debug, Error)]
pub enum DirectiveParseError {
    #[error("marker payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("marker payload is not a JSON array")]
    NotAnArray,
}

/// Scan a reply for the trailing marker block.
///
/// An absent marker means zero directives - not an error. Elements missing
/// a non-empty string `id` or a numeric `progress` are skipped silently.
pub fn extract_directives(reply: &str) -> Result<Vec<ProgressDirective>, DirectiveParseError> {
    let Some(captures) = MARKER_BLOCK.captures(reply) else {
        return Ok(Vec::new());
    };

    let payload = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
    let value: serde_json::Value = serde_json::from_str(payload)?;
    let items = value.as_array().ok_or(DirectiveParseError::NotAnArray)?;

    let mut directives = Vec::new();
    for item in items {
        let id = item.get("id").and_then(|v| v.as_str()).unwrap_or_default();
        let progress = item.get("progress").and_then(|v| v.as_f64());

        match (id.is_empty(), progress) {
            (false, Some(progress)) => directives.push(ProgressDirective {
                domain_id: id.to_string(),
                requested_progress: progress,
            }),
            _ => {
                debug!(?item, "skipping directive element without id/progress");
            }
        }
    }

    Ok(directives)
}
