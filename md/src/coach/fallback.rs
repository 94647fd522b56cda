//! Deterministic offline fallback replies
//!
//! When the provider is unconfigured or a call fails, the coach answers
//! from an ordered table of (trigger substring, reply) pairs. The table is
//! data, not branching logic: first matching trigger in declaration order
//! wins, and the match is a case-insensitive containment test against the
//! lowered message. This path never extracts directives and never mutates.

use goalstore::{Domain, Urgency};

/// What a matched rule produces.
#[derive(Debug, Clone)]
pub enum FallbackReply {
    /// A fixed canned reply.
    Canned(String),
    /// A grouped progress summary rendered from the domain snapshot.
    StatusSummary,
}

/// One entry in the ordered fallback table.
#[derive(Debug, Clone)]
pub struct FallbackRule {
    /// Lowercase substring tested against the lowered message.
    pub trigger: String,
    pub reply: FallbackReply,
}

impl FallbackRule {
    fn canned(trigger: &str, reply: &str) -> Self {
        Self {
            trigger: trigger.to_string(),
            reply: FallbackReply::Canned(reply.to_string()),
        }
    }
}

/// Reply used when no trigger matches.
pub const UNMATCHED_REPLY: &str =
    "Be specific. What domain? What's the block? I can't help with vague.";

/// The built-in rule table, in match-priority order.
pub fn default_rules() -> Vec<FallbackRule> {
    vec![
        FallbackRule::canned("done", "Logged. What's next on your list?"),
        FallbackRule::canned("stuck", "Stuck where exactly? Name the domain and the specific block."),
        FallbackRule {
            trigger: "status".to_string(),
            reply: FallbackReply::StatusSummary,
        },
        FallbackRule::canned(
            "what now",
            "SAT prep. 29 days left. Open a practice set, do 25 problems on your weakest section. No negotiation.",
        ),
        FallbackRule::canned(
            "tired",
            "Understood. Lowest-energy task: read one chapter of your current book. 30 minutes. No screen required.",
        ),
        FallbackRule::canned(
            "20 min",
            "20 minutes → SAT: one full reading passage, 5 questions, timed. Go.",
        ),
        FallbackRule::canned(
            "skip",
            "Skip today? That's one of the few remaining days gone. Every day counts. Think carefully.",
        ),
        FallbackRule::canned(
            "help",
            "Available commands: done, stuck, status, what now, I'm tired, I have 20 min, skip today",
        ),
    ]
}

/// Pick the fallback reply for a message.
pub fn fallback_reply(message: &str, domains: &[Domain], rules: &[FallbackRule]) -> String {
    let lowered = message.to_lowercase();

    for rule in rules {
        if lowered.contains(&rule.trigger) {
            return match &rule.reply {
                FallbackReply::Canned(text) => text.clone(),
                FallbackReply::StatusSummary => status_summary(domains),
            };
        }
    }

    UNMATCHED_REPLY.to_string()
}

/// Grouped progress summary: critical first, then high, then medium.
fn status_summary(domains: &[Domain]) -> String {
    if domains.is_empty() {
        return "🔴 No goals loaded".to_string();
    }

    let mut lines = Vec::new();
    for d in domains.iter().filter(|d| d.urgency == Urgency::Critical) {
        lines.push(format!("🔴 {}: {}% — {}d left — CRITICAL", d.label, d.progress, d.days));
    }
    for d in domains.iter().filter(|d| d.urgency == Urgency::High) {
        lines.push(format!("🟡 {}: {}% — {}d left", d.label, d.progress, d.days));
    }
    for d in domains.iter().filter(|d| d.urgency == Urgency::Medium) {
        lines.push(format!("🟢 {}: {}% — {}d left", d.label, d.progress, d.days));
    }
    lines.join("\n")
}
