//! Shared types for the goal store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Urgency
// ---------------------------------------------------------------------------

/// Urgency tier of a domain.
///
/// Stored as TEXT; the set is open in the database but only these three
/// values are produced. Unknown stored values decode as [`Urgency::Medium`]
/// so old rows never fail a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Urgency {
    Critical,
    High,
    Medium,
}

impl Urgency {
    /// Decode a stored TEXT value.
    pub fn from_db(s: &str) -> Self {
        match s {
            "CRITICAL" => Urgency::Critical,
            "HIGH" => Urgency::High,
            _ => Urgency::Medium,
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Urgency::Critical => write!(f, "CRITICAL"),
            Urgency::High => write!(f, "HIGH"),
            Urgency::Medium => write!(f, "MEDIUM"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

/// A tracked goal with a bounded progress percentage.
///
/// `id` is the stable join key; it never changes once created. The
/// presentation fields (`label`, `color`, `bg`, `icon`, `win`) are set once
/// at insert time - the update path only touches `progress`, `status`,
/// `days` and `urgency`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Domain {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub bg: String,
    #[serde(default)]
    pub icon: String,
    /// Free-text description of the success condition.
    #[serde(default)]
    pub win: String,
    /// Free-text current-state description.
    #[serde(default)]
    pub status: String,
    pub urgency: Urgency,
    /// Days remaining until the deadline; advisory, never auto-decremented.
    pub days: i64,
    /// Always within `[0, 100]` once persisted.
    pub progress: i64,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Chat history
// ---------------------------------------------------------------------------

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    /// Decode a stored TEXT value.
    pub fn from_db(s: &str) -> Self {
        match s {
            "user" => ChatRole::User,
            _ => ChatRole::Assistant,
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatRole::User => write!(f, "user"),
            ChatRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// An immutable, append-only chat record. Insertion order defines history
/// order; messages are never edited or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Daily logs
// ---------------------------------------------------------------------------

/// A time-spent entry for one day, optionally tied to a domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyLog {
    pub id: i64,
    /// Calendar date as `YYYY-MM-DD`.
    pub date: String,
    pub domain_id: Option<String>,
    pub minutes_spent: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urgency_roundtrip() {
        for u in [Urgency::Critical, Urgency::High, Urgency::Medium] {
            assert_eq!(Urgency::from_db(&u.to_string()), u);
        }
    }

    #[test]
    fn test_urgency_unknown_defaults_to_medium() {
        assert_eq!(Urgency::from_db("SOMEDAY"), Urgency::Medium);
        assert_eq!(Urgency::from_db(""), Urgency::Medium);
    }

    #[test]
    fn test_urgency_serde_uppercase() {
        let json = serde_json::to_string(&Urgency::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
        let back: Urgency = serde_json::from_str("\"HIGH\"").unwrap();
        assert_eq!(back, Urgency::High);
    }

    #[test]
    fn test_chat_role_roundtrip() {
        assert_eq!(ChatRole::from_db("user"), ChatRole::User);
        assert_eq!(ChatRole::from_db("assistant"), ChatRole::Assistant);
        assert_eq!(ChatRole::User.to_string(), "user");
    }

    #[test]
    fn test_domain_deserialize_without_timestamp() {
        // Snapshot input from callers may omit updated_at and presentation
        // fields; both must default rather than fail.
        let json = r#"{"id":"sat","label":"SAT","urgency":"CRITICAL","days":29,"progress":52}"#;
        let d: Domain = serde_json::from_str(json).unwrap();
        assert_eq!(d.id, "sat");
        assert_eq!(d.progress, 52);
        assert!(d.color.is_empty());
    }
}
