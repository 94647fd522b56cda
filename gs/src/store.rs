//! Core Store implementation
//!
//! One `Store` wraps one SQLite connection. All progress writes clamp to
//! `[0, 100]` here, inside the store, so every call site gets the range
//! guarantee without cooperating.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};
use std::path::Path;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::schema;
use crate::types::{ChatMessage, ChatRole, DailyLog, Domain, Urgency};
use crate::clamp_progress;

/// The goal store database.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL mode for concurrent readers
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let mut store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let mut store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Run schema creation and migrations.
    fn migrate(&mut self) -> Result<(), StoreError> {
        let version = self.schema_version();

        if version == 0 {
            info!("Creating database schema v{}", schema::SCHEMA_VERSION);
            self.conn.execute_batch(schema::CREATE_SCHEMA)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::SCHEMA_VERSION],
            )?;
        } else if version < schema::SCHEMA_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::SCHEMA_VERSION],
            )?;
        }

        Ok(())
    }

    /// Get the current schema version (0 if uninitialized).
    fn schema_version(&self) -> u32 {
        self.conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0)
    }

    // -----------------------------------------------------------------------
    // Domains
    // -----------------------------------------------------------------------

    /// List all domains in stable creation order.
    ///
    /// An empty result means the store is unseeded; populating defaults is
    /// the caller's decision, not the store's.
    pub fn domains(&self) -> Result<Vec<Domain>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, label, color, bg, icon, win, status, urgency, days, progress, updated_at
             FROM domains ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], row_to_domain)?;

        let mut domains = Vec::new();
        for row in rows {
            domains.push(row?);
        }
        Ok(domains)
    }

    /// Fetch a single domain by id.
    pub fn get_domain(&self, id: &str) -> Result<Option<Domain>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, label, color, bg, icon, win, status, urgency, days, progress, updated_at
             FROM domains WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], row_to_domain)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Insert a new domain, or update the mutable fields of an existing one.
    ///
    /// The update arm touches only `progress`, `status`, `days` and
    /// `urgency` (plus `updated_at`); presentation metadata is set once at
    /// insert and never rewritten here. Progress is clamped either way.
    pub fn upsert_domain(&self, domain: &Domain) -> Result<(), StoreError> {
        let progress = clamp_progress(domain.progress);
        debug!(id = %domain.id, progress, "upserting domain");
        self.conn.execute(
            "INSERT INTO domains (id, label, color, bg, icon, win, status, urgency, days, progress, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(id) DO UPDATE SET
                progress = ?10,
                status = ?7,
                days = ?9,
                urgency = ?8,
                updated_at = ?11",
            params![
                domain.id,
                domain.label,
                domain.color,
                domain.bg,
                domain.icon,
                domain.win,
                domain.status,
                domain.urgency.to_string(),
                domain.days,
                progress,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Set one domain's progress, clamped to `[0, 100]`.
    ///
    /// Returns the value actually stored. Unknown ids are rejected with
    /// [`StoreError::DomainNotFound`] - the same policy the directive
    /// application path relies on.
    pub fn set_progress(&self, id: &str, value: i64) -> Result<i64, StoreError> {
        let clamped = clamp_progress(value);
        let changed = self.conn.execute(
            "UPDATE domains SET progress = ?1, updated_at = ?2 WHERE id = ?3",
            params![clamped, Utc::now().to_rfc3339(), id],
        )?;
        if changed == 0 {
            return Err(StoreError::DomainNotFound(id.to_string()));
        }
        debug!(id, clamped, "progress updated");
        Ok(clamped)
    }

    /// Zero every domain's progress. Idempotent; never removes domains.
    pub fn reset_all(&self) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE domains SET progress = 0, updated_at = ?1",
            params![Utc::now().to_rfc3339()],
        )?;
        info!(domains = changed, "reset all progress to 0");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Chat history
    // -----------------------------------------------------------------------

    /// Append a chat message. Rows are never edited afterwards.
    pub fn add_chat_message(&self, role: ChatRole, content: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO chat_history (role, content, created_at) VALUES (?1, ?2, ?3)",
            params![role.to_string(), content, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// The most recent `limit` chat messages, oldest first.
    pub fn chat_history(&self, limit: usize) -> Result<Vec<ChatMessage>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, role, content, created_at FROM chat_history
             ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(ChatMessage {
                id: row.get(0)?,
                role: ChatRole::from_db(&row.get::<_, String>(1)?),
                content: row.get(2)?,
                created_at: parse_timestamp(&row.get::<_, String>(3)?),
            })
        })?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        messages.reverse();
        Ok(messages)
    }

    /// Total number of chat messages.
    pub fn chat_count(&self) -> Result<u64, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM chat_history", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // -----------------------------------------------------------------------
    // Daily logs
    // -----------------------------------------------------------------------

    /// Record time spent on a day, optionally against a domain.
    pub fn add_daily_log(
        &self,
        date: &str,
        domain_id: Option<&str>,
        minutes_spent: i64,
        notes: Option<&str>,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO daily_logs (date, domain_id, minutes_spent, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![date, domain_id, minutes_spent, notes, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// All log entries for one calendar date.
    pub fn daily_logs(&self, date: &str) -> Result<Vec<DailyLog>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date, domain_id, minutes_spent, notes, created_at
             FROM daily_logs WHERE date = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![date], |row| {
            Ok(DailyLog {
                id: row.get(0)?,
                date: row.get(1)?,
                domain_id: row.get(2)?,
                minutes_spent: row.get(3)?,
                notes: row.get(4)?,
                created_at: parse_timestamp(&row.get::<_, String>(5)?),
            })
        })?;

        let mut logs = Vec::new();
        for row in rows {
            logs.push(row?);
        }
        Ok(logs)
    }
}

fn row_to_domain(row: &Row<'_>) -> rusqlite::Result<Domain> {
    Ok(Domain {
        id: row.get(0)?,
        label: row.get(1)?,
        color: row.get(2)?,
        bg: row.get(3)?,
        icon: row.get(4)?,
        win: row.get(5)?,
        status: row.get(6)?,
        urgency: Urgency::from_db(&row.get::<_, String>(7)?),
        days: row.get(8)?,
        progress: row.get(9)?,
        updated_at: parse_timestamp(&row.get::<_, String>(10)?),
    })
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn domain(id: &str, progress: i64) -> Domain {
        Domain {
            id: id.to_string(),
            label: id.to_uppercase(),
            color: "#FF4757".to_string(),
            bg: "#1A0608".to_string(),
            icon: "🎯".to_string(),
            win: "win condition".to_string(),
            status: "in flight".to_string(),
            urgency: Urgency::High,
            days: 30,
            progress,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_open_on_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data").join("goals.db");
        let store = Store::open(&path).unwrap();
        assert!(store.domains().unwrap().is_empty());
        assert!(path.exists());
    }

    #[test]
    fn test_upsert_then_list_no_duplicates() {
        let store = Store::open_in_memory().unwrap();
        store.upsert_domain(&domain("sat", 10)).unwrap();
        store.upsert_domain(&domain("sat", 40)).unwrap();
        store.upsert_domain(&domain("sat", 70)).unwrap();

        let domains = store.domains().unwrap();
        assert_eq!(domains.len(), 1);
        assert_eq!(domains[0].id, "sat");
        assert_eq!(domains[0].progress, 70);
    }

    #[test]
    fn test_list_preserves_creation_order() {
        let store = Store::open_in_memory().unwrap();
        for id in ["sat", "ap", "research"] {
            store.upsert_domain(&domain(id, 0)).unwrap();
        }
        // Updating the first entry must not reorder the list.
        store.set_progress("sat", 50).unwrap();

        let ids: Vec<String> = store.domains().unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["sat", "ap", "research"]);
    }

    #[test]
    fn test_upsert_never_rewrites_presentation_fields() {
        let store = Store::open_in_memory().unwrap();
        store.upsert_domain(&domain("sat", 10)).unwrap();

        let mut changed = domain("sat", 60);
        changed.label = "Renamed".to_string();
        changed.icon = "📐".to_string();
        changed.win = "different".to_string();
        changed.status = "new status".to_string();
        store.upsert_domain(&changed).unwrap();

        let d = store.get_domain("sat").unwrap().unwrap();
        assert_eq!(d.label, "SAT");
        assert_eq!(d.icon, "🎯");
        assert_eq!(d.win, "win condition");
        // Mutable fields did move.
        assert_eq!(d.status, "new status");
        assert_eq!(d.progress, 60);
    }

    #[test]
    fn test_set_progress_clamps_and_returns_stored_value() {
        let store = Store::open_in_memory().unwrap();
        store.upsert_domain(&domain("sat", 0)).unwrap();

        assert_eq!(store.set_progress("sat", 150).unwrap(), 100);
        assert_eq!(store.get_domain("sat").unwrap().unwrap().progress, 100);

        assert_eq!(store.set_progress("sat", -20).unwrap(), 0);
        assert_eq!(store.get_domain("sat").unwrap().unwrap().progress, 0);
    }

    #[test]
    fn test_set_progress_unknown_id_rejected() {
        let store = Store::open_in_memory().unwrap();
        let err = store.set_progress("nope", 50).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_upsert_clamps_progress() {
        let store = Store::open_in_memory().unwrap();
        store.upsert_domain(&domain("sat", 999)).unwrap();
        assert_eq!(store.get_domain("sat").unwrap().unwrap().progress, 100);
    }

    #[test]
    fn test_reset_all_is_idempotent() {
        let store = Store::open_in_memory().unwrap();
        store.upsert_domain(&domain("sat", 52)).unwrap();
        store.upsert_domain(&domain("ap", 30)).unwrap();

        store.reset_all().unwrap();
        store.reset_all().unwrap();

        let domains = store.domains().unwrap();
        assert_eq!(domains.len(), 2);
        assert!(domains.iter().all(|d| d.progress == 0));
    }

    #[test]
    fn test_reset_all_on_empty_store_succeeds() {
        let store = Store::open_in_memory().unwrap();
        store.reset_all().unwrap();
    }

    #[test]
    fn test_chat_history_window_and_order() {
        let store = Store::open_in_memory().unwrap();
        for i in 0..15 {
            let role = if i % 2 == 0 { ChatRole::User } else { ChatRole::Assistant };
            store.add_chat_message(role, &format!("msg {}", i)).unwrap();
        }

        let history = store.chat_history(10).unwrap();
        assert_eq!(history.len(), 10);
        // Most recent 10, oldest of that window first.
        assert_eq!(history[0].content, "msg 5");
        assert_eq!(history[9].content, "msg 14");
        assert_eq!(store.chat_count().unwrap(), 15);
    }

    #[test]
    fn test_daily_logs_by_date() {
        let store = Store::open_in_memory().unwrap();
        store.upsert_domain(&domain("sat", 0)).unwrap();
        store.add_daily_log("2026-08-06", Some("sat"), 45, Some("practice set")).unwrap();
        store.add_daily_log("2026-08-06", None, 20, None).unwrap();
        store.add_daily_log("2026-08-07", Some("sat"), 30, None).unwrap();

        let logs = store.daily_logs("2026-08-06").unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].minutes_spent, 45);
        assert_eq!(logs[0].domain_id.as_deref(), Some("sat"));
    }

    proptest! {
        #[test]
        fn prop_stored_progress_always_clamped(value in -10_000i64..10_000) {
            let store = Store::open_in_memory().unwrap();
            store.upsert_domain(&domain("sat", 0)).unwrap();

            let stored = store.set_progress("sat", value).unwrap();
            prop_assert_eq!(stored, value.clamp(0, 100));
            prop_assert_eq!(store.get_domain("sat").unwrap().unwrap().progress, stored);
        }
    }
}
