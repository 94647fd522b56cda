//! HTTP API
//!
//! Thin axum layer over the store, the coach and the prayer service. The
//! chat endpoint takes the caller's domain snapshot and history verbatim -
//! the handler does not re-read the store inside an interpretation cycle.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use goalstore::{Domain, Store, Urgency};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::coach::{ChatError, Coach, HistoryTurn};
use crate::defaults::default_domains;
use crate::prayer::PrayerService;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<Store>>,
    pub coach: Arc<Coach>,
    pub prayer: Arc<PrayerService>,
    /// Whether a provider key is configured (reported by /api/status).
    pub ai_mode: bool,
    /// Default page size for the chat-history endpoint.
    pub history_limit: usize,
}

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn api_error(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message })))
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/domains", get(get_domains).post(reset_domains))
        .route("/api/domains/{id}", put(put_domain))
        .route("/api/chat", post(post_chat))
        .route("/api/chat-history", get(get_chat_history))
        .route("/api/logs", post(post_log))
        .route("/api/logs/{date}", get(get_logs))
        .route("/api/prayer-times", get(get_prayer_today))
        .route("/api/prayer-times/month", get(get_prayer_month))
        .route("/api/status", get(get_status))
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState, bind: &str, port: u16) -> eyre::Result<()> {
    let app = build_router(state);

    let ip: std::net::IpAddr = bind
        .parse()
        .unwrap_or_else(|_| std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST));
    let addr = std::net::SocketAddr::new(ip, port);
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Domains
// ---------------------------------------------------------------------------

async fn get_domains(State(state): State<AppState>) -> ApiResult {
    let store = state.store.lock().await;
    let mut domains = store
        .domains()
        .map_err(|e| internal(&e, "Failed to get domains"))?;

    if domains.is_empty() {
        info!("store is empty, seeding default domains");
        for domain in default_domains() {
            store
                .upsert_domain(&domain)
                .map_err(|e| internal(&e, "Failed to seed domains"))?;
        }
        domains = store
            .domains()
            .map_err(|e| internal(&e, "Failed to get domains"))?;
    }

    Ok(Json(json!(domains)))
}

/// Partial update body for one domain.
#[derive(Debug, Default, Deserialize)]
struct DomainUpdate {
    progress: Option<i64>,
    label: Option<String>,
    color: Option<String>,
    bg: Option<String>,
    icon: Option<String>,
    win: Option<String>,
    status: Option<String>,
    urgency: Option<Urgency>,
    days: Option<i64>,
}

async fn put_domain(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<DomainUpdate>,
) -> ApiResult {
    let store = state.store.lock().await;

    if let Some(progress) = update.progress {
        let stored = match store.set_progress(&id, progress) {
            Ok(stored) => stored,
            Err(e) if e.is_not_found() => {
                return Err(api_error(StatusCode::NOT_FOUND, &e.to_string()));
            }
            Err(e) => return Err(internal(&e, "Failed to update domain")),
        };
        return Ok(Json(json!({ "ok": true, "progress": stored })));
    }

    let existing = store
        .get_domain(&id)
        .map_err(|e| internal(&e, "Failed to update domain"))?;
    let merged = merged_domain(existing, &id, update);
    store
        .upsert_domain(&merged)
        .map_err(|e| internal(&e, "Failed to update domain"))?;

    Ok(Json(json!({ "ok": true })))
}

/// Overlay a partial update on the stored record (or on blank defaults when
/// the id is new). Presentation fields still only land via the insert arm
/// of the store's upsert.
fn merged_domain(existing: Option<Domain>, id: &str, update: DomainUpdate) -> Domain {
    let base = existing.unwrap_or(Domain {
        id: id.to_string(),
        label: id.to_string(),
        color: String::new(),
        bg: String::new(),
        icon: String::new(),
        win: String::new(),
        status: String::new(),
        urgency: Urgency::Medium,
        days: 0,
        progress: 0,
        updated_at: chrono::Utc::now(),
    });

    Domain {
        id: base.id,
        label: update.label.unwrap_or(base.label),
        color: update.color.unwrap_or(base.color),
        bg: update.bg.unwrap_or(base.bg),
        icon: update.icon.unwrap_or(base.icon),
        win: update.win.unwrap_or(base.win),
        status: update.status.unwrap_or(base.status),
        urgency: update.urgency.unwrap_or(base.urgency),
        days: update.days.unwrap_or(base.days),
        progress: base.progress,
        updated_at: base.updated_at,
    }
}

async fn reset_domains(State(state): State<AppState>) -> ApiResult {
    let store = state.store.lock().await;
    store
        .reset_all()
        .map_err(|e| internal(&e, "Failed to reset domains"))?;
    Ok(Json(json!({ "ok": true, "message": "All progress reset to 0" })))
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: String,
    #[serde(default)]
    domains: Vec<Domain>,
    #[serde(default)]
    history: Vec<HistoryTurn>,
}

async fn post_chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> ApiResult {
    match state.coach.chat(&req.message, &req.domains, &req.history).await {
        Ok(outcome) => Ok(Json(json!(outcome))),
        Err(ChatError::EmptyMessage) => {
            Err(api_error(StatusCode::BAD_REQUEST, "Message is required"))
        }
    }
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

async fn get_chat_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult {
    let limit = query.limit.unwrap_or(state.history_limit);
    let store = state.store.lock().await;
    let history = store
        .chat_history(limit)
        .map_err(|e| internal(&e, "Failed to get chat history"))?;
    Ok(Json(json!(history)))
}

// ---------------------------------------------------------------------------
// Daily logs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct LogRequest {
    date: String,
    #[serde(rename = "domainId")]
    domain_id: Option<String>,
    #[serde(rename = "minutesSpent", default)]
    minutes_spent: i64,
    notes: Option<String>,
}

async fn post_log(State(state): State<AppState>, Json(req): Json<LogRequest>) -> ApiResult {
    let store = state.store.lock().await;
    store
        .add_daily_log(
            &req.date,
            req.domain_id.as_deref(),
            req.minutes_spent,
            req.notes.as_deref(),
        )
        .map_err(|e| internal(&e, "Failed to add log"))?;
    Ok(Json(json!({ "ok": true })))
}

async fn get_logs(State(state): State<AppState>, Path(date): Path<String>) -> ApiResult {
    let store = state.store.lock().await;
    let logs = store
        .daily_logs(&date)
        .map_err(|e| internal(&e, "Failed to get logs"))?;
    Ok(Json(json!(logs)))
}

// ---------------------------------------------------------------------------
// Prayer times
// ---------------------------------------------------------------------------

async fn get_prayer_today(State(state): State<AppState>) -> ApiResult {
    state
        .prayer
        .today()
        .await
        .map(|daily| Json(json!(daily)))
        .map_err(|e| internal(&e, "Failed to fetch prayer times"))
}

#[derive(Debug, Deserialize)]
struct MonthQuery {
    month: Option<u32>,
    year: Option<i32>,
}

async fn get_prayer_month(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> ApiResult {
    use chrono::Datelike;
    let now = chrono::Local::now();
    let month = query.month.unwrap_or(now.month());
    let year = query.year.unwrap_or(now.year());

    state
        .prayer
        .month(year, month)
        .await
        .map(|days| Json(json!(days)))
        .map_err(|e| internal(&e, "Failed to fetch monthly prayer times"))
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

async fn get_status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "mentord online",
        "mode": if state.ai_mode { "ai" } else { "fallback" },
        "database": "sqlite",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn internal(err: &dyn std::fmt::Display, message: &str) -> (StatusCode, Json<Value>) {
    error!("{}: {}", message, err);
    api_error(StatusCode::INTERNAL_SERVER_ERROR, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merged_domain_overlays_only_given_fields() {
        let existing = Domain {
            id: "sat".to_string(),
            label: "SAT".to_string(),
            color: "#FF4757".to_string(),
            bg: "#1A0608".to_string(),
            icon: "🎯".to_string(),
            win: "1550+".to_string(),
            status: "old".to_string(),
            urgency: Urgency::Critical,
            days: 29,
            progress: 52,
            updated_at: chrono::Utc::now(),
        };

        let update = DomainUpdate {
            status: Some("new status".to_string()),
            days: Some(21),
            ..Default::default()
        };

        let merged = merged_domain(Some(existing), "sat", update);
        assert_eq!(merged.status, "new status");
        assert_eq!(merged.days, 21);
        assert_eq!(merged.label, "SAT");
        assert_eq!(merged.urgency, Urgency::Critical);
        assert_eq!(merged.progress, 52);
    }

    #[test]
    fn test_merged_domain_for_new_id_uses_blank_defaults() {
        let update = DomainUpdate {
            label: Some("Side Quest".to_string()),
            urgency: Some(Urgency::High),
            ..Default::default()
        };

        let merged = merged_domain(None, "quest", update);
        assert_eq!(merged.id, "quest");
        assert_eq!(merged.label, "Side Quest");
        assert_eq!(merged.urgency, Urgency::High);
        assert_eq!(merged.progress, 0);
    }
}
