//! Integration tests for the coach interpretation cycle
//!
//! These drive the public API end-to-end: in-memory store, embedded prompt
//! template, and a recording mock in place of the completion provider.

use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use goalstore::{ChatRole, Store};
use tokio::sync::Mutex;

use mentord::coach::{Coach, HistoryTurn, ProgressUpdate};
use mentord::defaults::default_domains;
use mentord::llm::{
    CompletionRequest, CompletionResponse, LlmClient, LlmError, TokenUsage,
};
use mentord::prompts::PromptLoader;

// =============================================================================
// Recording mock provider
// =============================================================================

struct RecordingLlm {
    responses: StdMutex<Vec<Result<CompletionResponse, LlmError>>>,
    requests: StdMutex<Vec<CompletionRequest>>,
}

impl RecordingLlm {
    fn new(responses: Vec<Result<CompletionResponse, LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: StdMutex::new(responses),
            requests: StdMutex::new(Vec::new()),
        })
    }

    fn replying(text: &str) -> Arc<Self> {
        Self::new(vec![Ok(CompletionResponse {
            content: Some(text.to_string()),
            usage: TokenUsage::default(),
        })])
    }

    fn failing() -> Arc<Self> {
        Self::new(vec![Err(LlmError::ApiError {
            status: 500,
            message: "provider exploded".to_string(),
        })])
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for RecordingLlm {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request);
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(LlmError::InvalidResponse("no more mock responses".to_string()));
        }
        responses.remove(0)
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn seeded_store() -> Arc<Mutex<Store>> {
    let store = Store::open_in_memory().expect("in-memory store");
    for domain in default_domains() {
        store.upsert_domain(&domain).expect("seed domain");
    }
    Arc::new(Mutex::new(store))
}

fn coach_with(llm: Arc<RecordingLlm>, store: Arc<Mutex<Store>>) -> Coach {
    let client: Arc<dyn LlmClient> = llm;
    Coach::new(Some(client), store, PromptLoader::embedded_only(), 10, 2000)
}

// =============================================================================
// Directive application
// =============================================================================

#[tokio::test]
async fn test_out_of_range_directive_is_clamped() {
    let store = seeded_store();
    let llm = RecordingLlm::replying(
        "Decent week.\n\n[PROGRESS_UPDATE]\n```json\n[{\"id\":\"sat\",\"progress\":150}]\n```",
    );
    let coach = coach_with(llm, store.clone());

    let outcome = coach
        .chat("scored 1400 on a full practice test", &default_domains(), &[])
        .await
        .unwrap();

    assert_eq!(
        outcome.progress_updates,
        vec![ProgressUpdate { id: "sat".to_string(), progress: 100 }]
    );
    assert_eq!(
        store.lock().await.get_domain("sat").unwrap().unwrap().progress,
        100
    );
}

#[tokio::test]
async fn test_reply_is_returned_verbatim_with_marker() {
    let store = seeded_store();
    let reply = "Judged.\n[PROGRESS_UPDATE]\n```json\n[{\"id\":\"ap\",\"progress\":35}]\n```";
    let coach = coach_with(RecordingLlm::replying(reply), store);

    let outcome = coach.chat("update ap", &default_domains(), &[]).await.unwrap();

    // The marker block is part of the reply, not stripped.
    assert_eq!(outcome.reply, reply);
}

#[tokio::test]
async fn test_last_write_wins_within_one_response() {
    let store = seeded_store();
    let llm = RecordingLlm::replying(
        "Twice.\n[PROGRESS_UPDATE]\n```json\n[{\"id\":\"sat\",\"progress\":60},{\"id\":\"sat\",\"progress\":70}]\n```",
    );
    let coach = coach_with(llm, store.clone());

    let outcome = coach.chat("update", &default_domains(), &[]).await.unwrap();

    // Both applications are reported, in order; the final stored value is
    // the later one.
    assert_eq!(outcome.progress_updates.len(), 2);
    assert_eq!(outcome.progress_updates[1].progress, 70);
    assert_eq!(
        store.lock().await.get_domain("sat").unwrap().unwrap().progress,
        70
    );
}

#[tokio::test]
async fn test_malformed_marker_payload_is_not_fatal() {
    let store = seeded_store();
    let reply = "Still a useful answer.\n[PROGRESS_UPDATE]\n```json\n[{\"id\":\"sat\",\"progress\":60},]\n```";
    let coach = coach_with(RecordingLlm::replying(reply), store.clone());

    let outcome = coach.chat("evaluate", &default_domains(), &[]).await.unwrap();

    assert_eq!(outcome.reply, reply);
    assert!(outcome.progress_updates.is_empty());
    // Nothing moved.
    assert_eq!(
        store.lock().await.get_domain("sat").unwrap().unwrap().progress,
        52
    );
}

#[tokio::test]
async fn test_reply_without_marker_applies_nothing() {
    let store = seeded_store();
    let coach = coach_with(
        RecordingLlm::replying("At this pace you finish in 847 days. You have 180."),
        store,
    );

    let outcome = coach.chat("how am I doing", &default_domains(), &[]).await.unwrap();
    assert!(outcome.progress_updates.is_empty());
}

// =============================================================================
// Degraded paths
// =============================================================================

#[tokio::test]
async fn test_provider_error_degrades_to_stuck_fallback() {
    let store = seeded_store();
    let coach = coach_with(RecordingLlm::failing(), store.clone());

    let outcome = coach
        .chat("I'm STUCK on the reading section", &default_domains(), &[])
        .await
        .unwrap();

    assert_eq!(
        outcome.reply,
        "Stuck where exactly? Name the domain and the specific block."
    );
    assert!(outcome.progress_updates.is_empty());

    // Both turns still logged.
    let history = store.lock().await.chat_history(10).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].role, ChatRole::Assistant);
}

#[tokio::test]
async fn test_empty_message_is_rejected_with_no_writes() {
    let store = seeded_store();
    let coach = coach_with(RecordingLlm::replying("unused"), store.clone());

    let result = coach.chat("", &default_domains(), &[]).await;
    assert!(result.is_err());

    let store = store.lock().await;
    assert_eq!(store.chat_count().unwrap(), 0);
    assert_eq!(store.get_domain("sat").unwrap().unwrap().progress, 52);
}

// =============================================================================
// Provider context
// =============================================================================

#[tokio::test]
async fn test_history_window_forwards_last_ten_in_order() {
    let store = seeded_store();
    let llm = RecordingLlm::replying("ok");
    let coach = coach_with(llm.clone(), store);

    let history: Vec<HistoryTurn> = (0..15)
        .map(|i| HistoryTurn {
            role: if i % 2 == 0 { ChatRole::User } else { ChatRole::Assistant },
            content: format!("turn {}", i),
        })
        .collect();

    coach.chat("new message", &default_domains(), &history).await.unwrap();

    let requests = llm.requests();
    assert_eq!(requests.len(), 1);

    // 10 windowed turns + the new user message.
    let messages = &requests[0].messages;
    assert_eq!(messages.len(), 11);
    assert_eq!(messages[0].content, "turn 5");
    assert_eq!(messages[9].content, "turn 14");
    assert_eq!(messages[10].content, "new message");
}

#[tokio::test]
async fn test_system_framing_carries_snapshot_and_ids() {
    let store = seeded_store();
    let llm = RecordingLlm::replying("ok");
    let coach = coach_with(llm.clone(), store);

    let domains = default_domains();
    coach.chat("hello", &domains, &[]).await.unwrap();

    let system = llm.requests()[0].system_prompt.clone();

    // Every domain line and the id vocabulary are in the framing.
    for domain in &domains {
        assert!(system.contains(&domain.label), "missing label {}", domain.label);
        assert!(system.contains(&domain.id), "missing id {}", domain.id);
    }
    assert!(system.contains("[PROGRESS_UPDATE]"));
}
