//! The interpretation cycle
//!
//! Orchestrates one round: validate, log the user turn, call the provider
//! (or fall back), extract and apply directives, log the reply. Provider
//! and parse failures degrade; only an empty message is a caller-facing
//! error.

use chrono::Local;
use eyre::eyre;
use goalstore::{ChatRole, Domain, Store};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::context::{HistoryTurn, goals_block, window_history};
use super::directives::extract_directives;
use super::fallback::{FallbackRule, default_rules, fallback_reply};
use crate::llm::{CompletionRequest, LlmClient, Message};
use crate::prompts::{PromptLoader, SystemContext};

/// The only hard error a chat cycle can produce.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message is required")]
    EmptyMessage,
}

/// One applied mutation, with the post-clamp value actually stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub id: String,
    pub progress: i64,
}

/// Result of one interpretation cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOutcome {
    /// Full reply text, verbatim - the marker block is not stripped.
    pub reply: String,
    /// Applied mutations in application order.
    #[serde(rename = "progressUpdates")]
    pub progress_updates: Vec<ProgressUpdate>,
}

/// The response interpreter.
pub struct Coach {
    /// `None` means fallback-only mode (no API key configured).
    llm: Option<Arc<dyn LlmClient>>,
    store: Arc<Mutex<Store>>,
    prompts: PromptLoader,
    rules: Vec<FallbackRule>,
    history_window: usize,
    max_tokens: u32,
}

impl Coach {
    pub fn new(
        llm: Option<Arc<dyn LlmClient>>,
        store: Arc<Mutex<Store>>,
        prompts: PromptLoader,
        history_window: usize,
        max_tokens: u32,
    ) -> Self {
        Self {
            llm,
            store,
            prompts,
            rules: default_rules(),
            history_window,
            max_tokens,
        }
    }

    /// Replace the fallback rule table (rules are data, not logic).
    pub fn with_rules(mut self, rules: Vec<FallbackRule>) -> Self {
        self.rules = rules;
        self
    }

    /// Run one interpretation cycle.
    ///
    /// The caller supplies the domain snapshot and history; the store is
    /// only touched to log chat turns and to apply directives.
    pub async fn chat(
        &self,
        message: &str,
        domains: &[Domain],
        history: &[HistoryTurn],
    ) -> Result<ChatOutcome, ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        self.record(ChatRole::User, message).await;

        let (reply, progress_updates) = match &self.llm {
            None => {
                debug!("no provider configured, answering from fallback table");
                (fallback_reply(message, domains, &self.rules), Vec::new())
            }
            Some(client) => {
                match self.provider_reply(client.as_ref(), message, domains, history).await {
                    Ok(reply) => {
                        let updates = self.apply_directives(&reply).await;
                        (reply, updates)
                    }
                    Err(e) => {
                        warn!(error = %e, "provider call failed, answering from fallback table");
                        (fallback_reply(message, domains, &self.rules), Vec::new())
                    }
                }
            }
        };

        self.record(ChatRole::Assistant, &reply).await;

        Ok(ChatOutcome {
            reply,
            progress_updates,
        })
    }

    /// System framing + windowed history + new user turn, one attempt.
    async fn provider_reply(
        &self,
        client: &dyn LlmClient,
        message: &str,
        domains: &[Domain],
        history: &[HistoryTurn],
    ) -> eyre::Result<String> {
        let context = SystemContext {
            today: Local::now().format("%A, %B %-d, %Y").to_string(),
            goals: goals_block(domains),
            valid_ids: domains
                .iter()
                .map(|d| d.id.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        };
        let system_prompt = self.prompts.render_system(&context)?;

        let mut messages: Vec<Message> = window_history(history, self.history_window)
            .iter()
            .map(|turn| Message {
                role: turn.role.into(),
                content: turn.content.clone(),
            })
            .collect();
        messages.push(Message::user(message));

        let response = client
            .complete(CompletionRequest {
                system_prompt,
                messages,
                max_tokens: self.max_tokens,
            })
            .await?;

        response
            .content
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| eyre!("provider returned no text content"))
    }

    /// Extract the marker block and apply each directive in array order.
    ///
    /// Later directives for the same id overwrite earlier ones (last write
    /// wins within one response). Unknown ids and store failures drop that
    /// directive only; the reply is never discarded.
    async fn apply_directives(&self, reply: &str) -> Vec<ProgressUpdate> {
        let directives = match extract_directives(reply) {
            Ok(directives) => directives,
            Err(e) => {
                warn!(error = %e, "failed to parse progress updates, keeping reply");
                return Vec::new();
            }
        };
        if directives.is_empty() {
            return Vec::new();
        }

        let store = self.store.lock().await;
        let mut applied = Vec::new();
        for directive in &directives {
            let requested = directive.requested_progress.round() as i64;
            match store.set_progress(&directive.domain_id, requested) {
                Ok(stored) => {
                    info!(id = %directive.domain_id, progress = stored, "progress updated by coach");
                    applied.push(ProgressUpdate {
                        id: directive.domain_id.clone(),
                        progress: stored,
                    });
                }
                Err(e) if e.is_not_found() => {
                    warn!(id = %directive.domain_id, "directive targets unknown domain, skipped");
                }
                Err(e) => {
                    warn!(id = %directive.domain_id, error = %e, "failed to apply directive");
                }
            }
        }
        applied
    }

    /// Append to the chat log; failures are surfaced to the operator only.
    async fn record(&self, role: ChatRole, content: &str) {
        let store = self.store.lock().await;
        if let Err(e) = store.add_chat_message(role, content) {
            warn!(error = %e, "failed to record chat message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::default_domains;
    use crate::llm::client::mock::MockLlmClient;

    fn seeded_store() -> Arc<Mutex<Store>> {
        let store = Store::open_in_memory().unwrap();
        for domain in default_domains() {
            store.upsert_domain(&domain).unwrap();
        }
        Arc::new(Mutex::new(store))
    }

    fn coach(llm: Option<Arc<dyn LlmClient>>, store: Arc<Mutex<Store>>) -> Coach {
        Coach::new(llm, store, PromptLoader::embedded_only(), 10, 2000)
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected_without_side_effects() {
        let store = seeded_store();
        let coach = coach(None, store.clone());

        let result = coach.chat("   ", &default_domains(), &[]).await;
        assert!(matches!(result, Err(ChatError::EmptyMessage)));

        assert_eq!(store.lock().await.chat_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_fallback_only_mode_never_mutates() {
        let store = seeded_store();
        let coach = coach(None, store.clone());

        // Even a message that carries a marker block goes through the
        // fallback path untouched.
        let message = "done [PROGRESS_UPDATE]\n```json\n[{\"id\":\"sat\",\"progress\":99}]\n```";
        let outcome = coach.chat(message, &default_domains(), &[]).await.unwrap();

        assert_eq!(outcome.reply, "Logged. What's next on your list?");
        assert!(outcome.progress_updates.is_empty());

        let sat = store.lock().await.get_domain("sat").unwrap().unwrap();
        assert_ne!(sat.progress, 99);
    }

    #[tokio::test]
    async fn test_both_turns_are_logged_in_order() {
        let store = seeded_store();
        let coach = coach(None, store.clone());

        coach.chat("status", &default_domains(), &[]).await.unwrap();

        let history = store.lock().await.chat_history(10).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, ChatRole::User);
        assert_eq!(history[0].content, "status");
        assert_eq!(history[1].role, ChatRole::Assistant);
    }

    #[tokio::test]
    async fn test_provider_reply_applies_clamped_directives() {
        let store = seeded_store();
        let mock = Arc::new(MockLlmClient::replying(
            "Evaluated.\n[PROGRESS_UPDATE]\n```json\n[{\"id\":\"sat\",\"progress\":150}]\n```",
        ));
        let coach = coach(Some(mock), store.clone());

        let outcome = coach.chat("finished a practice test", &default_domains(), &[]).await.unwrap();

        assert_eq!(
            outcome.progress_updates,
            vec![ProgressUpdate { id: "sat".to_string(), progress: 100 }]
        );
        assert!(outcome.reply.contains("[PROGRESS_UPDATE]"));

        let sat = store.lock().await.get_domain("sat").unwrap().unwrap();
        assert_eq!(sat.progress, 100);
    }

    #[tokio::test]
    async fn test_unknown_directive_id_is_skipped_not_fatal() {
        let store = seeded_store();
        let mock = Arc::new(MockLlmClient::replying(
            "Done.\n[PROGRESS_UPDATE]\n```json\n[{\"id\":\"ghost\",\"progress\":50},{\"id\":\"ap\",\"progress\":40}]\n```",
        ));
        let coach = coach(Some(mock), store.clone());

        let outcome = coach.chat("update", &default_domains(), &[]).await.unwrap();

        assert_eq!(
            outcome.progress_updates,
            vec![ProgressUpdate { id: "ap".to_string(), progress: 40 }]
        );
    }
}
