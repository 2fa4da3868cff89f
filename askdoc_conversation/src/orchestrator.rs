//! Driving one question/answer cycle at a time.

use std::sync::Arc;

use askdoc_core::{PREF_WEBSEARCH, PreferenceStore, QueryTransport, RequestPayload};
use tracing::{debug, info, warn};

use crate::history::pair_history;
use crate::normalize::normalize_response;
use crate::store::ConversationStore;

/// Shown when a transport failure carries no message text of its own.
const GENERIC_FAILURE_TEXT: &str = "Failed to send query";

/// How a submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Empty input or another request in flight; nothing changed.
    Rejected,
    /// Answer appended as a bot message with this id.
    Answered(u64),
    /// A reply arrived but matched an existing answer and was dropped.
    Duplicate,
    /// Transport failed; the error is recorded on the store.
    Failed,
}

/// Owns the conversation store and runs the submit/reset cycle against the
/// transport collaborator.
///
/// The transport call inside [`submit`](Self::submit) is the only
/// suspension point; store mutations on either side of it are synchronous,
/// so two resolutions can never interleave.
pub struct QueryOrchestrator {
    store: ConversationStore,
    transport: Arc<dyn QueryTransport>,
    prefs: Option<Arc<dyn PreferenceStore>>,
}

impl QueryOrchestrator {
    #[must_use]
    pub fn new(transport: Arc<dyn QueryTransport>) -> Self {
        Self {
            store: ConversationStore::new(),
            transport,
            prefs: None,
        }
    }

    /// Attach preference persistence and restore the websearch toggle from
    /// it. A missing or unreadable preference leaves the default.
    #[must_use]
    pub fn with_preferences(mut self, prefs: Arc<dyn PreferenceStore>) -> Self {
        if let Some(stored) = prefs.get(PREF_WEBSEARCH) {
            self.store.set_websearch_enabled(stored == "true");
        }
        self.prefs = Some(prefs);
        self
    }

    /// Submit a question.
    ///
    /// The trimmed text is appended as a user message before the transport
    /// is awaited, so the question is visible immediately and survives any
    /// failure. Empty input and submissions made while a request is already
    /// in flight are discarded silently. Whatever happens at the transport,
    /// the in-flight flag ends false.
    pub async fn submit(&mut self, raw: &str) -> SubmitOutcome {
        let question = raw.trim();
        if question.is_empty() {
            return SubmitOutcome::Rejected;
        }
        if !self.store.begin_request() {
            return SubmitOutcome::Rejected;
        }

        // Context pairs come from the exchanges that preceded this
        // submission; the new question travels in the payload itself.
        let history = pair_history(self.store.messages());
        self.store.append_user_message(question);

        let payload = RequestPayload {
            question: question.to_string(),
            websearch: self.store.websearch_enabled(),
            history,
        };

        debug!(
            pairs = payload.history.len(),
            websearch = payload.websearch,
            "sending query"
        );

        match self.transport.send_query(&payload).await {
            Ok(response) => {
                let reply = normalize_response(&response);
                match self.store.resolve_request(Some(reply), None) {
                    Some(id) => {
                        info!(message_id = id, "answer received");
                        SubmitOutcome::Answered(id)
                    }
                    None => SubmitOutcome::Duplicate,
                }
            }
            Err(e) => {
                let mut text = e.to_string();
                if text.is_empty() {
                    text = GENERIC_FAILURE_TEXT.to_string();
                }
                warn!("query failed: {text}");
                self.store.resolve_request(None, Some(text));
                SubmitOutcome::Failed
            }
        }
    }

    /// Clear the conversation, locally and server-side.
    ///
    /// The remote clear is best-effort: its failure is logged and local
    /// state clears regardless, because a lost server-side session is not
    /// worse than visibly stuck UI state.
    pub async fn reset(&mut self) {
        if let Err(e) = self.transport.clear_session().await {
            warn!("server-side session clear failed: {e:#}");
        }
        self.store.reset();
    }

    /// Flip the websearch preference and persist it when a preference
    /// store is attached.
    pub fn set_websearch_enabled(&mut self, enabled: bool) {
        self.store.set_websearch_enabled(enabled);
        if let Some(prefs) = &self.prefs {
            prefs.set(PREF_WEBSEARCH, if enabled { "true" } else { "false" });
        }
    }

    pub fn clear_error(&mut self) {
        self.store.clear_error();
    }

    /// Read-only view of the conversation state.
    #[must_use]
    pub const fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Mutable access for reveal-state transitions.
    pub const fn store_mut(&mut self) -> &mut ConversationStore {
        &mut self.store
    }
}
