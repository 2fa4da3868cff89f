//! The single source of truth for conversation state.
//!
//! All mutation passes through the named transitions (`append_user_message`,
//! `begin_request` / `resolve_request`, `reset`); external layers only read
//! projections and invoke transitions. No global singleton: one store per
//! conversation session.

use askdoc_core::{BotReply, Message, RevealState};
use tracing::debug;

/// Owned conversation state: ordered messages, request-lifecycle flags and
/// user preferences.
///
/// The message sequence is append-only during a session except for the
/// wholesale clear in [`reset`](Self::reset).
#[derive(Debug, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
    next_id: u64,
    request_in_flight: bool,
    last_error: Option<String>,
    websearch_enabled: bool,
    has_user_sent_message: bool,
}

impl ConversationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_websearch_enabled(mut self, enabled: bool) -> Self {
        self.websearch_enabled = enabled;
        self
    }

    /// Append a user message carrying the current websearch preference.
    ///
    /// Callers validate upstream that `content` is non-empty trimmed text.
    pub fn append_user_message(&mut self, content: &str) -> u64 {
        let id = self.take_id();
        self.messages
            .push(Message::user(id, content.to_string(), self.websearch_enabled));
        self.has_user_sent_message = true;
        id
    }

    /// Mark a request as in flight.
    ///
    /// Returns `false` without changing anything if another request is
    /// already outstanding; this is what enforces at-most-one-in-flight.
    /// On success the previous error is cleared.
    pub fn begin_request(&mut self) -> bool {
        if self.request_in_flight {
            debug!("rejecting submission: a request is already in flight");
            return false;
        }
        self.request_in_flight = true;
        self.last_error = None;
        true
    }

    /// End the in-flight request, recording its outcome.
    ///
    /// A reply is appended as a bot message unless its content exactly
    /// matches an existing bot message (a backend occasionally re-serves a
    /// canned answer). Returns the id of the appended message, or `None`
    /// when the reply was deduplicated or the request failed.
    ///
    /// `request_in_flight` ends false on every path.
    pub fn resolve_request(
        &mut self,
        reply: Option<BotReply>,
        error: Option<String>,
    ) -> Option<u64> {
        self.request_in_flight = false;
        if let Some(message) = error {
            self.last_error = Some(message);
        }
        let reply = reply?;
        if self.has_bot_message_with(&reply.content) {
            debug!("dropping duplicate bot reply");
            return None;
        }
        let id = self.take_id();
        self.messages.push(Message::bot(id, reply));
        Some(id)
    }

    /// Clear the whole conversation: messages, error, in-flight flag and
    /// the has-sent flag. The websearch preference survives a reset.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.request_in_flight = false;
        self.last_error = None;
        self.has_user_sent_message = false;
    }

    pub const fn set_websearch_enabled(&mut self, enabled: bool) {
        self.websearch_enabled = enabled;
    }

    /// Dismiss the current error banner.
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Transition a message's reveal state. Ignored for unknown ids (the
    /// message may have been cleared by a reset while a reveal was running).
    pub fn set_reveal_state(&mut self, id: u64, state: RevealState) {
        if let Some(msg) = self.messages.iter_mut().find(|m| m.id == id) {
            msg.reveal_state = state;
        }
    }

    // Read-only projections.

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn message(&self, id: u64) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    #[must_use]
    pub const fn is_request_in_flight(&self) -> bool {
        self.request_in_flight
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    #[must_use]
    pub const fn websearch_enabled(&self) -> bool {
        self.websearch_enabled
    }

    #[must_use]
    pub const fn has_user_sent_message(&self) -> bool {
        self.has_user_sent_message
    }

    fn has_bot_message_with(&self, content: &str) -> bool {
        self.messages
            .iter()
            .any(|m| m.is_bot() && m.content == content)
    }

    fn take_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(content: &str) -> BotReply {
        BotReply {
            content: content.to_string(),
            ..BotReply::default()
        }
    }

    #[test]
    fn ids_strictly_increase() {
        let mut store = ConversationStore::new();
        let a = store.append_user_message("first");
        assert!(store.begin_request());
        let b = store
            .resolve_request(Some(reply("answer")), None)
            .unwrap_or(0);
        let c = store.append_user_message("second");
        assert!(a < b && b < c);
    }

    #[test]
    fn begin_request_is_exclusive() {
        let mut store = ConversationStore::new();
        assert!(store.begin_request());
        assert!(!store.begin_request());
        store.resolve_request(None, None);
        assert!(store.begin_request());
    }

    #[test]
    fn begin_request_clears_previous_error() {
        let mut store = ConversationStore::new();
        assert!(store.begin_request());
        store.resolve_request(None, Some("backend down".to_string()));
        assert_eq!(store.last_error(), Some("backend down"));
        assert!(store.begin_request());
        assert_eq!(store.last_error(), None);
    }

    #[test]
    fn resolve_always_ends_in_flight() {
        let mut store = ConversationStore::new();
        assert!(store.begin_request());
        store.resolve_request(None, Some("boom".to_string()));
        assert!(!store.is_request_in_flight());

        assert!(store.begin_request());
        store.resolve_request(Some(reply("ok")), None);
        assert!(!store.is_request_in_flight());
    }

    #[test]
    fn duplicate_bot_content_is_dropped() {
        let mut store = ConversationStore::new();
        store.begin_request();
        assert!(store.resolve_request(Some(reply("same answer")), None).is_some());
        store.begin_request();
        assert!(store.resolve_request(Some(reply("same answer")), None).is_none());
        let bots = store.messages().iter().filter(|m| m.is_bot()).count();
        assert_eq!(bots, 1);
        assert!(!store.is_request_in_flight());
    }

    #[test]
    fn dedup_is_exact_match_only() {
        let mut store = ConversationStore::new();
        store.begin_request();
        store.resolve_request(Some(reply("answer")), None);
        store.begin_request();
        assert!(store.resolve_request(Some(reply("answer ")), None).is_some());
    }

    #[test]
    fn user_messages_never_deduplicated() {
        let mut store = ConversationStore::new();
        store.append_user_message("again");
        store.append_user_message("again");
        assert_eq!(store.messages().len(), 2);
    }

    #[test]
    fn reset_clears_everything_but_preference() {
        let mut store = ConversationStore::new().with_websearch_enabled(true);
        store.append_user_message("hello");
        store.begin_request();
        store.resolve_request(None, Some("oops".to_string()));

        store.reset();

        assert!(store.messages().is_empty());
        assert!(!store.is_request_in_flight());
        assert_eq!(store.last_error(), None);
        assert!(!store.has_user_sent_message());
        assert!(store.websearch_enabled());
    }

    #[test]
    fn reveal_state_transition_ignores_unknown_id() {
        let mut store = ConversationStore::new();
        store.set_reveal_state(42, RevealState::Revealed);
        assert!(store.messages().is_empty());

        store.begin_request();
        let id = store.resolve_request(Some(reply("hi")), None).unwrap_or(0);
        store.set_reveal_state(id, RevealState::Revealing);
        assert_eq!(
            store.message(id).map(|m| m.reveal_state),
            Some(RevealState::Revealing)
        );
    }

    #[test]
    fn user_message_records_websearch_preference() {
        let mut store = ConversationStore::new();
        store.set_websearch_enabled(true);
        let id = store.append_user_message("with search");
        assert!(store.message(id).is_some_and(|m| m.websearch_used));
    }
}
