#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Shared vocabulary for the askdoc client.
//!
//! This crate defines the message model, the wire-facing request payload,
//! and the narrow traits through which the conversation core talks to its
//! collaborators (HTTP transport, preference persistence).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which side of the conversation a message belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    Bot,
}

/// Progressive-disclosure state of a bot message's text.
///
/// `Pending` means nothing is shown yet, `Revealing` means text is being
/// emitted one character at a time, `Revealed` is terminal and unlocks
/// attachment rendering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RevealState {
    Pending,
    Revealing,
    Revealed,
}

/// A citation attached to an answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Source {
    #[serde(default)]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Source {
    /// Display label for the source at position `index` (zero-based).
    ///
    /// Falls back `title` -> `filename` -> positional placeholder.
    #[must_use]
    pub fn display_label(&self, index: usize) -> String {
        if !self.title.is_empty() {
            return self.title.clone();
        }
        match &self.filename {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("Source {}", index + 1),
        }
    }
}

/// One entry in the conversation.
///
/// `id` is unique and strictly increasing in insertion order within a
/// session. A message is immutable once appended except for transitions
/// of `reveal_state`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub kind: MessageKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    #[serde(default)]
    pub websearch_used: bool,
    pub reveal_state: RevealState,
}

impl Message {
    /// Create a user message. User text is shown immediately, so it is
    /// born `Revealed`.
    #[must_use]
    pub fn user(id: u64, content: String, websearch_used: bool) -> Self {
        Self {
            id,
            kind: MessageKind::User,
            content,
            timestamp: Utc::now(),
            sources: Vec::new(),
            image_url: None,
            images: Vec::new(),
            link_url: None,
            websearch_used,
            reveal_state: RevealState::Revealed,
        }
    }

    /// Create a bot message from a normalized reply. Bot text starts
    /// `Pending` so the reveal machinery can disclose it.
    #[must_use]
    pub fn bot(id: u64, reply: BotReply) -> Self {
        Self {
            id,
            kind: MessageKind::Bot,
            content: reply.content,
            timestamp: Utc::now(),
            sources: reply.sources,
            image_url: reply.image_url,
            images: reply.images,
            link_url: reply.link_url,
            websearch_used: false,
            reveal_state: RevealState::Pending,
        }
    }

    #[must_use]
    pub fn is_bot(&self) -> bool {
        self.kind == MessageKind::Bot
    }

    /// Attachments (sources, images, link) may only render once the text
    /// has fully revealed.
    #[must_use]
    pub fn attachments_visible(&self) -> bool {
        self.reveal_state == RevealState::Revealed
    }

    #[must_use]
    pub fn has_attachments(&self) -> bool {
        !self.sources.is_empty()
            || !self.images.is_empty()
            || self.image_url.is_some()
            || self.link_url.is_some()
    }
}

/// Canonical record extracted from a backend response, whatever its shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BotReply {
    pub content: String,
    pub sources: Vec<Source>,
    pub image_url: Option<String>,
    pub images: Vec<String>,
    pub link_url: Option<String>,
}

/// One (question, answer) exchange supplied as context to a new request.
///
/// The backend expects capitalized `User` / `AI` keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryPair {
    #[serde(rename = "User")]
    pub user: String,
    #[serde(rename = "AI")]
    pub ai: String,
}

/// Wire-facing request body for a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestPayload {
    pub question: String,
    pub websearch: bool,
    #[serde(rename = "chatHistoryData")]
    pub history: Vec<HistoryPair>,
}

/// The answering service, seen through the narrowest possible interface.
///
/// `send_query` returns the raw response body; the conversation core is
/// responsible for normalizing its shape.
#[async_trait]
pub trait QueryTransport: Send + Sync {
    async fn send_query(&self, payload: &RequestPayload) -> anyhow::Result<serde_json::Value>;

    /// Ask the backend to drop its server-side session data. Best-effort.
    async fn clear_session(&self) -> anyhow::Result<()>;

    /// Fetch the server-side exchange history.
    async fn fetch_history(&self) -> anyhow::Result<serde_json::Value>;
}

/// Key/value preference persistence. May be unavailable; absence is never
/// fatal, so reads return `None` and writes are fire-and-forget.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// Preference key for the web-search toggle.
pub const PREF_WEBSEARCH: &str = "websearch";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_label_falls_back_in_order() {
        let full = Source {
            title: "Annual Report".to_string(),
            filename: Some("report.pdf".to_string()),
            url: None,
        };
        assert_eq!(full.display_label(0), "Annual Report");

        let file_only = Source {
            title: String::new(),
            filename: Some("report.pdf".to_string()),
            url: None,
        };
        assert_eq!(file_only.display_label(0), "report.pdf");

        let bare = Source::default();
        assert_eq!(bare.display_label(2), "Source 3");
    }

    #[test]
    fn history_pair_serializes_with_backend_keys() {
        let pair = HistoryPair {
            user: "q".to_string(),
            ai: "a".to_string(),
        };
        let json = serde_json::to_value(&pair).unwrap_or_default();
        assert_eq!(json["User"], "q");
        assert_eq!(json["AI"], "a");
    }

    #[test]
    fn payload_uses_backend_field_names() {
        let payload = RequestPayload {
            question: "what is this?".to_string(),
            websearch: true,
            history: vec![],
        };
        let json = serde_json::to_value(&payload).unwrap_or_default();
        assert!(json.get("chatHistoryData").is_some());
        assert_eq!(json["websearch"], true);
    }

    #[test]
    fn bot_message_starts_pending_and_locks_attachments() {
        let reply = BotReply {
            content: "hello".to_string(),
            image_url: Some("http://img".to_string()),
            ..BotReply::default()
        };
        let mut msg = Message::bot(7, reply);
        assert_eq!(msg.reveal_state, RevealState::Pending);
        assert!(msg.has_attachments());
        assert!(!msg.attachments_visible());

        msg.reveal_state = RevealState::Revealed;
        assert!(msg.attachments_visible());
    }
}
