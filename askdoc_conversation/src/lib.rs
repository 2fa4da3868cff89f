#![warn(
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

//! Conversation orchestration for the askdoc client.
//!
//! This crate owns conversation state and drives one question/answer cycle
//! at a time: it serializes state into request payloads, enforces the
//! single-in-flight-request rule, normalizes heterogeneous backend response
//! shapes into a canonical reply, deduplicates repeated answers, and exposes
//! the streaming-reveal state machine that progressively discloses answer
//! text before its attachments.
//!
//! # Key invariants
//! - Message ids are strictly increasing in insertion order
//! - At most one request is in flight per conversation
//! - A request never ends "stuck": every code path resolves it
//! - Attachments never render before their owning text has fully revealed

mod history;
mod normalize;
mod orchestrator;
mod reveal;
mod store;

pub use history::pair_history;
pub use normalize::{NO_RESPONSE_TEXT, normalize_response};
pub use orchestrator::{QueryOrchestrator, SubmitOutcome};
pub use reveal::{Reveal, RevealConfig, RevealFrame, RevealHandle, spawn_reveal};
pub use store::ConversationStore;
