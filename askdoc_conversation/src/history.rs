//! Deriving request context from the message sequence.

use askdoc_core::{HistoryPair, Message, MessageKind};

/// Produce ordered (question, answer) pairs for an outgoing request.
///
/// Adjacent, non-overlapping scan: a pair is emitted whenever position `i`
/// is a user message and position `i + 1` is a bot message, after which the
/// scan resumes at `i + 2` so each message is used in at most one pair.
/// Unpaired trailing user messages are omitted; the in-flight question
/// travels separately as the payload's `question` field.
#[must_use]
pub fn pair_history(messages: &[Message]) -> Vec<HistoryPair> {
    let mut pairs = Vec::new();
    let mut i = 0;
    while i + 1 < messages.len() {
        let (current, next) = (&messages[i], &messages[i + 1]);
        if current.kind == MessageKind::User && next.kind == MessageKind::Bot {
            pairs.push(HistoryPair {
                user: current.content.clone(),
                ai: next.content.clone(),
            });
            i += 2;
        } else {
            i += 1;
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use askdoc_core::BotReply;

    fn user(id: u64, content: &str) -> Message {
        Message::user(id, content.to_string(), false)
    }

    fn bot(id: u64, content: &str) -> Message {
        Message::bot(
            id,
            BotReply {
                content: content.to_string(),
                ..BotReply::default()
            },
        )
    }

    #[test]
    fn aligned_sequence_pairs_fully() {
        let messages = vec![
            user(0, "u1"),
            bot(1, "b1"),
            user(2, "u2"),
            bot(3, "b2"),
            user(4, "u3"),
        ];
        let pairs = pair_history(&messages);
        assert_eq!(
            pairs,
            vec![
                HistoryPair {
                    user: "u1".to_string(),
                    ai: "b1".to_string()
                },
                HistoryPair {
                    user: "u2".to_string(),
                    ai: "b2".to_string()
                },
            ]
        );
    }

    #[test]
    fn consecutive_user_messages_skip_the_first() {
        // A failed request leaves a user message without an answer; only
        // the adjacent pair is emitted.
        let messages = vec![user(0, "u1"), user(1, "u2"), bot(2, "b1")];
        let pairs = pair_history(&messages);
        assert_eq!(
            pairs,
            vec![HistoryPair {
                user: "u2".to_string(),
                ai: "b1".to_string()
            }]
        );
    }

    #[test]
    fn double_bot_answer_is_not_double_counted() {
        let messages = vec![user(0, "u1"), bot(1, "b1"), bot(2, "b2"), user(3, "u2")];
        let pairs = pair_history(&messages);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].ai, "b1");
    }

    #[test]
    fn empty_and_single_sequences_yield_nothing() {
        assert!(pair_history(&[]).is_empty());
        assert!(pair_history(&[user(0, "u1")]).is_empty());
        assert!(pair_history(&[bot(0, "b1")]).is_empty());
    }

    #[test]
    fn pairs_preserve_order() {
        let messages = vec![
            user(0, "first"),
            bot(1, "one"),
            user(2, "second"),
            bot(3, "two"),
            user(4, "third"),
            bot(5, "three"),
        ];
        let pairs = pair_history(&messages);
        let users: Vec<&str> = pairs.iter().map(|p| p.user.as_str()).collect();
        assert_eq!(users, vec!["first", "second", "third"]);
    }
}
