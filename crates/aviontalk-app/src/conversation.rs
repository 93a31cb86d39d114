use chrono::{DateTime, Utc};
use tracing::debug;

use aviontalk_client::ConversationTarget;
use aviontalk_types::api::MessageReceipt;
use aviontalk_types::models::{Message, User};

/// Shown when a message carries no sender snapshot. Ownership is never
/// inferred from message id or position.
pub const UNKNOWN_SENDER: &str = "Unknown User";

pub fn sender_email(message: &Message) -> &str {
    message.sender.as_ref().map_or(UNKNOWN_SENDER, |s| s.email.as_str())
}

/// Whether this message was sent by the current identity, by
/// case-insensitive email comparison. Messages without a sender snapshot
/// are never "mine".
pub fn is_mine(message: &Message, identity: &User) -> bool {
    message
        .sender
        .as_ref()
        .is_some_and(|s| s.email.eq_ignore_ascii_case(&identity.email))
}

/// In-memory message list for one conversation, kept consistent across
/// optimistic appends and reconciling refetches. Merges are keyed on
/// message id — never blind replacement — so a stale refetch landing after
/// a newer optimistic append cannot drop it.
#[derive(Debug, Default)]
pub struct MessageLog {
    entries: Vec<Message>,
    // Local fallback ids count down from -1 so they can never collide with
    // server-assigned ids.
    next_local_id: i64,
}

impl MessageLog {
    pub fn new() -> Self {
        Self { entries: Vec::new(), next_local_id: -1 }
    }

    pub fn messages(&self) -> &[Message] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Append an optimistic entry for a message the user just submitted.
    /// Each field prefers the server's write receipt and falls back to
    /// local knowledge: a countdown id, the submission time, the current
    /// identity as sender. Returns the id the entry was given.
    pub fn append_sent(
        &mut self,
        receipt: MessageReceipt,
        body: &str,
        target: ConversationTarget,
        identity: &User,
        now: DateTime<Utc>,
    ) -> i64 {
        let id = receipt.id.unwrap_or_else(|| {
            let id = self.next_local_id;
            self.next_local_id -= 1;
            id
        });
        let message = Message {
            id,
            body: receipt.body.unwrap_or_else(|| body.to_string()),
            sender: Some(receipt.sender.unwrap_or_else(|| identity.clone())),
            receiver_id: target.receiver_id,
            receiver_kind: target.kind,
            created_at: receipt.created_at.unwrap_or(now),
        };
        debug!(id, "optimistic append");
        self.entries.push(message);
        self.sort();
        id
    }

    /// Merge a reconciling refetch. Server truth wins for every id it
    /// contains; optimistic entries the server does not know yet survive.
    /// A fallback-id entry whose server copy has arrived (same sender and
    /// body) is replaced, never duplicated.
    pub fn reconcile(&mut self, server: Vec<Message>) {
        let mut merged: Vec<Message> = Vec::with_capacity(server.len() + self.entries.len());
        let mut seen_ids: Vec<i64> = Vec::with_capacity(server.len());
        for message in server {
            if !seen_ids.contains(&message.id) {
                seen_ids.push(message.id);
                merged.push(message);
            }
        }

        // Each server row may replace at most one fallback entry, so two
        // identical sends don't both vanish when only the first copy has
        // landed server-side.
        let mut consumed: Vec<i64> = Vec::new();
        for local in self.entries.drain(..) {
            let keep = if local.id >= 0 {
                // Real-id optimism not yet visible in this (possibly stale)
                // refetch.
                !seen_ids.contains(&local.id)
            } else {
                // Fallback id: drop once the server copy of the same
                // message shows up.
                match merged.iter().find(|m| {
                    !consumed.contains(&m.id)
                        && m.body == local.body
                        && sender_matches(m, &local)
                }) {
                    Some(matched) => {
                        consumed.push(matched.id);
                        false
                    }
                    None => true,
                }
            };
            if keep {
                merged.push(local);
            }
        }

        self.entries = merged;
        self.sort();
    }

    /// Ascending by `created_at`, id as tie-breaker — the display order for
    /// both channel rooms and direct conversations.
    fn sort(&mut self) {
        self.entries
            .sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    }
}

fn sender_matches(a: &Message, b: &Message) -> bool {
    match (&a.sender, &b.sender) {
        (Some(x), Some(y)) => x.email.eq_ignore_ascii_case(&y.email),
        _ => false,
    }
}
