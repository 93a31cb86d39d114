use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: i64,
    pub name: String,
}

/// Discriminator for a message target: `receiver_id` is a channel id or a
/// user id, never both. Serialized as `"Channel"` / `"User"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiverKind {
    Channel,
    User,
}

/// A message as returned by `GET /messages`. The sender is an embedded
/// id+email snapshot and may be absent on malformed rows — display code
/// must fall back to an explicit "unknown" placeholder, never guess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub body: String,
    #[serde(default)]
    pub sender: Option<User>,
    pub receiver_id: i64,
    #[serde(rename = "receiver_class")]
    pub receiver_kind: ReceiverKind,
    pub created_at: DateTime<Utc>,
}
