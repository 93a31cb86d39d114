use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ReceiverKind, User};

// -- Envelope --

/// The remote API wraps most payloads as `{ "data": T }` but is not
/// consistent about it; some responses are the bare value. Callers always
/// see the unwrapped `T`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(value) => value,
        }
    }
}

// -- Auth --

#[derive(Debug, Serialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

// -- Channels --

#[derive(Debug, Serialize)]
pub struct CreateChannelRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct AddMemberRequest {
    pub id: i64,
    pub member_id: i64,
}

// -- Messages --

#[derive(Debug, Serialize)]
pub struct SendMessageRequest {
    pub receiver_id: i64,
    pub receiver_class: ReceiverKind,
    pub body: String,
}

/// Write receipt from `POST /messages`. The server does not guarantee the
/// full message shape in the response, so every field is optional; the
/// view-model fills the gaps from local state.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageReceipt {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub sender: Option<User>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// -- Errors --

/// Structured failure body on non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub errors: Option<ErrorDetails>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorDetails {
    #[serde(default)]
    pub full_messages: Vec<String>,
}

impl ErrorBody {
    /// Precedence: `errors.full_messages[0]`, then `message`, else nothing.
    pub fn first_message(&self) -> Option<&str> {
        self.errors
            .as_ref()
            .and_then(|e| e.full_messages.first())
            .map(String::as_str)
            .or(self.message.as_deref())
    }
}
