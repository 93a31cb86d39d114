use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Fallback when a failure response carries no usable message.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum Error {
    /// Business-rule rejection: the server answered with a non-2xx status
    /// and (usually) a structured message. Non-fatal; retry is manual.
    #[error("{message}")]
    Api { status: StatusCode, message: String },

    /// Transport-level failure: connection refused, DNS, malformed body.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A protected call was attempted without a session.
    #[error("not authenticated")]
    NotAuthenticated,
}

impl Error {
    /// True for responses that invalidate the current session. Callers must
    /// treat this as fatal and force re-authentication; the gateway itself
    /// never touches the session store.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Error::Api { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }

    /// Human-readable text for inline display.
    pub fn user_message(&self) -> String {
        match self {
            Error::Api { message, .. } => message.clone(),
            Error::Transport(_) => GENERIC_FAILURE.to_string(),
            Error::NotAuthenticated => "You are not logged in.".to_string(),
        }
    }
}
