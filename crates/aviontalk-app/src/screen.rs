use chrono::{DateTime, Duration, Utc};

use aviontalk_client::Error;

/// How long a transient success acknowledgment stays visible.
pub const NOTICE_TTL_SECS: i64 = 3;

/// Per-screen lifecycle: `Idle → Loading → {Ready, Failed}`; `Ready` may
/// pass through `Sending` on a submit and always returns to `Ready`,
/// with or without an inline error. `Failed` is recoverable only by an
/// explicit user-triggered retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Ready,
    Sending,
    Failed,
}

/// Transient acknowledgment ("Message sent", "Channel created") that
/// expires after [`NOTICE_TTL_SECS`]. Expiry is driven by an explicit
/// `tick` so rendering surfaces decide when to sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    expires_at: DateTime<Utc>,
}

impl Notice {
    fn new(text: String) -> Self {
        Self { text, expires_at: Utc::now() + Duration::seconds(NOTICE_TTL_SECS) }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Tri-state plus inline feedback shared by every screen. The state never
/// owns the screen's data: a failure blocks new operations but previously
/// loaded lists stay rendered.
#[derive(Debug, Default)]
pub struct ScreenState {
    phase: Phase,
    error: Option<String>,
    notice: Option<Notice>,
    alive: bool,
    session_expired: bool,
}

impl ScreenState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            error: None,
            notice: None,
            alive: true,
            session_expired: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Mount-guard: at most one in-flight load per screen instance.
    /// Returns false (and does nothing) when a load is already running or
    /// the screen has been unmounted.
    pub fn begin_load(&mut self) -> bool {
        if !self.alive || self.phase == Phase::Loading || self.phase == Phase::Sending {
            return false;
        }
        self.phase = Phase::Loading;
        self.error = None;
        self.session_expired = false;
        true
    }

    pub fn load_ready(&mut self) {
        self.phase = Phase::Ready;
    }

    pub fn load_failed(&mut self, message: impl Into<String>) {
        self.phase = Phase::Failed;
        self.error = Some(message.into());
    }

    /// Record a failed load from a gateway error, flagging session expiry
    /// so the rendering surface can force re-authentication.
    pub fn load_failed_from(&mut self, err: &Error) {
        self.session_expired = err.is_auth_failure();
        self.load_failed(err.user_message());
    }

    /// Begin a submit. Only legal from `Ready`.
    pub fn begin_send(&mut self) -> bool {
        if !self.alive || self.phase != Phase::Ready {
            return false;
        }
        self.phase = Phase::Sending;
        self.error = None;
        self.session_expired = false;
        true
    }

    pub fn send_succeeded(&mut self, notice: impl Into<String>) {
        self.phase = Phase::Ready;
        self.notice = Some(Notice::new(notice.into()));
    }

    /// The screen stays usable; any optimistic state the caller already
    /// applied is deliberately left in place.
    pub fn send_failed(&mut self, message: impl Into<String>) {
        self.phase = Phase::Ready;
        self.error = Some(message.into());
    }

    pub fn send_failed_from(&mut self, err: &Error) {
        self.session_expired = err.is_auth_failure();
        self.send_failed(err.user_message());
    }

    /// True when the last failure was an authentication failure — fatal to
    /// the current session, the caller must log out and re-authenticate.
    pub fn session_expired(&self) -> bool {
        self.session_expired
    }

    /// Inline feedback for client-side validation; no phase change and no
    /// network call has happened.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Sweep the transient notice once its interval has elapsed.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if self.notice.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.notice = None;
        }
    }

    /// Liveness flag: results of calls that complete after unmount must be
    /// discarded by the caller, not applied.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn unmount(&mut self) {
        self.alive = false;
    }
}
