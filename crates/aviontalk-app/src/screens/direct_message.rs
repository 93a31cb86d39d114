use chrono::Utc;
use tracing::debug;

use aviontalk_client::{ApiClient, AuthHeaders, ConversationTarget};
use aviontalk_types::models::User;

use crate::conversation::MessageLog;
use crate::screen::ScreenState;

/// One-to-one conversation with a peer. The server returns both directions
/// of the conversation for a single `receiver_id` query; display order is
/// ascending by `created_at`.
pub struct DirectMessageScreen {
    pub peer: User,
    pub log: MessageLog,
    pub draft: String,
    pub state: ScreenState,
}

impl DirectMessageScreen {
    pub fn new(peer: User) -> Self {
        Self {
            peer,
            log: MessageLog::new(),
            draft: String::new(),
            state: ScreenState::new(),
        }
    }

    fn target(&self) -> ConversationTarget {
        ConversationTarget::user(self.peer.id)
    }

    pub async fn load(&mut self, api: &ApiClient, auth: &AuthHeaders) {
        if !self.state.begin_load() {
            return;
        }
        let result = api.messages(auth, Some(self.target())).await;
        if !self.state.is_alive() {
            return;
        }
        match result {
            Ok(server) => {
                self.log.reconcile(server);
                self.state.load_ready();
            }
            Err(err) => self.state.load_failed_from(&err),
        }
    }

    /// User-triggered refresh: drop the rendered history and reload.
    pub async fn refresh(&mut self, api: &ApiClient, auth: &AuthHeaders) {
        self.log.reset();
        self.state.clear_error();
        self.load(api, auth).await;
    }

    /// Same optimistic send-and-reconcile protocol as the channel room.
    pub async fn send(&mut self, api: &ApiClient, auth: &AuthHeaders, identity: &User) {
        let body = self.draft.trim().to_string();
        if body.is_empty() {
            self.state.set_error("Message can't be blank");
            return;
        }
        if !self.state.begin_send() {
            return;
        }

        match api.send_message(auth, self.target(), &body).await {
            Ok(receipt) => {
                if !self.state.is_alive() {
                    return;
                }
                self.log.append_sent(receipt, &body, self.target(), identity, Utc::now());
                self.draft.clear();
                self.state.send_succeeded("Message sent");

                match api.messages(auth, Some(self.target())).await {
                    Ok(server) => {
                        if self.state.is_alive() {
                            self.log.reconcile(server);
                        }
                    }
                    Err(err) => debug!(error = %err, "reconciling refetch failed; keeping optimistic entry"),
                }
            }
            Err(err) => self.state.send_failed_from(&err),
        }
    }
}
