use chrono::{DateTime, Utc};
use tracing::debug;

use aviontalk_client::{ApiClient, AuthHeaders, ConversationTarget};
use aviontalk_types::models::{Channel, User};

use crate::conversation::MessageLog;
use crate::screen::ScreenState;

/// Screen-lifetime audit entry for a member added from this room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedMember {
    pub user: User,
    pub added_at: DateTime<Utc>,
}

/// One channel: its message log, member list, and the add-member form.
pub struct ChannelRoomScreen {
    channel_id: i64,
    pub channel: Option<Channel>,
    pub log: MessageLog,
    pub members: Vec<User>,
    pub directory: Vec<User>,
    pub recently_added: Vec<AddedMember>,
    pub draft: String,
    pub member_email: String,
    pub state: ScreenState,
}

impl ChannelRoomScreen {
    pub fn new(channel_id: i64) -> Self {
        Self {
            channel_id,
            channel: None,
            log: MessageLog::new(),
            members: Vec::new(),
            directory: Vec::new(),
            recently_added: Vec::new(),
            draft: String::new(),
            member_email: String::new(),
            state: ScreenState::new(),
        }
    }

    pub fn channel_id(&self) -> i64 {
        self.channel_id
    }

    fn target(&self) -> ConversationTarget {
        ConversationTarget::channel(self.channel_id)
    }

    /// Load channel details, messages, members, and the user directory.
    /// Only the channel-details failure is fatal to the load; the other
    /// fetches degrade without clearing rendered state.
    pub async fn load(&mut self, api: &ApiClient, auth: &AuthHeaders) {
        if !self.state.begin_load() {
            return;
        }

        let channel = api.channel(auth, self.channel_id).await;
        if !self.state.is_alive() {
            return;
        }
        match channel {
            Ok(channel) => self.channel = Some(channel),
            Err(err) => {
                self.state.load_failed_from(&err);
                return;
            }
        }

        if let Ok(server) = api.messages(auth, Some(self.target())).await {
            if !self.state.is_alive() {
                return;
            }
            self.log.reconcile(server);
        }

        if let Ok(members) = api.channel_members(auth, self.channel_id).await {
            if !self.state.is_alive() {
                return;
            }
            self.members = members;
        }

        match api.users(auth).await {
            Ok(users) => {
                if !self.state.is_alive() {
                    return;
                }
                self.directory = users;
                self.state.load_ready();
            }
            Err(err) => {
                // room is usable without the directory; the add-member
                // form just cannot resolve emails yet
                self.state.load_ready();
                self.state.set_error(err.user_message());
            }
        }
    }

    /// User-triggered refresh: drop the rendered log and reload everything.
    pub async fn refresh(&mut self, api: &ApiClient, auth: &AuthHeaders) {
        self.log.reset();
        self.state.clear_error();
        self.load(api, auth).await;
    }

    /// Optimistic send-and-reconcile: append a locally-synthesized entry
    /// as soon as the write succeeds, then refetch the channel's messages
    /// and merge by id. A failing refetch leaves the optimistic entry in
    /// place — the user already saw their message.
    pub async fn send_message(&mut self, api: &ApiClient, auth: &AuthHeaders, identity: &User) {
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

    /// Two-step, non-transactional member add. Resolution and the
    /// duplicate check are client-side against already-loaded lists and
    /// never reach the network; local lists update only after the server
    /// accepted the add.
    pub async fn add_member(&mut self, api: &ApiClient, auth: &AuthHeaders) {
        let email = self.member_email.trim().to_string();
        if email.is_empty() {
            self.state.set_error("Please select a user email");
            return;
        }
        let Some(found) = self
            .directory
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(&email))
            .cloned()
        else {
            self.state.set_error("Email not found in user list");
            return;
        };
        if self.members.iter().any(|m| m.id == found.id) {
            self.state
                .set_error(format!("{} is already a member of this channel", found.email));
            return;
        }
        if !self.state.begin_send() {
            return;
        }

        match api.add_member(auth, self.channel_id, found.id).await {
            Ok(member) => {
                if !self.state.is_alive() {
                    return;
                }
                self.member_email.clear();
                self.state.send_succeeded(format!("Added {} to the channel", member.email));
                self.members.push(member.clone());
                self.recently_added.push(AddedMember { user: member, added_at: Utc::now() });

                if let Ok(list) = api.channel_members(auth, self.channel_id).await {
                    if self.state.is_alive() {
                        self.members = list;
                    }
                }
            }
            Err(err) => self.state.send_failed_from(&err),
        }
    }
}
