use aviontalk_client::{ApiClient, AuthHeaders};
use aviontalk_types::models::Channel;

use crate::screen::ScreenState;

/// Channel directory plus the create-channel form.
#[derive(Default)]
pub struct ChannelListScreen {
    pub channels: Vec<Channel>,
    pub draft_name: String,
    pub state: ScreenState,
}

impl ChannelListScreen {
    pub fn new() -> Self {
        Self { state: ScreenState::new(), ..Default::default() }
    }

    pub async fn load(&mut self, api: &ApiClient, auth: &AuthHeaders) {
        if !self.state.begin_load() {
            return;
        }
        let result = api.channels(auth).await;
        if !self.state.is_alive() {
            return;
        }
        match result {
            Ok(list) => {
                self.channels = list;
                self.state.load_ready();
            }
            Err(err) => self.state.load_failed_from(&err),
        }
    }

    /// Create a channel from the draft name. A blank name is rejected
    /// inline without a network call; a server rejection (e.g. duplicate
    /// name) leaves the list untouched.
    pub async fn create_channel(&mut self, api: &ApiClient, auth: &AuthHeaders) {
        let name = self.draft_name.trim().to_string();
        if name.is_empty() {
            self.state.set_error("Channel name can't be blank");
            return;
        }
        if !self.state.begin_send() {
            return;
        }

        match api.create_channel(auth, &name).await {
            Ok(channel) => {
                if !self.state.is_alive() {
                    return;
                }
                self.draft_name.clear();
                self.state.send_succeeded(format!("Channel \"#{name}\" created"));
                if !self.channels.iter().any(|c| c.id == channel.id) {
                    self.channels.push(channel);
                }
                // refetch for authoritative ordering; failure keeps the
                // locally appended entry
                if let Ok(list) = api.channels(auth).await {
                    if self.state.is_alive() {
                        self.channels = list;
                    }
                }
            }
            Err(err) => self.state.send_failed_from(&err),
        }
    }
}
