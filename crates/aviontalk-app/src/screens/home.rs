use aviontalk_client::{ApiClient, AuthHeaders};
use aviontalk_types::models::{Message, User};

use crate::screen::ScreenState;

/// Dashboard: the user directory plus the five most recent messages from
/// the caller's full feed.
const RECENT_LIMIT: usize = 5;

#[derive(Default)]
pub struct HomeScreen {
    pub users: Vec<User>,
    pub recent: Vec<Message>,
    pub state: ScreenState,
}

impl HomeScreen {
    pub fn new() -> Self {
        Self { state: ScreenState::new(), ..Default::default() }
    }

    /// Load (or user-triggered reload of) the dashboard. A failing users
    /// fetch marks the screen failed; a failing recent-messages fetch is
    /// non-fatal and leaves whatever was already rendered.
    pub async fn load(&mut self, api: &ApiClient, auth: &AuthHeaders) {
        if !self.state.begin_load() {
            return;
        }

        let users = api.users(auth).await;
        if !self.state.is_alive() {
            return;
        }
        let users_error = match users {
            Ok(list) => {
                self.users = list;
                None
            }
            Err(err) => Some(err),
        };

        if let Ok(feed) = api.messages(auth, None).await {
            if !self.state.is_alive() {
                return;
            }
            self.recent = select_recent(feed);
        }

        match users_error {
            None => self.state.load_ready(),
            Some(err) => self.state.load_failed_from(&err),
        }
    }
}

/// Newest-first, capped, and skipping rows with an empty body or no
/// resolvable sender.
fn select_recent(mut feed: Vec<Message>) -> Vec<Message> {
    feed.retain(|m| !m.body.is_empty() && m.sender.is_some());
    feed.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    feed.truncate(RECENT_LIMIT);
    feed
}
