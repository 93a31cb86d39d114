use aviontalk_client::{ApiClient, AuthHeaders, SessionStore};
use aviontalk_types::models::User;

use crate::screen::ScreenState;

/// Navigation shell: the user directory for direct-message shortcuts and
/// the logout entry point.
#[derive(Default)]
pub struct NavigationScreen {
    pub users: Vec<User>,
    pub state: ScreenState,
}

impl NavigationScreen {
    pub fn new() -> Self {
        Self { state: ScreenState::new(), ..Default::default() }
    }

    pub async fn load(&mut self, api: &ApiClient, auth: &AuthHeaders) {
        if !self.state.begin_load() {
            return;
        }
        let result = api.users(auth).await;
        if !self.state.is_alive() {
            return;
        }
        match result {
            Ok(users) => {
                self.users = users;
                self.state.load_ready();
            }
            Err(err) => self.state.load_failed_from(&err),
        }
    }

    /// Everyone except the current identity, for the DM list.
    pub fn dm_peers<'a>(&'a self, identity: &'a User) -> impl Iterator<Item = &'a User> {
        self.users
            .iter()
            .filter(move |u| !u.email.eq_ignore_ascii_case(&identity.email))
    }

    /// The logout flow — the only session mutation outside login.
    pub fn logout(&self, store: &SessionStore) {
        store.clear();
    }
}
