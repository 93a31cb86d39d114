use tracing::info;

use aviontalk_client::{ApiClient, SessionStore};

use crate::screen::ScreenState;

/// Login / registration form. The only place (besides logout) allowed to
/// mutate the [`SessionStore`].
#[derive(Default)]
pub struct LoginScreen {
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub registering: bool,
    pub state: ScreenState,
}

impl LoginScreen {
    pub fn new() -> Self {
        Self { state: ScreenState::new(), ..Default::default() }
    }

    /// Submit the form. Returns true when a session was established.
    pub async fn submit(&mut self, api: &ApiClient, store: &SessionStore) -> bool {
        let email = self.email.trim().to_string();
        if email.is_empty() || self.password.is_empty() {
            self.state.set_error("Email and password are required");
            return false;
        }
        if !self.state.begin_load() {
            return false;
        }

        let result = if self.registering {
            api.register(&email, &self.password, &self.password_confirmation).await
        } else {
            api.sign_in(&email, &self.password).await
        };
        if !self.state.is_alive() {
            return false;
        }

        match result {
            Ok((user, headers)) => {
                info!(uid = %headers.uid, "authenticated");
                store.set_session(user, headers);
                self.password.clear();
                self.password_confirmation.clear();
                self.state.load_ready();
                true
            }
            Err(err) => {
                self.state.load_failed(err.user_message());
                false
            }
        }
    }
}
