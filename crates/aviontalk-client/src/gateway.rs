use reqwest::Response;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use aviontalk_types::api::{
    AddMemberRequest, CreateChannelRequest, Envelope, ErrorBody, MessageReceipt, RegisterRequest,
    SendMessageRequest, SignInRequest,
};
use aviontalk_types::models::{Channel, Message, ReceiverKind, User};

use crate::error::{Error, GENERIC_FAILURE, Result};
use crate::session::AuthHeaders;

/// Where a conversation's messages live: a channel or a peer user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversationTarget {
    pub receiver_id: i64,
    pub kind: ReceiverKind,
}

impl ConversationTarget {
    pub fn channel(id: i64) -> Self {
        Self { receiver_id: id, kind: ReceiverKind::Channel }
    }

    pub fn user(id: i64) -> Self {
        Self { receiver_id: id, kind: ReceiverKind::User }
    }

    fn class_name(&self) -> &'static str {
        match self.kind {
            ReceiverKind::Channel => "Channel",
            ReceiverKind::User => "User",
        }
    }
}

/// Thin typed wrapper over the remote REST service. Stateless apart from
/// the connection pool: auth headers are passed in per call, and a failing
/// call never mutates the session store and never retries.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http: reqwest::Client::new(), base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // -- auth --

    /// `POST /auth/sign_in`. Returns the user record and the four-header
    /// capability bundle from the response headers.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(User, AuthHeaders)> {
        let body = SignInRequest { email: email.to_string(), password: password.to_string() };
        let resp = self.http.post(self.url("/auth/sign_in")).json(&body).send().await?;
        self.decode_auth(resp).await
    }

    /// `POST /auth/` (register). Same response contract as sign-in.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        password_confirmation: &str,
    ) -> Result<(User, AuthHeaders)> {
        let body = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            password_confirmation: password_confirmation.to_string(),
        };
        let resp = self.http.post(self.url("/auth/")).json(&body).send().await?;
        self.decode_auth(resp).await
    }

    // -- directories --

    pub async fn users(&self, auth: &AuthHeaders) -> Result<Vec<User>> {
        self.get("/users", auth).await
    }

    pub async fn channels(&self, auth: &AuthHeaders) -> Result<Vec<Channel>> {
        self.get("/channels", auth).await
    }

    pub async fn channel(&self, auth: &AuthHeaders, id: i64) -> Result<Channel> {
        self.get(&format!("/channels/{id}"), auth).await
    }

    pub async fn channel_members(&self, auth: &AuthHeaders, id: i64) -> Result<Vec<User>> {
        self.get(&format!("/channels/{id}/members"), auth).await
    }

    // -- mutations --

    pub async fn create_channel(&self, auth: &AuthHeaders, name: &str) -> Result<Channel> {
        let body = CreateChannelRequest { name: name.to_string() };
        self.post("/channels", &body, auth).await
    }

    /// `POST /channel/add_member`. Returns the added member's id+email.
    pub async fn add_member(
        &self,
        auth: &AuthHeaders,
        channel_id: i64,
        member_id: i64,
    ) -> Result<User> {
        let body = AddMemberRequest { id: channel_id, member_id };
        self.post("/channel/add_member", &body, auth).await
    }

    // -- messages --

    /// `GET /messages`, optionally scoped to one conversation. With no
    /// target the server returns the caller's full message feed.
    pub async fn messages(
        &self,
        auth: &AuthHeaders,
        target: Option<ConversationTarget>,
    ) -> Result<Vec<Message>> {
        let path = match target {
            Some(t) => format!(
                "/messages?receiver_id={}&receiver_class={}",
                t.receiver_id,
                t.class_name()
            ),
            None => "/messages".to_string(),
        };
        self.get(&path, auth).await
    }

    /// `POST /messages`. The receipt is deliberately lenient: the server
    /// does not guarantee the full message shape in the write response.
    pub async fn send_message(
        &self,
        auth: &AuthHeaders,
        target: ConversationTarget,
        body: &str,
    ) -> Result<MessageReceipt> {
        let req = SendMessageRequest {
            receiver_id: target.receiver_id,
            receiver_class: target.kind,
            body: body.to_string(),
        };
        self.post("/messages", &req, auth).await
    }

    // -- plumbing --

    async fn get<T: DeserializeOwned>(&self, path: &str, auth: &AuthHeaders) -> Result<T> {
        debug!(path, "GET");
        let resp = auth.apply(self.http.get(self.url(path))).send().await?;
        Self::decode(resp).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        auth: &AuthHeaders,
    ) -> Result<T> {
        debug!(path, "POST");
        let resp = auth.apply(self.http.post(self.url(path))).json(body).send().await?;
        Self::decode(resp).await
    }

    /// Unwrap the `{data: T} | T` envelope on 2xx; extract the structured
    /// error message otherwise.
    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp.json::<Envelope<T>>().await?.into_inner())
        } else {
            Err(Self::extract_error(resp).await)
        }
    }

    async fn decode_auth(&self, resp: Response) -> Result<(User, AuthHeaders)> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::extract_error(resp).await);
        }
        let headers = AuthHeaders::from_response(resp.headers()).ok_or_else(|| Error::Api {
            status,
            message: "Auth response is missing session headers".to_string(),
        })?;
        let user = resp.json::<Envelope<User>>().await?.into_inner();
        Ok((user, headers))
    }

    async fn extract_error(resp: Response) -> Error {
        let status = resp.status();
        let body: ErrorBody = resp.json().await.unwrap_or_default();
        let message = body.first_message().unwrap_or(GENERIC_FAILURE).to_string();
        warn!(%status, %message, "api call rejected");
        Error::Api { status, message }
    }
}
