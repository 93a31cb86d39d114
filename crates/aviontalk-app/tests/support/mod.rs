//! In-process mock of the remote REST service, faithful to the contract
//! the screens are written against: `{data: T}` envelopes, four auth
//! response headers, `{errors:{full_messages:[...]}}` failure bodies, and
//! symmetric direct-message conversations. Also counts requests so tests
//! can assert that client-side validation never reached the network.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{Value, json};

use aviontalk_types::models::{Channel, Message, ReceiverKind, User};

pub const PASSWORD: &str = "password";

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    channels: Vec<Channel>,
    members: HashMap<i64, Vec<User>>,
    messages: Vec<Message>,
}

#[derive(Default)]
pub struct MockApiState {
    inner: Mutex<Inner>,
    next_id: AtomicI64,
    hits: AtomicUsize,
}

pub struct MockApi {
    pub base_url: String,
    state: Arc<MockApiState>,
}

impl MockApi {
    /// Total requests that reached the server.
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::Relaxed)
    }

    pub fn channel_count(&self) -> usize {
        self.state.inner.lock().unwrap().channels.len()
    }
}

/// Bind an ephemeral port and serve the mock in a background task.
pub async fn spawn() -> MockApi {
    let state = Arc::new(MockApiState::default());
    {
        let mut inner = state.inner.lock().unwrap();
        for (id, name) in [(1, "alex"), (2, "sarah"), (3, "mike"), (4, "emily"), (5, "david")] {
            inner.users.push(User { id, email: format!("{name}@avion.com") });
        }
    }
    state.next_id.store(100, Ordering::Relaxed);

    let app = Router::new()
        .route("/auth/sign_in", post(sign_in))
        .route("/auth/", post(register))
        .route("/users", get(list_users))
        .route("/channels", get(list_channels).post(create_channel))
        .route("/channels/{id}", get(get_channel))
        .route("/channels/{id}/members", get(channel_members))
        .route("/channel/add_member", post(add_member))
        .route("/messages", get(list_messages).post(send_message))
        .layer(middleware::from_fn_with_state(state.clone(), count_hits))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockApi { base_url: format!("http://{addr}"), state }
}

async fn count_hits(
    State(state): State<Arc<MockApiState>>,
    req: Request,
    next: Next,
) -> Response {
    state.hits.fetch_add(1, Ordering::Relaxed);
    next.run(req).await
}

type Rejection = (StatusCode, Json<Value>);

fn reject(status: StatusCode, message: &str) -> Rejection {
    (status, Json(json!({ "errors": { "full_messages": [message] } })))
}

fn auth_headers_for(user: &User) -> [(&'static str, String); 4] {
    [
        ("access-token", format!("mock-token-{}", user.id)),
        ("client", format!("mock-client-{}", user.id)),
        ("expiry", (Utc::now().timestamp() + 86_400).to_string()),
        ("uid", user.email.clone()),
    ]
}

/// Protected routes require the full four-header bundle with a matching
/// token, mirroring the remote service's token-auth scheme.
fn authenticate(state: &MockApiState, headers: &HeaderMap) -> Result<User, Rejection> {
    let value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let (Some(token), Some(_), Some(_), Some(uid)) =
        (value("access-token"), value("client"), value("expiry"), value("uid"))
    else {
        return Err(reject(StatusCode::UNAUTHORIZED, "Invalid login credentials"));
    };

    let inner = state.inner.lock().unwrap();
    let user = inner
        .users
        .iter()
        .find(|u| u.email == uid)
        .cloned()
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Invalid login credentials"))?;
    if token != format!("mock-token-{}", user.id) {
        return Err(reject(StatusCode::UNAUTHORIZED, "Invalid login credentials"));
    }
    Ok(user)
}

async fn sign_in(
    State(state): State<Arc<MockApiState>>,
    Json(body): Json<Value>,
) -> Result<Response, Rejection> {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default();

    let user = {
        let inner = state.inner.lock().unwrap();
        inner.users.iter().find(|u| u.email == email).cloned()
    };
    match user {
        Some(user) if password == PASSWORD => {
            Ok((auth_headers_for(&user), Json(json!({ "data": user }))).into_response())
        }
        _ => Err(reject(StatusCode::UNAUTHORIZED, "Invalid email or password")),
    }
}

async fn register(
    State(state): State<Arc<MockApiState>>,
    Json(body): Json<Value>,
) -> Result<Response, Rejection> {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default();
    let confirmation = body["password_confirmation"].as_str().unwrap_or_default();

    let mut inner = state.inner.lock().unwrap();
    if inner.users.iter().any(|u| u.email == email) {
        return Err(reject(StatusCode::UNPROCESSABLE_ENTITY, "Email has already been taken"));
    }
    if password != confirmation {
        return Err(reject(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Password confirmation doesn't match Password",
        ));
    }

    let user = User { id: state.next_id.fetch_add(1, Ordering::Relaxed), email };
    inner.users.push(user.clone());
    Ok((
        StatusCode::CREATED,
        auth_headers_for(&user),
        Json(json!({ "data": user })),
    )
        .into_response())
}

async fn list_users(
    State(state): State<Arc<MockApiState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, Rejection> {
    authenticate(&state, &headers)?;
    let inner = state.inner.lock().unwrap();
    Ok(Json(json!({ "data": inner.users })))
}

async fn list_channels(
    State(state): State<Arc<MockApiState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, Rejection> {
    authenticate(&state, &headers)?;
    let inner = state.inner.lock().unwrap();
    Ok(Json(json!({ "data": inner.channels })))
}

async fn create_channel(
    State(state): State<Arc<MockApiState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Response, Rejection> {
    let creator = authenticate(&state, &headers)?;
    let name = body["name"].as_str().unwrap_or_default().trim().to_string();
    if name.is_empty() {
        return Err(reject(StatusCode::UNPROCESSABLE_ENTITY, "Name can't be blank"));
    }

    let mut inner = state.inner.lock().unwrap();
    if inner.channels.iter().any(|c| c.name == name) {
        return Err(reject(StatusCode::UNPROCESSABLE_ENTITY, "Name has already been taken"));
    }
    let channel = Channel { id: state.next_id.fetch_add(1, Ordering::Relaxed), name };
    inner.channels.push(channel.clone());
    // the creator is always the first member
    inner.members.insert(channel.id, vec![creator]);
    Ok((StatusCode::CREATED, Json(json!({ "data": channel }))).into_response())
}

async fn get_channel(
    State(state): State<Arc<MockApiState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Value>, Rejection> {
    authenticate(&state, &headers)?;
    let inner = state.inner.lock().unwrap();
    let channel = inner
        .channels
        .iter()
        .find(|c| c.id == id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Channel not found"))?;
    Ok(Json(json!({ "data": channel })))
}

async fn channel_members(
    State(state): State<Arc<MockApiState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Value>, Rejection> {
    authenticate(&state, &headers)?;
    let inner = state.inner.lock().unwrap();
    let members = inner.members.get(&id).cloned().unwrap_or_default();
    Ok(Json(json!({ "data": members })))
}

async fn add_member(
    State(state): State<Arc<MockApiState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Response, Rejection> {
    authenticate(&state, &headers)?;
    let channel_id = body["id"].as_i64().unwrap_or_default();
    let member_id = body["member_id"].as_i64().unwrap_or_default();

    let mut inner = state.inner.lock().unwrap();
    if !inner.channels.iter().any(|c| c.id == channel_id) {
        return Err(reject(StatusCode::NOT_FOUND, "Channel not found"));
    }
    let user = inner
        .users
        .iter()
        .find(|u| u.id == member_id)
        .cloned()
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "User not found"))?;

    let members = inner.members.entry(channel_id).or_default();
    if members.iter().any(|m| m.id == member_id) {
        return Err(reject(StatusCode::UNPROCESSABLE_ENTITY, "User is already a member"));
    }
    members.push(user.clone());
    Ok((StatusCode::CREATED, Json(json!({ "data": user }))).into_response())
}

async fn list_messages(
    State(state): State<Arc<MockApiState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, Rejection> {
    let caller = authenticate(&state, &headers)?;
    let inner = state.inner.lock().unwrap();

    let receiver_id: Option<i64> = params.get("receiver_id").and_then(|v| v.parse().ok());
    let mut selected: Vec<Message> = match (params.get("receiver_class").map(String::as_str), receiver_id) {
        (Some("Channel"), Some(id)) => inner
            .messages
            .iter()
            .filter(|m| m.receiver_kind == ReceiverKind::Channel && m.receiver_id == id)
            .cloned()
            .collect(),
        (Some("User"), Some(peer_id)) => inner
            .messages
            .iter()
            .filter(|m| {
                if m.receiver_kind != ReceiverKind::User {
                    return false;
                }
                let sender_id = m.sender.as_ref().map(|s| s.id);
                // both directions of the conversation
                (m.receiver_id == peer_id && sender_id == Some(caller.id))
                    || (m.receiver_id == caller.id && sender_id == Some(peer_id))
            })
            .cloned()
            .collect(),
        _ => inner.messages.clone(),
    };
    selected.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(Json(json!({ "data": selected })))
}

async fn send_message(
    State(state): State<Arc<MockApiState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Response, Rejection> {
    let sender = authenticate(&state, &headers)?;
    let kind = match body["receiver_class"].as_str() {
        Some("Channel") => ReceiverKind::Channel,
        Some("User") => ReceiverKind::User,
        _ => return Err(reject(StatusCode::UNPROCESSABLE_ENTITY, "Receiver class is invalid")),
    };
    let text = body["body"].as_str().unwrap_or_default().to_string();
    if text.is_empty() {
        return Err(reject(StatusCode::UNPROCESSABLE_ENTITY, "Body can't be blank"));
    }

    let message = Message {
        id: state.next_id.fetch_add(1, Ordering::Relaxed),
        body: text,
        sender: Some(sender),
        receiver_id: body["receiver_id"].as_i64().unwrap_or_default(),
        receiver_kind: kind,
        created_at: Utc::now(),
    };
    state.inner.lock().unwrap().messages.push(message.clone());
    Ok((StatusCode::CREATED, Json(json!({ "data": message }))).into_response())
}
