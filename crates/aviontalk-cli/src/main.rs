//! Terminal front end: a login prompt followed by a small command shell
//! that drives the screen view-models and renders their state as text.

use std::sync::Arc;

use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;

use aviontalk_app::conversation::{is_mine, sender_email};
use aviontalk_app::screen::Phase;
use aviontalk_app::screens::{
    ChannelListScreen, ChannelRoomScreen, DirectMessageScreen, HomeScreen, LoginScreen,
    NavigationScreen,
};
use aviontalk_client::{ApiClient, AuthHeaders, Session, SessionStore};
use aviontalk_types::models::Message;

const DEFAULT_API_URL: &str = "https://slack-api.up.railway.app/api/v1";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aviontalk=info".into()),
        )
        .init();

    let base_url = std::env::var("AVIONTALK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
    info!(%base_url, "starting");

    let api = ApiClient::new(&base_url);
    let store = SessionStore::new();
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let Some(session) = login(&api, &store, &mut input).await? else {
            break;
        };
        // returns when the user logs out or the session expires
        shell(&api, &store, &session, &mut input).await?;
        if !store.is_authenticated() {
            println!("Logged out.");
        }
    }
    Ok(())
}

async fn prompt(input: &mut Lines<BufReader<Stdin>>, label: &str) -> anyhow::Result<Option<String>> {
    print!("{label}");
    use std::io::Write;
    std::io::stdout().flush()?;
    Ok(input.next_line().await?.map(|line| line.trim().to_string()))
}

/// Prompt until a session is established. `Ok(None)` means EOF on stdin.
async fn login(
    api: &ApiClient,
    store: &SessionStore,
    input: &mut Lines<BufReader<Stdin>>,
) -> anyhow::Result<Option<Arc<Session>>> {
    loop {
        let Some(mode) = prompt(input, "login or register? [l/r] ").await? else {
            return Ok(None);
        };
        let registering = mode.eq_ignore_ascii_case("r");

        let mut screen = LoginScreen::new();
        screen.registering = registering;
        let Some(email) = prompt(input, "email: ").await? else {
            return Ok(None);
        };
        screen.email = email;
        let Some(password) = prompt(input, "password: ").await? else {
            return Ok(None);
        };
        screen.password = password;
        if registering {
            let Some(confirmation) = prompt(input, "confirm password: ").await? else {
                return Ok(None);
            };
            screen.password_confirmation = confirmation;
        }

        if screen.submit(api, store).await {
            if let Some(session) = store.current() {
                println!("Welcome, {}.", session.user.email);
                return Ok(Some(session));
            }
        }
        if let Some(error) = screen.state.error() {
            println!("! {error}");
        }
    }
}

/// The authenticated command loop. Returns on logout, session expiry, or
/// EOF.
async fn shell(
    api: &ApiClient,
    store: &SessionStore,
    session: &Session,
    input: &mut Lines<BufReader<Stdin>>,
) -> anyhow::Result<()> {
    let auth = &session.headers;
    println!("Type `help` for commands.");

    loop {
        let Some(line) = prompt(input, "> ").await? else {
            return Ok(());
        };
        let (command, rest) = match line.split_once(' ') {
            Some((c, r)) => (c, r.trim()),
            None => (line.as_str(), ""),
        };

        let expired = match command {
            "" => false,
            "help" => {
                print_help();
                false
            }
            "home" => show_home(api, auth, session).await,
            "users" => show_users(api, auth, session).await,
            "channels" => show_channels(api, auth).await,
            "create" => create_channel(api, auth, rest).await,
            "open" => match rest.parse::<i64>() {
                Ok(id) => channel_room(api, auth, session, id, input).await?,
                Err(_) => {
                    println!("! usage: open <channel-id>");
                    false
                }
            },
            "dm" => direct_message(api, auth, session, rest, input).await?,
            "logout" => {
                let nav = NavigationScreen::new();
                nav.logout(store);
                return Ok(());
            }
            "quit" | "exit" => return Ok(()),
            other => {
                println!("! unknown command `{other}`; try `help`");
                false
            }
        };

        if expired {
            println!("! Your session has expired. Please sign in again.");
            store.clear();
            return Ok(());
        }
    }
}

fn print_help() {
    println!("  home            dashboard: users and recent messages");
    println!("  users           the user directory");
    println!("  channels        list channels");
    println!("  create <name>   create a channel");
    println!("  open <id>       enter a channel room");
    println!("  dm <email>      open a direct conversation");
    println!("  logout          sign out");
    println!("  quit            exit");
}

fn report(state: &aviontalk_app::screen::ScreenState) -> bool {
    if let Some(notice) = state.notice() {
        println!("* {}", notice.text);
    }
    if let Some(error) = state.error() {
        println!("! {error}");
    }
    state.session_expired()
}

fn print_message(message: &Message, session: &Session) {
    let marker = if is_mine(message, &session.user) { "you" } else { sender_email(message) };
    println!(
        "  [{}] {}: {}",
        message.created_at.format("%H:%M"),
        marker,
        message.body
    );
}

async fn show_home(api: &ApiClient, auth: &AuthHeaders, session: &Session) -> bool {
    let mut home = HomeScreen::new();
    home.load(api, auth).await;
    if home.state.phase() == Phase::Ready {
        println!("{} users, recent activity:", home.users.len());
        for message in &home.recent {
            print_message(message, session);
        }
    }
    report(&home.state)
}

async fn show_users(api: &ApiClient, auth: &AuthHeaders, session: &Session) -> bool {
    let mut nav = NavigationScreen::new();
    nav.load(api, auth).await;
    if nav.state.phase() == Phase::Ready {
        for user in nav.dm_peers(&session.user) {
            println!("  {}", user.email);
        }
    }
    report(&nav.state)
}

async fn show_channels(api: &ApiClient, auth: &AuthHeaders) -> bool {
    let mut list = ChannelListScreen::new();
    list.load(api, auth).await;
    if list.state.phase() == Phase::Ready {
        for channel in &list.channels {
            println!("  {:>4}  #{}", channel.id, channel.name);
        }
    }
    report(&list.state)
}

async fn create_channel(api: &ApiClient, auth: &AuthHeaders, name: &str) -> bool {
    let mut list = ChannelListScreen::new();
    list.load(api, auth).await;
    if list.state.phase() != Phase::Ready {
        return report(&list.state);
    }
    list.draft_name = name.to_string();
    list.create_channel(api, auth).await;
    report(&list.state)
}

/// Sub-loop for one channel room: send, add member, refresh, back.
async fn channel_room(
    api: &ApiClient,
    auth: &AuthHeaders,
    session: &Session,
    channel_id: i64,
    input: &mut Lines<BufReader<Stdin>>,
) -> anyhow::Result<bool> {
    let mut room = ChannelRoomScreen::new(channel_id);
    room.load(api, auth).await;
    if room.state.phase() != Phase::Ready {
        return Ok(report(&room.state));
    }

    loop {
        let name = room.channel.as_ref().map(|c| c.name.as_str()).unwrap_or("?");
        println!("#{name} — {} members, {} messages", room.members.len(), room.log.len());
        for message in room.log.messages() {
            print_message(message, session);
        }
        if report(&room.state) {
            return Ok(true);
        }

        let Some(line) = prompt(input, "#> send <text> | add <email> | refresh | back: ").await?
        else {
            return Ok(false);
        };
        let (command, rest) = match line.split_once(' ') {
            Some((c, r)) => (c, r.trim()),
            None => (line.as_str(), ""),
        };
        match command {
            "send" => {
                room.draft = rest.to_string();
                room.send_message(api, auth, &session.user).await;
            }
            "add" => {
                room.member_email = rest.to_string();
                room.add_member(api, auth).await;
            }
            "refresh" => room.refresh(api, auth).await,
            "back" | "" => return Ok(false),
            other => println!("! unknown command `{other}`"),
        }
        room.state.tick(Utc::now());
    }
}

/// Sub-loop for one direct conversation.
async fn direct_message(
    api: &ApiClient,
    auth: &AuthHeaders,
    session: &Session,
    email: &str,
    input: &mut Lines<BufReader<Stdin>>,
) -> anyhow::Result<bool> {
    let mut nav = NavigationScreen::new();
    nav.load(api, auth).await;
    if nav.state.phase() != Phase::Ready {
        return Ok(report(&nav.state));
    }
    let Some(peer) = nav
        .dm_peers(&session.user)
        .find(|u| u.email.eq_ignore_ascii_case(email))
        .cloned()
    else {
        println!("! no user with email `{email}`");
        return Ok(false);
    };

    let mut dm = DirectMessageScreen::new(peer);
    dm.load(api, auth).await;
    if dm.state.phase() != Phase::Ready {
        return Ok(report(&dm.state));
    }

    loop {
        println!("@{} — {} messages", dm.peer.email, dm.log.len());
        for message in dm.log.messages() {
            print_message(message, session);
        }
        if report(&dm.state) {
            return Ok(true);
        }

        let Some(line) = prompt(input, "@> send <text> | refresh | back: ").await? else {
            return Ok(false);
        };
        let (command, rest) = match line.split_once(' ') {
            Some((c, r)) => (c, r.trim()),
            None => (line.as_str(), ""),
        };
        match command {
            "send" => {
                dm.draft = rest.to_string();
                dm.send(api, auth, &session.user).await;
            }
            "refresh" => dm.refresh(api, auth).await,
            "back" | "" => return Ok(false),
            other => println!("! unknown command `{other}`"),
        }
        dm.state.tick(Utc::now());
    }
}
