pub mod conversation;
pub mod screen;
pub mod screens;

pub use conversation::{MessageLog, UNKNOWN_SENDER, is_mine, sender_email};
pub use screen::{Notice, Phase, ScreenState};
