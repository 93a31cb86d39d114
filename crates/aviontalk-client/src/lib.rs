pub mod error;
pub mod gateway;
pub mod session;

pub use error::{Error, GENERIC_FAILURE, Result};
pub use gateway::{ApiClient, ConversationTarget};
pub use session::{AuthHeaders, Session, SessionStore};
