pub mod channel_list;
pub mod channel_room;
pub mod direct_message;
pub mod home;
pub mod login;
pub mod navigation;

pub use channel_list::ChannelListScreen;
pub use channel_room::{AddedMember, ChannelRoomScreen};
pub use direct_message::DirectMessageScreen;
pub use home::HomeScreen;
pub use login::LoginScreen;
pub use navigation::NavigationScreen;
