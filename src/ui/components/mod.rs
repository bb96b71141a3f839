mod controls;
mod message_list;

pub use controls::ControlBar;
pub use message_list::MessageList;
