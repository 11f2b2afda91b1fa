pub mod controller;
pub mod listener;
pub mod mailbox;
pub mod protocol;

pub use controller::ListenerController;
pub use mailbox::{AwardMailbox, AwardNotice, AWARD_DISPLAY_WINDOW};
