pub mod machine;
pub mod state;
pub mod view;

pub use machine::{FrameOutcome, SessionEvent, SessionMachine};
pub use state::{SessionPhase, SessionState};
pub use view::{ItemLine, ViewModel, ITEM_DISPLAY_WINDOW};
