//! Conversation plumbing between channels and the placement engine.

pub mod dispatcher;
pub mod input;
pub mod sessions;

pub use dispatcher::{Dispatcher, handle_message};
pub use input::InputParser;
pub use sessions::{SessionManager, SessionSlot};
