//! Playback and section controller for the reader client.
//!
//! `Controller::reduce` is a pure state machine over [`Message`]s; anything
//! asynchronous is handed back as an [`Effect`] for the runtime to execute.

mod messages;
mod state;
mod update;
mod view;

pub use messages::Message;
pub use state::{Controller, MAX_SPEED, MIN_SPEED, Phase};
pub use update::{Effect, output_name};
pub use view::format_time;
