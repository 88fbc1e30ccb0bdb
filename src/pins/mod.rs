//! Pin aggregation.
//!
//! Every pinned message of a chat becomes a [`PinRecord`]. The records are
//! rendered into one summary post that the bot keeps pinned and up to date.
//!
//! - `record` - pin records and the message snapshots they come from
//! - `render` - summary text and buttons
//! - `payload` - callback data of the buttons
//! - `api` - outbound platform actions
//! - `controller` - per-chat state machine driving all of the above

mod api;
mod controller;
mod payload;
mod record;
mod render;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{PinApi, PinRights};
pub use controller::{
    ButtonOutcome, ButtonPress, MessageEdited, PinController, PinNotification, UserMessage,
};
pub use payload::ButtonAction;
pub use record::{PinKind, PinRecord, PinSource};
pub use render::{Button, ButtonLayout, Post};
