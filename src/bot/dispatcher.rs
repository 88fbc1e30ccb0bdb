//! Update dispatcher setup.
//!
//! Routes Telegram updates to the command handlers and the pin events.

use std::sync::Arc;

use teloxide::adaptors::Throttle;
use teloxide::dispatching::{DefaultKey, UpdateHandler};
use teloxide::prelude::*;

use crate::events;
use crate::pins::PinController;
use crate::plugins;

/// Bot type with Throttle adaptor for automatic rate limiting.
pub type ThrottledBot = Throttle<Bot>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<PinController>,
}

/// Build the dispatcher with all handlers.
pub fn build_dispatcher(
    bot: ThrottledBot,
    controller: Arc<PinController>,
) -> Dispatcher<ThrottledBot, anyhow::Error, DefaultKey> {
    let state = AppState { controller };

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
}

/// Build the handler schema.
fn schema() -> UpdateHandler<anyhow::Error> {
    // Commands first, then pin service messages, then everything else
    let message_handler = Update::filter_message()
        .branch(plugins::command_handler())
        .branch(events::pinned::handler())
        .branch(events::activity::handler());

    let edited_handler = Update::filter_edited_message().branch(events::edited::handler());

    let callback_handler = Update::filter_callback_query().branch(events::buttons::handler());

    dptree::entry()
        .branch(message_handler)
        .branch(edited_handler)
        .branch(callback_handler)
}
