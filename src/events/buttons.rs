//! Summary button presses.

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use tracing::warn;

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::pins::{ButtonAction, ButtonOutcome, ButtonPress};

const DENIED_TEXT: &str = "You can't edit pins here";

pub fn handler() -> UpdateHandler<anyhow::Error> {
    dptree::endpoint(on_button)
}

async fn on_button(bot: ThrottledBot, q: CallbackQuery, state: AppState) -> anyhow::Result<()> {
    let Some(press) = button_press(&q) else {
        bot.answer_callback_query(&q.id).await?;
        return Ok(());
    };

    let outcome = state.controller.on_button(press).await;

    // Always answer so the client stops its loading indicator
    let answer = bot.answer_callback_query(&q.id);
    match outcome {
        Ok(ButtonOutcome::Denied) => answer.text(DENIED_TEXT).await?,
        _ => answer.await?,
    };

    outcome.map(|_| ())
}

/// Parse the query into a controller event.
fn button_press(q: &CallbackQuery) -> Option<ButtonPress> {
    let message = q.message.as_ref()?;
    let data = q.data.as_deref()?;

    let action = match data.parse::<ButtonAction>() {
        Ok(action) => action,
        Err(e) => {
            warn!("Ignoring button in chat {}: {}", message.chat().id, e);
            return None;
        }
    };

    Some(ButtonPress {
        chat_id: message.chat().id.0,
        user_id: q.from.id.0,
        action,
    })
}
