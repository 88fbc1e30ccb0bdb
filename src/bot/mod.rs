//! Bot module - Telegram plumbing around the pin controller.

mod api;
pub mod dispatcher;
mod runtime;
mod webhook;

pub use api::TelegramApi;
pub use dispatcher::build_dispatcher;
pub use runtime::run;
