//! Pinboard - a Telegram bot that keeps every pinned message of a group in
//! one summary post.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `lock` - Per-chat mutual exclusion
//! - `store` - Pin storage (memory or MongoDB)
//! - `pins` - Pin records, rendering and the per-chat controller
//! - `cache` - TTL caching with Moka
//! - `permissions` - Cached pin rights lookups
//! - `bot` - Dispatcher, Telegram API adapter and runners (with Throttle)
//! - `events` - Update handlers feeding the controller
//! - `plugins` - Command handlers
//! - `utils` - Text helpers

mod bot;
mod cache;
mod config;
mod events;
mod lock;
mod permissions;
mod pins;
mod plugins;
mod store;
mod utils;

use std::sync::Arc;

use teloxide::adaptors::throttle::Limits;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bot::TelegramApi;
use cache::CacheRegistry;
use config::{Config, StoreBackend};
use permissions::Permissions;
use pins::PinController;
use store::{MemoryPinStore, MongoPinStore, PinStore};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pinboard=info,teloxide=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting pinboard bot...");

    let config = Config::from_env()?;
    info!("Configuration loaded successfully");
    info!("Bot mode: {:?}", config.bot_mode);

    let store: Arc<dyn PinStore> = match &config.store {
        StoreBackend::Memory => {
            info!("Using in-memory pin store");
            Arc::new(MemoryPinStore::new())
        }
        StoreBackend::MongoDb { uri, database } => {
            info!("Connecting to MongoDB...");
            Arc::new(MongoPinStore::connect(uri, database).await?)
        }
    };

    let cache = CacheRegistry::new();

    // Throttle keeps us within Telegram's rate limits:
    // - 30 messages per second globally
    // - 1 message per second to the same chat
    // - 20 messages per minute to the same group
    let bot = Bot::new(&config.bot_token).throttle(Limits::default());
    info!("Bot initialized with rate limiting (Throttle)");

    let me = bot.get_me().await?;
    info!("Bot username: @{}", me.username());

    // Permissions only read chat info, no need to throttle them
    let permissions = Permissions::new(bot.inner().clone(), &cache);
    let api = TelegramApi::new(bot.clone(), permissions);
    let controller = Arc::new(PinController::new(store, Arc::new(api)));

    let dispatcher = bot::build_dispatcher(bot.clone(), controller);

    bot::run(&config, bot, dispatcher).await
}
