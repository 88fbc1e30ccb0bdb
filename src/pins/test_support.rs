//! Test doubles for the pin controller.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::time::Duration;

use anyhow::bail;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;

use super::api::{PinApi, PinRights};
use super::record::PinSource;
use super::render::Post;

/// One outbound call seen by [`RecordingApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Send { chat_id: i64, message_id: i32 },
    Edit { chat_id: i64, message_id: i32 },
    Delete { chat_id: i64, message_id: i32 },
    Pin { chat_id: i64, message_id: i32 },
    Unpin { chat_id: i64, message_id: i32 },
}

/// A [`PinApi`] that records every call instead of talking to Telegram.
pub struct RecordingApi {
    calls: Mutex<Vec<ApiCall>>,
    last_post: Mutex<Option<Post>>,
    rights: Mutex<PinRights>,
    next_id: AtomicI32,
    delay: Option<Duration>,
    fail_edits: AtomicBool,
    fail_deletes: AtomicBool,
    fail_unpins: AtomicBool,
}

impl RecordingApi {
    /// Summary messages get ids from 1000 upwards.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            last_post: Mutex::new(None),
            rights: Mutex::new(PinRights {
                is_creator: true,
                ..Default::default()
            }),
            next_id: AtomicI32::new(1000),
            delay: None,
            fail_edits: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            fail_unpins: AtomicBool::new(false),
        }
    }

    /// Sleep this long inside every call, rights lookups included.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_rights(&self, rights: PinRights) {
        *self.rights.lock() = rights;
    }

    pub fn fail_edits(&self, fail: bool) {
        self.fail_edits.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_unpins(&self, fail: bool) {
        self.fail_unpins.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn sent(&self) -> usize {
        self.count(|call| matches!(call, ApiCall::Send { .. }))
    }

    pub fn edited(&self) -> usize {
        self.count(|call| matches!(call, ApiCall::Edit { .. }))
    }

    pub fn deleted(&self) -> usize {
        self.count(|call| matches!(call, ApiCall::Delete { .. }))
    }

    pub fn pinned(&self) -> usize {
        self.count(|call| matches!(call, ApiCall::Pin { .. }))
    }

    pub fn unpinned(&self) -> usize {
        self.count(|call| matches!(call, ApiCall::Unpin { .. }))
    }

    /// The post of the latest successful send or edit.
    pub fn last_post(&self) -> Option<Post> {
        self.last_post.lock().clone()
    }

    fn count(&self, pred: impl Fn(&ApiCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| pred(call)).count()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    async fn record(&self, call: ApiCall) {
        self.pause().await;
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl PinApi for RecordingApi {
    async fn send_post(&self, chat_id: i64, post: &Post) -> anyhow::Result<i32> {
        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.record(ApiCall::Send { chat_id, message_id }).await;
        *self.last_post.lock() = Some(post.clone());
        Ok(message_id)
    }

    async fn edit_post(&self, chat_id: i64, message_id: i32, post: &Post) -> anyhow::Result<()> {
        self.record(ApiCall::Edit { chat_id, message_id }).await;
        if self.fail_edits.load(Ordering::SeqCst) {
            bail!("message to edit not found");
        }
        *self.last_post.lock() = Some(post.clone());
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i32) -> anyhow::Result<()> {
        self.record(ApiCall::Delete { chat_id, message_id }).await;
        if self.fail_deletes.load(Ordering::SeqCst) {
            bail!("message can't be deleted");
        }
        Ok(())
    }

    async fn pin_silently(&self, chat_id: i64, message_id: i32) -> anyhow::Result<()> {
        self.record(ApiCall::Pin { chat_id, message_id }).await;
        Ok(())
    }

    async fn unpin_message(&self, chat_id: i64, message_id: i32) -> anyhow::Result<()> {
        self.record(ApiCall::Unpin { chat_id, message_id }).await;
        if self.fail_unpins.load(Ordering::SeqCst) {
            bail!("message is not pinned");
        }
        Ok(())
    }

    async fn pin_rights(&self, _chat_id: i64, _user_id: u64) -> anyhow::Result<PinRights> {
        self.pause().await;
        Ok(*self.rights.lock())
    }
}

/// A plain text message with id `id`.
pub fn text_message(chat_id: i64, id: i32, text: &str) -> PinSource {
    PinSource {
        id,
        chat_id,
        date: Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap(),
        first_name: "Grace".to_string(),
        last_name: Some("Hopper".to_string()),
        text: Some(text.to_string()),
        ..Default::default()
    }
}
