//! Pin storage.
//!
//! Every chat owns an ordered list of pin records, most recent first, plus
//! two flags: the id of the bot's summary message and whether a human wrote
//! in the chat since that summary was posted.
//!
//! Two backends implement [`PinStore`]:
//!
//! - [`MemoryPinStore`] keeps everything in process memory.
//! - [`MongoPinStore`] keeps one MongoDB document per chat.

mod memory;
mod mongo;

use async_trait::async_trait;
use thiserror::Error;

use crate::pins::PinRecord;

pub use memory::MemoryPinStore;
pub use mongo::MongoPinStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("chat {0} has no pins")]
    NoPins(i64),

    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] mongodb::bson::ser::Error),

    #[error("deserialization error: {0}")]
    Deserialization(#[from] mongodb::bson::de::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Everything stored for one chat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatPinState {
    pub pins: Vec<PinRecord>,
    pub editable_id: Option<i32>,
    pub awaiting_resend: bool,
}

#[async_trait]
pub trait PinStore: Send + Sync {
    async fn has_pins(&self, chat_id: i64) -> Result<bool>;

    /// All pins of a chat, most recent first.
    ///
    /// Fails with [`StoreError::NoPins`] when the chat has none.
    async fn get_pins(&self, chat_id: i64) -> Result<Vec<PinRecord>>;

    /// Put `record` in front of the list.
    async fn add_pin(&self, chat_id: i64, record: PinRecord) -> Result<()>;

    /// Drop every pin. The summary id and flags stay.
    async fn clear_all(&self, chat_id: i64) -> Result<()>;

    /// Drop every pin except the most recent one.
    async fn clear_keep_last(&self, chat_id: i64) -> Result<()>;

    /// Remove one record with the given id.
    ///
    /// When the id occurs several times, the occurrence nearest `hint` goes;
    /// ties go to the lower index. Unknown ids are ignored.
    async fn remove_pin(&self, chat_id: i64, id: i32, hint: usize) -> Result<()>;

    /// Overwrite the first record with the id of `record`.
    ///
    /// Returns whether a record was replaced.
    async fn replace_same_id(&self, chat_id: i64, record: PinRecord) -> Result<bool>;

    /// Id of the current summary message, if one exists.
    async fn editable_id(&self, chat_id: i64) -> Result<Option<i32>>;

    /// Record a freshly sent summary. Clears the resend flag.
    async fn set_editable_id(&self, chat_id: i64, id: i32) -> Result<()>;

    async fn clear_editable_id(&self, chat_id: i64) -> Result<()>;

    async fn has_editable_id(&self, chat_id: i64) -> Result<bool> {
        Ok(self.editable_id(chat_id).await?.is_some())
    }

    /// Note that a human wrote in the chat after the summary.
    async fn mark_human_message(&self, chat_id: i64) -> Result<()>;

    /// Whether the next publish must send a new summary instead of editing.
    async fn needs_resend(&self, chat_id: i64) -> Result<bool>;
}

/// Index of the `id` occurrence nearest `hint`, lower index on ties.
pub(crate) fn nearest_index(pins: &[PinRecord], id: i32, hint: usize) -> Option<usize> {
    pins.iter()
        .enumerate()
        .filter(|(_, pin)| pin.id == id)
        .map(|(index, _)| index)
        .min_by_key(|&index| (index.abs_diff(hint), index))
}


#[cfg(test)]
mod tests {
    use super::testing::record;
    use super::*;

    #[test]
    fn test_nearest_index() {
        let pins: Vec<_> = [1, 2, 1, 3, 1].into_iter().map(record).collect();

        assert_eq!(nearest_index(&pins, 1, 0), Some(0));
        assert_eq!(nearest_index(&pins, 1, 3), Some(2));
        assert_eq!(nearest_index(&pins, 1, 4), Some(4));
        assert_eq!(nearest_index(&pins, 1, 100), Some(4));
        assert_eq!(nearest_index(&pins, 3, 0), Some(3));
        assert_eq!(nearest_index(&pins, 9, 0), None);
    }

    #[test]
    fn test_nearest_index_tie_goes_low() {
        let pins: Vec<_> = [1, 2, 1].into_iter().map(record).collect();
        assert_eq!(nearest_index(&pins, 1, 1), Some(0));
    }
}
