//! In-process pin store.

use async_trait::async_trait;
use dashmap::DashMap;

use super::{ChatPinState, PinStore, Result, StoreError, nearest_index};
use crate::pins::PinRecord;

/// Pin store backed by a [`DashMap`]. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryPinStore {
    chats: DashMap<i64, ChatPinState>,
}

impl MemoryPinStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `f` to the state of an existing chat. Unknown chats are left alone.
    fn update_existing(&self, chat_id: i64, f: impl FnOnce(&mut ChatPinState)) {
        if let Some(mut state) = self.chats.get_mut(&chat_id) {
            f(&mut state);
        }
    }
}

#[async_trait]
impl PinStore for MemoryPinStore {
    async fn has_pins(&self, chat_id: i64) -> Result<bool> {
        Ok(self
            .chats
            .get(&chat_id)
            .is_some_and(|state| !state.pins.is_empty()))
    }

    async fn get_pins(&self, chat_id: i64) -> Result<Vec<PinRecord>> {
        self.chats
            .get(&chat_id)
            .map(|state| state.pins.clone())
            .filter(|pins| !pins.is_empty())
            .ok_or(StoreError::NoPins(chat_id))
    }

    async fn add_pin(&self, chat_id: i64, record: PinRecord) -> Result<()> {
        self.chats.entry(chat_id).or_default().pins.insert(0, record);
        Ok(())
    }

    async fn clear_all(&self, chat_id: i64) -> Result<()> {
        self.update_existing(chat_id, |state| state.pins.clear());
        Ok(())
    }

    async fn clear_keep_last(&self, chat_id: i64) -> Result<()> {
        self.update_existing(chat_id, |state| state.pins.truncate(1));
        Ok(())
    }

    async fn remove_pin(&self, chat_id: i64, id: i32, hint: usize) -> Result<()> {
        self.update_existing(chat_id, |state| {
            if let Some(index) = nearest_index(&state.pins, id, hint) {
                state.pins.remove(index);
            }
        });
        Ok(())
    }

    async fn replace_same_id(&self, chat_id: i64, record: PinRecord) -> Result<bool> {
        let Some(mut state) = self.chats.get_mut(&chat_id) else {
            return Ok(false);
        };

        match state.pins.iter_mut().find(|pin| pin.id == record.id) {
            Some(slot) => {
                *slot = record;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn editable_id(&self, chat_id: i64) -> Result<Option<i32>> {
        Ok(self.chats.get(&chat_id).and_then(|state| state.editable_id))
    }

    async fn set_editable_id(&self, chat_id: i64, id: i32) -> Result<()> {
        let mut state = self.chats.entry(chat_id).or_default();
        state.editable_id = Some(id);
        state.awaiting_resend = false;
        Ok(())
    }

    async fn clear_editable_id(&self, chat_id: i64) -> Result<()> {
        self.update_existing(chat_id, |state| state.editable_id = None);
        Ok(())
    }

    async fn mark_human_message(&self, chat_id: i64) -> Result<()> {
        self.update_existing(chat_id, |state| state.awaiting_resend = true);
        Ok(())
    }

    async fn needs_resend(&self, chat_id: i64) -> Result<bool> {
        Ok(self
            .chats
            .get(&chat_id)
            .is_some_and(|state| state.awaiting_resend))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::{ids, record};

    const CHAT: i64 = -100123;

    async fn store_with(pins: &[i32]) -> MemoryPinStore {
        let store = MemoryPinStore::new();
        // Added oldest first, so the list reads back in the given order
        for &id in pins.iter().rev() {
            store.add_pin(CHAT, record(id)).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_add_prepends() {
        let store = MemoryPinStore::new();
        assert!(!store.has_pins(CHAT).await.unwrap());

        for id in 1..=3 {
            store.add_pin(CHAT, record(id)).await.unwrap();
        }

        assert!(store.has_pins(CHAT).await.unwrap());
        assert_eq!(ids(&store.get_pins(CHAT).await.unwrap()), vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_get_pins_without_pins() {
        let store = MemoryPinStore::new();
        assert!(matches!(
            store.get_pins(CHAT).await,
            Err(StoreError::NoPins(CHAT))
        ));

        // A chat that only has flags still has no pins
        store.set_editable_id(CHAT, 10).await.unwrap();
        assert!(matches!(store.get_pins(CHAT).await, Err(StoreError::NoPins(_))));
    }

    #[tokio::test]
    async fn test_clear_keep_last() {
        let store = store_with(&[5, 4, 3, 2, 1]).await;

        store.clear_keep_last(CHAT).await.unwrap();

        assert_eq!(ids(&store.get_pins(CHAT).await.unwrap()), vec![5]);
    }

    #[tokio::test]
    async fn test_clear_all_keeps_flags() {
        let store = store_with(&[2, 1]).await;
        store.set_editable_id(CHAT, 99).await.unwrap();

        store.clear_all(CHAT).await.unwrap();

        assert!(!store.has_pins(CHAT).await.unwrap());
        assert_eq!(store.editable_id(CHAT).await.unwrap(), Some(99));
    }

    #[tokio::test]
    async fn test_remove_pin_nearest_hint() {
        let store = store_with(&[7, 1, 7, 2, 7]).await;

        store.remove_pin(CHAT, 7, 3).await.unwrap();
        assert_eq!(ids(&store.get_pins(CHAT).await.unwrap()), vec![7, 1, 2, 7]);

        store.remove_pin(CHAT, 7, 0).await.unwrap();
        assert_eq!(ids(&store.get_pins(CHAT).await.unwrap()), vec![1, 2, 7]);
    }

    #[tokio::test]
    async fn test_remove_unknown_pin_is_noop() {
        let store = store_with(&[3, 2, 1]).await;

        store.remove_pin(CHAT, 42, 0).await.unwrap();
        store.remove_pin(-1, 42, 0).await.unwrap();

        assert_eq!(store.get_pins(CHAT).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_replace_same_id() {
        let store = store_with(&[2, 1, 2]).await;

        let mut edited = record(2);
        edited.preview = "edited".to_string();
        assert!(store.replace_same_id(CHAT, edited).await.unwrap());

        let pins = store.get_pins(CHAT).await.unwrap();
        assert_eq!(pins[0].preview, "edited");
        assert_eq!(pins[2].preview, "pin 2");

        assert!(!store.replace_same_id(CHAT, record(9)).await.unwrap());
        assert!(!store.replace_same_id(-1, record(2)).await.unwrap());
    }

    #[tokio::test]
    async fn test_editable_id_and_resend() {
        let store = MemoryPinStore::new();
        assert_eq!(store.editable_id(CHAT).await.unwrap(), None);
        assert!(!store.has_editable_id(CHAT).await.unwrap());

        // No state yet, nothing to flag
        store.mark_human_message(CHAT).await.unwrap();
        assert!(!store.needs_resend(CHAT).await.unwrap());

        store.set_editable_id(CHAT, 10).await.unwrap();
        assert!(store.has_editable_id(CHAT).await.unwrap());

        store.mark_human_message(CHAT).await.unwrap();
        assert!(store.needs_resend(CHAT).await.unwrap());

        store.set_editable_id(CHAT, 11).await.unwrap();
        assert_eq!(store.editable_id(CHAT).await.unwrap(), Some(11));
        assert!(!store.needs_resend(CHAT).await.unwrap());

        store.clear_editable_id(CHAT).await.unwrap();
        assert_eq!(store.editable_id(CHAT).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_chats_are_independent() {
        let store = store_with(&[1]).await;
        store.add_pin(7, record(2)).await.unwrap();

        assert_eq!(ids(&store.get_pins(CHAT).await.unwrap()), vec![1]);
        assert_eq!(ids(&store.get_pins(7).await.unwrap()), vec![2]);
    }
}
