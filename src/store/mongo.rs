//! MongoDB pin store.
//!
//! One document per chat in the `chat_pins` collection:
//!
//! ```text
//! { chat_id, pins: [PinRecord, ...], editable_id, awaiting_resend }
//! ```
//!
//! List edits are expressed as update operators so a single chat document is
//! never rewritten as a whole.

use async_trait::async_trait;
use mongodb::bson::{Document, doc, to_bson};
use mongodb::options::{ClientOptions, IndexOptions, UpdateOptions};
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{PinStore, Result, StoreError, nearest_index};
use crate::pins::PinRecord;

const COLLECTION: &str = "chat_pins";

/// Stored shape of one chat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPinsDoc {
    pub chat_id: i64,

    #[serde(default)]
    pub pins: Vec<PinRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable_id: Option<i32>,

    #[serde(default)]
    pub awaiting_resend: bool,
}

/// Pin store backed by MongoDB.
#[derive(Debug, Clone)]
pub struct MongoPinStore {
    collection: Collection<ChatPinsDoc>,
}

impl MongoPinStore {
    /// Connect, verify the server answers and make sure the `chat_id` index exists.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self> {
        let options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(options)?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        info!("Successfully connected to MongoDB");

        let store = Self {
            collection: client.database(db_name).collection(COLLECTION),
        };
        store.ensure_indexes().await?;

        Ok(store)
    }

    async fn ensure_indexes(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "chat_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.collection.create_index(index).await?;
        debug!("Ensured unique chat_id index on {}", COLLECTION);

        Ok(())
    }

    async fn load(&self, chat_id: i64) -> Result<Option<ChatPinsDoc>> {
        Ok(self.collection.find_one(chat_filter(chat_id)).await?)
    }

    /// Apply `update` to the chat document, creating it when missing.
    async fn upsert(&self, chat_id: i64, update: Document) -> Result<()> {
        let options = UpdateOptions::builder().upsert(true).build();

        self.collection
            .update_one(chat_filter(chat_id), update)
            .with_options(options)
            .await?;

        Ok(())
    }
}

fn chat_filter(chat_id: i64) -> Document {
    doc! { "chat_id": chat_id }
}

fn push_front_update(record: &PinRecord) -> Result<Document> {
    Ok(doc! {
        "$push": { "pins": { "$each": [to_bson(record)?], "$position": 0 } }
    })
}

fn keep_first_update(count: i32) -> Document {
    doc! {
        "$push": { "pins": { "$each": [], "$slice": count } }
    }
}

/// Null out the element at `index`, then pull every null.
fn remove_at_updates(index: usize) -> (Document, Document) {
    let mut unset = Document::new();
    unset.insert(format!("pins.{}", index), "");

    (
        doc! { "$unset": unset },
        doc! { "$pull": { "pins": null } },
    )
}

fn replace_update(record: &PinRecord) -> Result<Document> {
    Ok(doc! { "$set": { "pins.$": to_bson(record)? } })
}

#[async_trait]
impl PinStore for MongoPinStore {
    async fn has_pins(&self, chat_id: i64) -> Result<bool> {
        let filter = doc! { "chat_id": chat_id, "pins.0": { "$exists": true } };
        Ok(self.collection.find_one(filter).await?.is_some())
    }

    async fn get_pins(&self, chat_id: i64) -> Result<Vec<PinRecord>> {
        self.load(chat_id)
            .await?
            .map(|chat| chat.pins)
            .filter(|pins| !pins.is_empty())
            .ok_or(StoreError::NoPins(chat_id))
    }

    async fn add_pin(&self, chat_id: i64, record: PinRecord) -> Result<()> {
        self.upsert(chat_id, push_front_update(&record)?).await
    }

    async fn clear_all(&self, chat_id: i64) -> Result<()> {
        self.upsert(chat_id, doc! { "$set": { "pins": [] } }).await
    }

    async fn clear_keep_last(&self, chat_id: i64) -> Result<()> {
        self.upsert(chat_id, keep_first_update(1)).await
    }

    async fn remove_pin(&self, chat_id: i64, id: i32, hint: usize) -> Result<()> {
        let Some(chat) = self.load(chat_id).await? else {
            return Ok(());
        };
        let Some(index) = nearest_index(&chat.pins, id, hint) else {
            debug!("Pin {} not found in chat {}", id, chat_id);
            return Ok(());
        };

        let (mark, compact) = remove_at_updates(index);
        self.upsert(chat_id, mark).await?;
        self.upsert(chat_id, compact).await
    }

    async fn replace_same_id(&self, chat_id: i64, record: PinRecord) -> Result<bool> {
        let filter = doc! { "chat_id": chat_id, "pins.id": record.id };
        let result = self
            .collection
            .update_one(filter, replace_update(&record)?)
            .await?;

        Ok(result.matched_count > 0)
    }

    async fn editable_id(&self, chat_id: i64) -> Result<Option<i32>> {
        Ok(self.load(chat_id).await?.and_then(|chat| chat.editable_id))
    }

    async fn set_editable_id(&self, chat_id: i64, id: i32) -> Result<()> {
        self.upsert(
            chat_id,
            doc! { "$set": { "editable_id": id, "awaiting_resend": false } },
        )
        .await
    }

    async fn clear_editable_id(&self, chat_id: i64) -> Result<()> {
        self.upsert(chat_id, doc! { "$unset": { "editable_id": "" } })
            .await
    }

    async fn mark_human_message(&self, chat_id: i64) -> Result<()> {
        // Chats the bot never posted in stay untouched
        self.collection
            .update_one(
                chat_filter(chat_id),
                doc! { "$set": { "awaiting_resend": true } },
            )
            .await?;
        Ok(())
    }

    async fn needs_resend(&self, chat_id: i64) -> Result<bool> {
        Ok(self
            .load(chat_id)
            .await?
            .is_some_and(|chat| chat.awaiting_resend))
    }
}
