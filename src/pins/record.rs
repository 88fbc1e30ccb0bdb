//! Pin records and the message snapshots they are built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use teloxide::types::{Message, MessageEntityKind, MessageEntityRef};

use super::render::preview_for;
use crate::utils::html_escape;

/// What kind of content a pinned message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinKind {
    Default,
    Text,
    Photo,
    File,
    Sticker,
    Link,
}

/// Classifiers in priority order. The first one that matches wins.
const CLASSIFIERS: &[(PinKind, fn(&PinSource) -> bool)] = &[
    (PinKind::Photo, has_photo),
    (PinKind::File, has_document),
    (PinKind::Sticker, has_sticker),
    (PinKind::Link, has_links),
    (PinKind::Text, has_text),
];

fn has_photo(source: &PinSource) -> bool {
    source.has_photo
}

fn has_document(source: &PinSource) -> bool {
    source.document.is_some()
}

fn has_sticker(source: &PinSource) -> bool {
    source.sticker.is_some()
}

fn has_links(source: &PinSource) -> bool {
    !source.text_links.is_empty() || !source.caption_links.is_empty()
}

fn has_text(source: &PinSource) -> bool {
    source.text.as_deref().is_some_and(|t| !t.is_empty())
}

impl PinKind {
    /// Classify a message by its content.
    pub fn classify(source: &PinSource) -> Self {
        CLASSIFIERS
            .iter()
            .find(|(_, matches)| matches(source))
            .map(|(kind, _)| *kind)
            .unwrap_or(PinKind::Default)
    }

    /// Glyph shown next to pins of this kind.
    pub fn icon(self) -> &'static str {
        match self {
            PinKind::Text => "📝",
            PinKind::Photo => "🖼",
            PinKind::File => "📎",
            PinKind::Sticker => "😀",
            PinKind::Link => "🔗",
            PinKind::Default => "📍",
        }
    }
}

/// A hyperlink inside a message text.
///
/// `offset` and `length` are byte positions in the UTF-8 text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpan {
    pub offset: usize,
    pub length: usize,
    /// Target of a `text_link`. Plain `url` entities link to their own text.
    pub url: Option<String>,
}

impl LinkSpan {
    pub fn new(offset: usize, length: usize) -> Self {
        Self {
            offset,
            length,
            url: None,
        }
    }

    pub fn with_url(offset: usize, length: usize, url: impl Into<String>) -> Self {
        Self {
            offset,
            length,
            url: Some(url.into()),
        }
    }

    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentInfo {
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StickerInfo {
    pub emoji: Option<String>,
}

/// The parts of a Telegram message a pin record is built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinSource {
    pub id: i32,
    pub chat_id: i64,
    pub date: DateTime<Utc>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub text: Option<String>,
    pub text_links: Vec<LinkSpan>,
    pub caption: Option<String>,
    pub caption_links: Vec<LinkSpan>,
    pub has_photo: bool,
    pub document: Option<DocumentInfo>,
    pub sticker: Option<StickerInfo>,
}

impl From<&Message> for PinSource {
    fn from(msg: &Message) -> Self {
        let (first_name, last_name) = match (msg.from.as_ref(), msg.sender_chat.as_ref()) {
            (_, Some(chat)) => (chat.title().unwrap_or("Anonymous").to_string(), None),
            (Some(user), None) => (user.first_name.clone(), user.last_name.clone()),
            (None, None) => ("Unknown".to_string(), None),
        };

        Self {
            id: msg.id.0,
            chat_id: msg.chat.id.0,
            date: msg.date,
            first_name,
            last_name,
            text: msg.text().map(str::to_owned),
            text_links: link_spans(msg.parse_entities()),
            caption: msg.caption().map(str::to_owned),
            caption_links: link_spans(msg.parse_caption_entities()),
            has_photo: msg.photo().is_some_and(|sizes| !sizes.is_empty()),
            document: msg.document().map(|doc| DocumentInfo {
                file_name: doc.file_name.clone(),
            }),
            sticker: msg.sticker().map(|sticker| StickerInfo {
                emoji: sticker.emoji.clone(),
            }),
        }
    }
}

/// Keep only `url` and `text_link` entities.
fn link_spans(entities: Option<Vec<MessageEntityRef<'_>>>) -> Vec<LinkSpan> {
    entities
        .unwrap_or_default()
        .iter()
        .filter_map(|entity| match entity.kind() {
            MessageEntityKind::Url => Some(LinkSpan::new(
                entity.start(),
                entity.end() - entity.start(),
            )),
            MessageEntityKind::TextLink { url } => Some(LinkSpan::with_url(
                entity.start(),
                entity.end() - entity.start(),
                url.as_str(),
            )),
            _ => None,
        })
        .collect()
}

/// One pinned message as shown in the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinRecord {
    /// Telegram message ID of the pinned message.
    pub id: i32,
    pub kind: PinKind,
    /// Escaped HTML excerpt.
    pub preview: String,
    /// Escaped display name of the author.
    pub sender: String,
    /// Deep link to the original message.
    pub link: String,
    pub timestamp: DateTime<Utc>,
}

impl PinRecord {
    pub fn from_source(source: &PinSource) -> Self {
        let sender = match source.last_name.as_deref().filter(|l| !l.is_empty()) {
            Some(last) => format!("{} {}", source.first_name, last),
            None => source.first_name.clone(),
        };

        Self {
            id: source.id,
            kind: PinKind::classify(source),
            preview: preview_for(source),
            sender: html_escape(&sender),
            link: message_link(source.chat_id, source.id),
            timestamp: source.date,
        }
    }

    pub fn icon(&self) -> &'static str {
        self.kind.icon()
    }
}

/// Build a `t.me/c/` link to a message.
///
/// Bot API chat IDs are negative for groups and carry a `-100` prefix for
/// supergroups and channels; the link wants the bare positive ID.
pub fn message_link(chat_id: i64, message_id: i32) -> String {
    let digits = chat_id.unsigned_abs().to_string();
    let chat = if chat_id < 0 {
        digits
            .strip_prefix("100")
            .filter(|rest| !rest.is_empty())
            .unwrap_or(&digits)
    } else {
        &digits
    };

    format!("https://t.me/c/{}/{}", chat, message_id)
}
