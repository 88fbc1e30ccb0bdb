//! Summary rendering.
//!
//! Turns the pin list of a chat into the HTML text of the summary post and
//! the inline keyboard under it.

use super::payload::ButtonAction;
use super::record::{LinkSpan, PinKind, PinRecord, PinSource};
use crate::utils::{html_escape, take_chars};

/// Longest preview, in characters of visible text.
pub const MAX_PREVIEW_LEN: usize = 280;

/// Appended where text was cut.
pub const ELLIPSIS: &str = "…";

const HEAD_ICON: &str = "📌";
const EMPTY_TEXT: &str = "No pins";

/// Widest row of per-pin buttons.
const WIDEST_ROW: usize = 5;

/// Which buttons the summary shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonStatus {
    /// Only the "Edit" button.
    #[default]
    Collapsed,
    /// Bulk actions and one unpin button per pin.
    Expanded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: ButtonAction,
}

impl Button {
    fn new(label: impl Into<String>, action: ButtonAction) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// Rows of buttons.
pub type ButtonLayout = Vec<Vec<Button>>;

/// A rendered summary post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub text: String,
    pub layout: ButtonLayout,
}

impl Post {
    /// The post for a chat without pins. No summary should exist for it.
    pub fn empty() -> Self {
        Self {
            text: EMPTY_TEXT.to_string(),
            layout: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }
}

/// Render the summary for `pins`, most recent first.
pub fn render_summary(pins: &[PinRecord], status: ButtonStatus) -> Post {
    if pins.is_empty() {
        return Post::empty();
    }

    let text = pins
        .iter()
        .enumerate()
        .map(|(i, pin)| render_pin(pin, i + 1))
        .collect::<Vec<_>>()
        .join("\n\n");

    Post {
        text,
        layout: build_layout(pins, status),
    }
}

/// Render one pin: a preview line, then a header with link, date and author.
pub fn render_pin(record: &PinRecord, index: usize) -> String {
    let needs_icon =
        record.preview.is_empty() || matches!(record.kind, PinKind::Photo | PinKind::File);

    let preview_line = if needs_icon {
        format!("{} {}", record.icon(), record.preview)
    } else {
        record.preview.clone()
    };

    let header_line = format!(
        "{} <a href=\"{}\">[{}] {}</a><i> – {}, {}</i>",
        HEAD_ICON,
        html_escape(&record.link),
        index,
        record.timestamp.format("%Y-%m-%d"),
        record.sender,
        record.timestamp.format("%a"),
    );

    format!("{}\n{}", preview_line, header_line)
}

fn build_layout(pins: &[PinRecord], status: ButtonStatus) -> ButtonLayout {
    let unpin_all = Button::new("❌ Unpin all", ButtonAction::UnpinAll);

    if pins.len() == 1 {
        return vec![vec![unpin_all]];
    }

    if status == ButtonStatus::Collapsed {
        return vec![vec![Button::new("➕ Edit", ButtonAction::ExpandButtons)]];
    }

    let mut layout = vec![
        vec![Button::new("➖ Close", ButtonAction::CollapseButtons)],
        vec![unpin_all, Button::new("Keep last 🔺", ButtonAction::KeepLast)],
    ];

    let buttons: Vec<Button> = pins
        .iter()
        .enumerate()
        .map(|(index, pin)| {
            Button::new(
                format!("{} {}", index + 1, pin.icon()),
                ButtonAction::UnpinOne { id: pin.id, index },
            )
        })
        .collect();

    let per_row = best_split(buttons.len()).max(1);
    layout.extend(buttons.chunks(per_row).map(<[Button]>::to_vec));

    layout
}

/// Pick how many buttons go on one row.
///
/// Amounts under five fit on one row. Otherwise the width from 5 down to 2
/// that leaves the fullest last row wins; an exact split counts as a full
/// row, and ties go to the wider row.
pub fn best_split(amount: usize) -> usize {
    if amount < WIDEST_ROW {
        return amount;
    }

    let mut best = (0, WIDEST_ROW);
    for width in (2..=WIDEST_ROW).rev() {
        let last_row = match amount % width {
            0 => width,
            rest => rest,
        };
        if last_row > best.0 {
            best = (last_row, width);
        }
    }

    best.1
}

/// Preview text for a message.
///
/// Sources in order: links in the text, links in the caption, the text, the
/// caption, a document name, a sticker emoji.
pub fn preview_for(source: &PinSource) -> String {
    if let Some(text) = source.text.as_deref()
        && !source.text_links.is_empty()
    {
        return build_preview(text, &source.text_links, MAX_PREVIEW_LEN);
    }

    if let Some(caption) = source.caption.as_deref()
        && !source.caption_links.is_empty()
    {
        return build_preview(caption, &source.caption_links, MAX_PREVIEW_LEN);
    }

    if let Some(text) = source.text.as_deref().filter(|t| !t.is_empty()) {
        return capped(text, MAX_PREVIEW_LEN);
    }

    if let Some(caption) = source.caption.as_deref().filter(|c| !c.is_empty()) {
        return capped(caption, MAX_PREVIEW_LEN);
    }

    if let Some(document) = &source.document {
        return format!(
            "<b>{}</b>",
            html_escape(document.file_name.as_deref().unwrap_or_default())
        );
    }

    if let Some(sticker) = &source.sticker {
        return html_escape(sticker.emoji.as_deref().unwrap_or_default());
    }

    String::new()
}

/// Escape `text` and turn the `spans` inside it into anchors, keeping at most
/// `max_len` visible characters.
///
/// Once the budget runs out the remaining plain text is dropped, but every
/// remaining link is still listed on its own line.
pub fn build_preview(text: &str, spans: &[LinkSpan], max_len: usize) -> String {
    if spans.is_empty() {
        return capped(text, max_len);
    }

    let mut spans: Vec<&LinkSpan> = spans.iter().collect();
    spans.sort_by_key(|span| span.offset);

    let mut out = String::new();
    let mut used = 0;
    let mut cursor = 0;
    let mut elided = false;

    for span in spans {
        if span.offset < cursor {
            continue;
        }
        let Some(body) = text.get(span.offset..span.end()) else {
            continue;
        };

        if !elided {
            let plain = text.get(cursor..span.offset).unwrap_or_default();
            let plain_len = plain.chars().count();

            if used + plain_len <= max_len {
                out.push_str(&html_escape(plain));
                used += plain_len;
            } else {
                let room = max_len.saturating_sub(used);
                out.push_str(&html_escape(take_chars(plain, room)));
                out.push_str(ELLIPSIS);
                used = max_len;
                elided = true;
            }
        }

        if elided {
            out.push('\n');
        }
        out.push_str(&anchor(span, body));
        used += body.chars().count();
        cursor = span.end();
    }

    if !elided {
        let tail = text.get(cursor..).unwrap_or_default();
        out.push_str(&capped(tail, max_len.saturating_sub(used)));
    }

    out
}

fn anchor(span: &LinkSpan, body: &str) -> String {
    let href = span.url.as_deref().unwrap_or(body);
    format!("<a href=\"{}\">{}</a>", html_escape(href), html_escape(body))
}

/// Escape `text`, cut to `max_len` characters with an ellipsis.
fn capped(text: &str, max_len: usize) -> String {
    let head = take_chars(text, max_len);
    if head.len() == text.len() {
        html_escape(text)
    } else {
        format!("{}{}", html_escape(head), ELLIPSIS)
    }
}
