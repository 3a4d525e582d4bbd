// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion of backend message events into display records.
//!
//! Text is taken from the first content variant that carries any, probed in
//! the fixed order of [`EXTRACTORS`]. Supporting a new variant means adding
//! one function to that list.
//!
//! Two behaviours are worth knowing about:
//! - events without a timestamp are stamped with the factory's clock, so a
//!   record built from such an event depends on when it was built;
//! - the fallback dedup key (timestamp, sender, self flag, text) cannot tell
//!   apart two distinct messages that agree on all four.

use chrono::{DateTime, Local, SecondsFormat, Utc};
use wabridge_core::events::MessageContent;
use wabridge_core::{MessageEvent, MessageRecord};

/// Sender label for messages sent from this account.
pub const SELF_LABEL: &str = "You";

/// Sender label when the event names nobody.
pub const UNKNOWN_SENDER_LABEL: &str = "Contact";

const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M";

type Extractor = fn(&MessageContent) -> Option<&str>;

/// Content probes in priority order.
const EXTRACTORS: &[Extractor] = &[
    conversation,
    extended_text,
    image_caption,
    video_caption,
    document_caption,
    buttons_content,
    buttons_footer,
    buttons_response_text,
    buttons_response_id,
    list_response_title,
    list_response_row,
    template_reply_text,
    template_reply_id,
    template_content,
    template_title,
    template_footer,
];

fn conversation(c: &MessageContent) -> Option<&str> {
    c.conversation.as_deref()
}

fn extended_text(c: &MessageContent) -> Option<&str> {
    c.extended_text.as_ref()?.text.as_deref()
}

fn image_caption(c: &MessageContent) -> Option<&str> {
    c.image.as_ref()?.caption.as_deref()
}

fn video_caption(c: &MessageContent) -> Option<&str> {
    c.video.as_ref()?.caption.as_deref()
}

fn document_caption(c: &MessageContent) -> Option<&str> {
    c.document.as_ref()?.caption.as_deref()
}

fn buttons_content(c: &MessageContent) -> Option<&str> {
    c.buttons.as_ref()?.content_text.as_deref()
}

fn buttons_footer(c: &MessageContent) -> Option<&str> {
    c.buttons.as_ref()?.footer_text.as_deref()
}

fn buttons_response_text(c: &MessageContent) -> Option<&str> {
    c.buttons_response.as_ref()?.selected_display_text.as_deref()
}

fn buttons_response_id(c: &MessageContent) -> Option<&str> {
    c.buttons_response.as_ref()?.selected_button_id.as_deref()
}

fn list_response_title(c: &MessageContent) -> Option<&str> {
    c.list_response.as_ref()?.title.as_deref()
}

fn list_response_row(c: &MessageContent) -> Option<&str> {
    c.list_response
        .as_ref()?
        .single_select_reply
        .as_ref()?
        .selected_row_id
        .as_deref()
}

fn template_reply_text(c: &MessageContent) -> Option<&str> {
    c.template_button_reply
        .as_ref()?
        .selected_display_text
        .as_deref()
}

fn template_reply_id(c: &MessageContent) -> Option<&str> {
    c.template_button_reply.as_ref()?.selected_id.as_deref()
}

fn template_content(c: &MessageContent) -> Option<&str> {
    c.template.as_ref()?.hydrated.as_ref()?.content_text.as_deref()
}

fn template_title(c: &MessageContent) -> Option<&str> {
    c.template.as_ref()?.hydrated.as_ref()?.title_text.as_deref()
}

fn template_footer(c: &MessageContent) -> Option<&str> {
    c.template.as_ref()?.hydrated.as_ref()?.footer_text.as_deref()
}

/// Returns the first non-blank text carried by `content`, trimmed.
pub fn extract_text(content: &MessageContent) -> Option<&str> {
    EXTRACTORS
        .iter()
        .filter_map(|extract| extract(content))
        .map(str::trim)
        .find(|text| !text.is_empty())
}

/// Human label for the sender of `event`.
pub fn sender_label(event: &MessageEvent) -> &str {
    let info = &event.info;
    if info.is_from_me {
        return SELF_LABEL;
    }
    if let Some(name) = info
        .push_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
    {
        return name;
    }
    if !info.sender.is_empty() {
        return &info.sender;
    }
    UNKNOWN_SENDER_LABEL
}

/// Builds [`MessageRecord`]s from message events.
#[derive(Debug, Clone, Copy)]
pub struct RecordFactory {
    include_self: bool,
    clock: fn() -> DateTime<Utc>,
}

impl RecordFactory {
    /// A factory using the system clock for events without a timestamp.
    pub fn new(include_self: bool) -> Self {
        Self {
            include_self,
            clock: Utc::now,
        }
    }

    /// Replaces the clock used for events that report no time.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Converts one event. Returns `None` for missing events, events without
    /// displayable text, and self-sent events unless those were opted in.
    pub fn build(&self, event: Option<&MessageEvent>) -> Option<MessageRecord> {
        let event = event?;
        if event.info.is_from_me && !self.include_self {
            return None;
        }
        let text = extract_text(event.content.as_ref()?)?;

        let timestamp = event
            .info
            .timestamp
            .filter(|ts| ts.timestamp() > 0)
            .unwrap_or_else(self.clock);

        let sender = sender_label(event);
        let content = format!(
            "[{}] {}: {}",
            timestamp.with_timezone(&Local).format(TIMESTAMP_FORMAT),
            sender,
            text
        );

        let key = if event.info.id.is_empty() {
            format!(
                "{}|{}|{}|{}",
                timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
                sender,
                event.info.is_from_me,
                text
            )
        } else {
            event.info.id.clone()
        };

        Some(MessageRecord {
            key,
            timestamp,
            content,
        })
    }
}
