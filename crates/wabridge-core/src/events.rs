// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Events delivered by a messaging backend.
//!
//! Content variants mirror the closed set of message shapes the backend can
//! carry text in. Every field is optional because backends deliver partial
//! payloads routinely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Envelope metadata of an inbound message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageInfo {
    /// Backend message ID. May be empty.
    pub id: String,
    /// Conversation the message belongs to, as a raw address.
    pub chat: String,
    /// Raw sender user (phone digits or opaque id).
    pub sender: String,
    /// Display name the sender advertised.
    pub push_name: Option<String>,
    pub is_from_me: bool,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtendedText {
    pub text: Option<String>,
}

/// Image, video and document payloads only matter for their caption.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionedMedia {
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Buttons {
    pub content_text: Option<String>,
    pub footer_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonsResponse {
    pub selected_display_text: Option<String>,
    pub selected_button_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SingleSelectReply {
    pub selected_row_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListResponse {
    pub title: Option<String>,
    pub single_select_reply: Option<SingleSelectReply>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateButtonReply {
    pub selected_display_text: Option<String>,
    pub selected_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HydratedTemplate {
    pub content_text: Option<String>,
    pub title_text: Option<String>,
    pub footer_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    pub hydrated: Option<HydratedTemplate>,
}

/// Message body. At most a few of these are populated on a real message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageContent {
    pub conversation: Option<String>,
    pub extended_text: Option<ExtendedText>,
    pub image: Option<CaptionedMedia>,
    pub video: Option<CaptionedMedia>,
    pub document: Option<CaptionedMedia>,
    pub buttons: Option<Buttons>,
    pub buttons_response: Option<ButtonsResponse>,
    pub list_response: Option<ListResponse>,
    pub template_button_reply: Option<TemplateButtonReply>,
    pub template: Option<Template>,
}

impl MessageContent {
    /// Plain conversation text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            conversation: Some(text.into()),
            ..Self::default()
        }
    }
}

/// A live inbound message, or a history message after the backend parsed it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageEvent {
    pub info: MessageInfo,
    pub content: Option<MessageContent>,
}

/// An unparsed message inside a history sync batch.
///
/// The payload format belongs to the backend; only the backend can turn it
/// into a [`MessageEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryMessage {
    pub payload: Vec<u8>,
}

/// One conversation inside a history sync batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConversation {
    /// Raw conversation address.
    pub id: String,
    pub messages: Vec<HistoryMessage>,
}

/// Bulk replay of previously exchanged messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistorySync {
    pub conversations: Vec<HistoryConversation>,
}

/// Events the backend pushes to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    Message(Box<MessageEvent>),
    HistorySync(HistorySync),
}

/// Events of the pairing-code stream, delivered while an identity is being linked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingEvent {
    /// A new code to show to the user.
    Code(String),
    /// The device was linked.
    Success { device_id: String },
    /// The backend stopped offering codes.
    Timeout,
    /// Pairing failed on the backend side.
    Error(String),
}

impl PairingEvent {
    /// Short event name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Code(_) => "code",
            Self::Success { .. } => "success",
            Self::Timeout => "timeout",
            Self::Error(_) => "error",
        }
    }
}
