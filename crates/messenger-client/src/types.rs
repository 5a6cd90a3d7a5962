//! Request types for the Messenger Send API
//!
//! Every type serializes to the exact wire shape the Graph API expects.
//! Optional fields are skipped when unset, never sent as `null`.

use serde::{Deserialize, Serialize};

use crate::template::TemplatePayload;

// =============================================================================
// Envelope
// =============================================================================

/// Delivery class of a message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessagingType {
    /// Reply to a user message
    #[default]
    Response,
    /// Proactive update outside a response
    Update,
    /// Tagged message sent outside the standard window
    MessageTag,
    NonPromotionalSubscription,
}

impl MessagingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Response => "RESPONSE",
            Self::Update => "UPDATE",
            Self::MessageTag => "MESSAGE_TAG",
            Self::NonPromotionalSubscription => "NON_PROMOTIONAL_SUBSCRIPTION",
        }
    }
}

/// Non-content signal sent in place of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderAction {
    MarkSeen,
    TypingOn,
    TypingOff,
}

/// Message target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: String,
}

/// Top-level request body for `POST /me/messages`
///
/// Carries exactly one of `message` or `sender_action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub messaging_type: MessagingType,
    pub recipient: Recipient,
    #[serde(flatten)]
    pub body: EnvelopeBody,
}

/// The part of an envelope that varies between content and actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeBody {
    Message(Message),
    SenderAction(SenderAction),
}

impl Envelope {
    /// Envelope carrying message content
    ///
    /// `None` for the messaging type means [`MessagingType::default`].
    pub fn message(
        recipient_id: impl Into<String>,
        message: Message,
        messaging_type: Option<MessagingType>,
    ) -> Self {
        Self::new(recipient_id, EnvelopeBody::Message(message), messaging_type)
    }

    /// Envelope carrying a sender action
    pub fn action(
        recipient_id: impl Into<String>,
        action: SenderAction,
        messaging_type: Option<MessagingType>,
    ) -> Self {
        Self::new(recipient_id, EnvelopeBody::SenderAction(action), messaging_type)
    }

    fn new(
        recipient_id: impl Into<String>,
        body: EnvelopeBody,
        messaging_type: Option<MessagingType>,
    ) -> Self {
        Self {
            messaging_type: messaging_type.unwrap_or_default(),
            recipient: Recipient {
                id: recipient_id.into(),
            },
            body,
        }
    }
}

// =============================================================================
// Message Content
// =============================================================================

/// Message content: plain text, text with quick replies, or an attachment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
    QuickReplies {
        text: String,
        quick_replies: Vec<QuickReply>,
    },
    Text {
        text: String,
    },
    Attachment {
        attachment: Attachment,
    },
}

impl Message {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Text followed by reply chips, kept in the given order
    pub fn quick_replies(text: impl Into<String>, replies: Vec<QuickReply>) -> Self {
        Self::QuickReplies {
            text: text.into(),
            quick_replies: replies,
        }
    }

    /// Media hosted at `url`
    pub fn attachment(kind: MediaKind, url: impl Into<String>) -> Self {
        let payload = UrlPayload { url: url.into() };
        let attachment = match kind {
            MediaKind::Image => Attachment::Image(payload),
            MediaKind::Audio => Attachment::Audio(payload),
            MediaKind::Video => Attachment::Video(payload),
            MediaKind::File => Attachment::File(payload),
        };
        Self::Attachment { attachment }
    }

    /// Structured template rendered by Messenger
    pub fn template(payload: impl Into<TemplatePayload>) -> Self {
        Self::Attachment {
            attachment: Attachment::Template(payload.into()),
        }
    }
}

/// Kind of media sent by URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Audio,
    Video,
    File,
}

/// Attachment as `{type, payload}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Attachment {
    Image(UrlPayload),
    Audio(UrlPayload),
    Video(UrlPayload),
    File(UrlPayload),
    Template(TemplatePayload),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlPayload {
    pub url: String,
}

// =============================================================================
// Quick Replies
// =============================================================================

/// Reply chip shown above the composer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "content_type", rename_all = "snake_case")]
pub enum QuickReply {
    Text {
        title: String,
        payload: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image_url: Option<String>,
    },
    UserPhoneNumber,
    UserEmail,
}

impl QuickReply {
    pub fn text(title: impl Into<String>, payload: impl Into<String>) -> Self {
        Self::Text {
            title: title.into(),
            payload: payload.into(),
            image_url: None,
        }
    }

    /// Text reply with an icon
    pub fn text_with_image(
        title: impl Into<String>,
        payload: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self::Text {
            title: title.into(),
            payload: payload.into(),
            image_url: Some(image_url.into()),
        }
    }
}

// =============================================================================
// Buttons
// =============================================================================

/// Height of the webview opened by a URL button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebviewHeightRatio {
    Compact,
    Tall,
    Full,
}

/// Template button
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Button {
    WebUrl {
        url: String,
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        webview_height_ratio: Option<WebviewHeightRatio>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        messenger_extensions: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fallback_url: Option<String>,
    },
    Postback {
        title: String,
        payload: String,
    },
    /// Call button; `payload` is the phone number in `+<country><number>` form
    PhoneNumber {
        title: String,
        payload: String,
    },
    ElementShare,
    AccountLink {
        url: String,
    },
    AccountUnlink,
}

impl Button {
    pub fn web_url(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self::WebUrl {
            url: url.into(),
            title: title.into(),
            webview_height_ratio: None,
            messenger_extensions: None,
            fallback_url: None,
        }
    }

    pub fn postback(title: impl Into<String>, payload: impl Into<String>) -> Self {
        Self::Postback {
            title: title.into(),
            payload: payload.into(),
        }
    }

    pub fn phone_number(title: impl Into<String>, number: impl Into<String>) -> Self {
        Self::PhoneNumber {
            title: title.into(),
            payload: number.into(),
        }
    }

    pub fn account_link(url: impl Into<String>) -> Self {
        Self::AccountLink { url: url.into() }
    }
}

/// Action taken when a template element itself is tapped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DefaultAction {
    WebUrl {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        webview_height_ratio: Option<WebviewHeightRatio>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        messenger_extensions: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fallback_url: Option<String>,
    },
}

impl DefaultAction {
    pub fn web_url(url: impl Into<String>) -> Self {
        Self::WebUrl {
            url: url.into(),
            webview_height_ratio: None,
            messenger_extensions: None,
            fallback_url: None,
        }
    }
}
