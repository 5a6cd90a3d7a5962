//! Messenger Send API client implementation

use std::fmt;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{MessengerError, Result};
use crate::template::{
    GenericElement, MediaSource, ReceiptTemplate, TemplateMediaType, TemplatePayload,
    TopElementStyle,
};
use crate::types::*;

/// Messenger Send API client
///
/// Holds only immutable configuration, so a single instance can be cloned
/// or shared across tasks and used concurrently.
#[derive(Clone)]
pub struct MessengerClient {
    client: Client,
    uri: Url,
    api_version: String,
    access_token: String,
}

impl MessengerClient {
    /// Create a client for the default Graph API version
    ///
    /// # Arguments
    /// * `access_token` - Page access token; must not be empty
    pub fn new(access_token: impl Into<String>) -> Result<Self> {
        Self::from_config(ClientConfig::new(access_token))
    }

    /// Create a client pinned to a Graph API version (e.g. "2.11")
    pub fn with_api_version(
        access_token: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Result<Self> {
        Self::from_config(
            ClientConfig::builder(access_token)
                .api_version(api_version)
                .build(),
        )
    }

    /// Create a client from a full configuration
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(connect_timeout);
        }
        let client = builder.build().map_err(MessengerError::Transport)?;

        Self::with_http_client(config, client)
    }

    /// Create a client that reuses an existing HTTP client.
    ///
    /// Timeouts in `config` are ignored; the supplied client's own settings
    /// apply.
    pub fn with_http_client(config: ClientConfig, client: Client) -> Result<Self> {
        config.validate()?;

        let uri = Url::parse(&config.messages_uri())?;

        Ok(Self {
            client,
            uri,
            api_version: config.api_version,
            access_token: config.access_token,
        })
    }

    /// The Send API endpoint this client posts to
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Get a reference to the underlying HTTP client.
    pub fn http_client(&self) -> &Client {
        &self.client
    }

    // =========================================================================
    // Text & Attachments
    // =========================================================================

    /// Send a plain text message
    #[instrument(skip(self, text))]
    pub async fn send_text(
        &self,
        recipient_id: &str,
        text: &str,
        messaging_type: Option<MessagingType>,
    ) -> Result<Value> {
        self.send_message(recipient_id, Message::text(text), messaging_type)
            .await
    }

    /// Send media hosted at a URL
    #[instrument(skip(self, url))]
    pub async fn send_attachment(
        &self,
        recipient_id: &str,
        kind: MediaKind,
        url: &str,
        messaging_type: Option<MessagingType>,
    ) -> Result<Value> {
        self.send_message(recipient_id, Message::attachment(kind, url), messaging_type)
            .await
    }

    #[instrument(skip(self, url))]
    pub async fn send_image(
        &self,
        recipient_id: &str,
        url: &str,
        messaging_type: Option<MessagingType>,
    ) -> Result<Value> {
        self.send_attachment(recipient_id, MediaKind::Image, url, messaging_type)
            .await
    }

    #[instrument(skip(self, url))]
    pub async fn send_audio(
        &self,
        recipient_id: &str,
        url: &str,
        messaging_type: Option<MessagingType>,
    ) -> Result<Value> {
        self.send_attachment(recipient_id, MediaKind::Audio, url, messaging_type)
            .await
    }

    #[instrument(skip(self, url))]
    pub async fn send_video(
        &self,
        recipient_id: &str,
        url: &str,
        messaging_type: Option<MessagingType>,
    ) -> Result<Value> {
        self.send_attachment(recipient_id, MediaKind::Video, url, messaging_type)
            .await
    }

    #[instrument(skip(self, url))]
    pub async fn send_file(
        &self,
        recipient_id: &str,
        url: &str,
        messaging_type: Option<MessagingType>,
    ) -> Result<Value> {
        self.send_attachment(recipient_id, MediaKind::File, url, messaging_type)
            .await
    }

    /// Send text with quick reply chips, in the order given
    #[instrument(skip(self, text, replies), fields(replies = replies.len()))]
    pub async fn send_quick_replies(
        &self,
        recipient_id: &str,
        text: &str,
        replies: Vec<QuickReply>,
        messaging_type: Option<MessagingType>,
    ) -> Result<Value> {
        self.send_message(
            recipient_id,
            Message::quick_replies(text, replies),
            messaging_type,
        )
        .await
    }

    // =========================================================================
    // Templates
    // =========================================================================

    /// Send a button template (Messenger accepts at most three buttons)
    #[instrument(skip(self, text, buttons))]
    pub async fn send_button_template(
        &self,
        recipient_id: &str,
        text: &str,
        buttons: Vec<Button>,
        messaging_type: Option<MessagingType>,
    ) -> Result<Value> {
        self.send_template(
            recipient_id,
            TemplatePayload::button(text, buttons),
            messaging_type,
        )
        .await
    }

    /// Send a generic (carousel) template
    #[instrument(skip(self, elements))]
    pub async fn send_generic_template(
        &self,
        recipient_id: &str,
        elements: Vec<GenericElement>,
        messaging_type: Option<MessagingType>,
    ) -> Result<Value> {
        self.send_template(
            recipient_id,
            TemplatePayload::generic(elements),
            messaging_type,
        )
        .await
    }

    /// Send a list template
    ///
    /// `top_element_style` and `button` are left off the payload when `None`.
    #[instrument(skip(self, elements, button))]
    pub async fn send_list_template(
        &self,
        recipient_id: &str,
        elements: Vec<GenericElement>,
        top_element_style: Option<TopElementStyle>,
        button: Option<Button>,
        messaging_type: Option<MessagingType>,
    ) -> Result<Value> {
        self.send_template(
            recipient_id,
            TemplatePayload::list(elements, top_element_style, button),
            messaging_type,
        )
        .await
    }

    /// Send an open graph template for a single URL
    #[instrument(skip(self, url, buttons))]
    pub async fn send_open_graph_template(
        &self,
        recipient_id: &str,
        url: &str,
        buttons: Vec<Button>,
        messaging_type: Option<MessagingType>,
    ) -> Result<Value> {
        self.send_template(
            recipient_id,
            TemplatePayload::open_graph(url, buttons),
            messaging_type,
        )
        .await
    }

    /// Send an order receipt
    #[instrument(skip(self, receipt), fields(order_number = %receipt.order_number))]
    pub async fn send_receipt_template(
        &self,
        recipient_id: &str,
        receipt: ReceiptTemplate,
        messaging_type: Option<MessagingType>,
    ) -> Result<Value> {
        self.send_template(recipient_id, receipt, messaging_type)
            .await
    }

    /// Send a media template with a single button
    ///
    /// Use [`MediaSource::from_parts`] when the URL and attachment ID come
    /// from optional inputs.
    #[instrument(skip(self, source, button))]
    pub async fn send_media_template(
        &self,
        recipient_id: &str,
        media_type: TemplateMediaType,
        source: MediaSource,
        button: Button,
        messaging_type: Option<MessagingType>,
    ) -> Result<Value> {
        self.send_template(
            recipient_id,
            TemplatePayload::media(media_type, source, button),
            messaging_type,
        )
        .await
    }

    /// Send any template payload
    #[instrument(skip(self, payload))]
    pub async fn send_template(
        &self,
        recipient_id: &str,
        payload: impl Into<TemplatePayload>,
        messaging_type: Option<MessagingType>,
    ) -> Result<Value> {
        self.send_message(recipient_id, Message::template(payload), messaging_type)
            .await
    }

    // =========================================================================
    // Sender Actions
    // =========================================================================

    /// Mark the conversation as seen
    #[instrument(skip(self))]
    pub async fn send_read_receipt(
        &self,
        recipient_id: &str,
        messaging_type: Option<MessagingType>,
    ) -> Result<Value> {
        self.send_action(recipient_id, SenderAction::MarkSeen, messaging_type)
            .await
    }

    /// Show the typing indicator
    #[instrument(skip(self))]
    pub async fn send_typing_on(
        &self,
        recipient_id: &str,
        messaging_type: Option<MessagingType>,
    ) -> Result<Value> {
        self.send_action(recipient_id, SenderAction::TypingOn, messaging_type)
            .await
    }

    /// Hide the typing indicator
    #[instrument(skip(self))]
    pub async fn send_typing_off(
        &self,
        recipient_id: &str,
        messaging_type: Option<MessagingType>,
    ) -> Result<Value> {
        self.send_action(recipient_id, SenderAction::TypingOff, messaging_type)
            .await
    }

    // =========================================================================
    // Envelope Primitives
    // =========================================================================

    /// Send a sender action
    #[instrument(skip(self))]
    pub async fn send_action(
        &self,
        recipient_id: &str,
        action: SenderAction,
        messaging_type: Option<MessagingType>,
    ) -> Result<Value> {
        self.send(&Envelope::action(recipient_id, action, messaging_type))
            .await
    }

    /// Send message content
    #[instrument(skip(self, message))]
    pub async fn send_message(
        &self,
        recipient_id: &str,
        message: Message,
        messaging_type: Option<MessagingType>,
    ) -> Result<Value> {
        self.send(&Envelope::message(recipient_id, message, messaging_type))
            .await
    }

    /// POST a request body to the Send API.
    ///
    /// Resolves with the response body exactly as the Graph API returned it.
    /// Never retries.
    #[instrument(skip_all, fields(uri = %self.uri))]
    pub async fn send<T: Serialize + ?Sized>(&self, body: &T) -> Result<Value> {
        debug!("Posting to send API");

        let response = self
            .client
            .post(self.uri.clone())
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await
            .map_err(MessengerError::from_send_failure)?;

        self.handle_response(response).await
    }

    // =========================================================================
    // Helper Methods
    // =========================================================================

    /// Return the JSON body of a 2xx response, or normalize the failure
    async fn handle_response(&self, response: reqwest::Response) -> Result<Value> {
        let status = response.status();

        if status.is_success() {
            let body = response.json().await.map_err(MessengerError::Transport)?;
            debug!(status = status.as_u16(), "Send API call succeeded");
            Ok(body)
        } else {
            let body = response.text().await.map_err(MessengerError::Transport)?;
            let err = MessengerError::from_error_body(status.as_u16(), body);
            warn!(status = status.as_u16(), error = %err, "Send API call failed");
            Err(err)
        }
    }
}

impl fmt::Debug for MessengerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessengerClient")
            .field("uri", &self.uri.as_str())
            .field("api_version", &self.api_version)
            .field("access_token", &"***")
            .finish()
    }
}
