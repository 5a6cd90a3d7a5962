//! Messenger Send API Client Library
//!
//! Provides a typed HTTP client for the Messenger Platform Send API
//! (`POST https://graph.facebook.com/v{version}/me/messages`).
//!
//! # Example
//!
//! ```rust,no_run
//! use messenger_client::{Button, MessagingType, MessengerClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = MessengerClient::new("PAGE_ACCESS_TOKEN")?;
//!
//!     // Plain text, default messaging type (RESPONSE)
//!     client.send_text("USER_ID", "hello", None).await?;
//!
//!     // Button template sent as a proactive update
//!     client
//!         .send_button_template(
//!             "USER_ID",
//!             "What next?",
//!             vec![Button::postback("Start over", "RESTART")],
//!             Some(MessagingType::Update),
//!         )
//!         .await?;
//!
//!     client.send_typing_off("USER_ID", None).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Errors
//!
//! Every send resolves with the Graph API response body or a
//! [`MessengerError`]. Remote errors carry the Graph error code and type;
//! requests that never got an answer surface as
//! [`MessengerError::NoResponse`].
//!
//! # Testing
//!
//! The `testing` module provides a mock Graph API for integration tests:
//!
//! ```rust,ignore
//! use messenger_client::testing::{MockGraphApi, TestServer};
//!
//! let mock = MockGraphApi::new();
//! let server = TestServer::start(mock.router()).await?;
//! server.client.send_text("USER1", "hello", None).await?;
//! ```

mod client;
mod config;
mod error;
pub mod template;
pub mod testing;
mod types;

pub use client::MessengerClient;
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_API_VERSION, DEFAULT_GRAPH_URL};
pub use error::{MessengerError, Result};
pub use types::*;

// Re-export template types for convenience
pub use template::{
    GenericElement, MediaSource, ReceiptAddress, ReceiptAdjustment, ReceiptElement,
    ReceiptSummary, ReceiptTemplate, TemplateMediaType, TemplatePayload, TopElementStyle,
};
