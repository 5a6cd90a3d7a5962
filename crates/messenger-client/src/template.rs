//! Structured message templates
//!
//! A template is sent as an attachment of type `template`; its payload is
//! one of the variants of [`TemplatePayload`], tagged by `template_type`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MessengerError, Result};
use crate::types::{Button, DefaultAction};

/// Default receipt currency
pub const DEFAULT_CURRENCY: &str = "USD";

/// Template payload, serialized with its `template_type` tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "template_type", rename_all = "snake_case")]
pub enum TemplatePayload {
    Button(ButtonTemplate),
    Generic(GenericTemplate),
    List(ListTemplate),
    OpenGraph(OpenGraphTemplate),
    Receipt(ReceiptTemplate),
    Media(MediaTemplate),
}

impl TemplatePayload {
    /// Text with up to three buttons below it.
    ///
    /// The button limit is enforced by Messenger, not here.
    pub fn button(text: impl Into<String>, buttons: Vec<Button>) -> Self {
        Self::Button(ButtonTemplate {
            text: text.into(),
            buttons,
        })
    }

    /// Horizontal carousel of elements
    pub fn generic(elements: Vec<GenericElement>) -> Self {
        Self::Generic(GenericTemplate { elements })
    }

    /// Vertical list of elements with an optional trailing button
    pub fn list(
        elements: Vec<GenericElement>,
        top_element_style: Option<TopElementStyle>,
        button: Option<Button>,
    ) -> Self {
        Self::List(ListTemplate {
            elements,
            top_element_style,
            buttons: button.map(|b| vec![b]),
        })
    }

    /// Rich preview of a single URL
    pub fn open_graph(url: impl Into<String>, buttons: Vec<Button>) -> Self {
        Self::OpenGraph(OpenGraphTemplate {
            elements: vec![OpenGraphElement {
                url: url.into(),
                buttons,
            }],
        })
    }

    /// Single image or video with one button
    pub fn media(media_type: TemplateMediaType, source: MediaSource, button: Button) -> Self {
        Self::Media(MediaTemplate {
            elements: vec![MediaElement {
                media_type,
                source,
                buttons: vec![button],
            }],
        })
    }

    pub fn template_type(&self) -> &'static str {
        match self {
            Self::Button(_) => "button",
            Self::Generic(_) => "generic",
            Self::List(_) => "list",
            Self::OpenGraph(_) => "open_graph",
            Self::Receipt(_) => "receipt",
            Self::Media(_) => "media",
        }
    }
}

// =============================================================================
// Button / Generic / List
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonTemplate {
    pub text: String,
    pub buttons: Vec<Button>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericTemplate {
    pub elements: Vec<GenericElement>,
}

/// Card used by the generic and list templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericElement {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_action: Option<DefaultAction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<Button>,
}

impl GenericElement {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            image_url: None,
            default_action: None,
            buttons: Vec::new(),
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn default_action(mut self, action: DefaultAction) -> Self {
        self.default_action = Some(action);
        self
    }

    pub fn button(mut self, button: Button) -> Self {
        self.buttons.push(button);
        self
    }
}

/// How the first list element is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopElementStyle {
    Large,
    Compact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTemplate {
    pub elements: Vec<GenericElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_element_style: Option<TopElementStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buttons: Option<Vec<Button>>,
}

// =============================================================================
// Open Graph
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenGraphTemplate {
    pub elements: Vec<OpenGraphElement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenGraphElement {
    pub url: String,
    #[serde(default)]
    pub buttons: Vec<Button>,
}

// =============================================================================
// Receipt
// =============================================================================

/// Order confirmation
///
/// Required fields go through [`ReceiptTemplate::new`]; everything else is
/// set with the chained setters and left off the wire when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptTemplate {
    pub recipient_name: String,
    pub order_number: String,
    pub currency: String,
    pub payment_method: String,
    pub sharable: bool,
    pub summary: ReceiptSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_name: Option<String>,
    /// Unix timestamp of the order, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<ReceiptElement>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<ReceiptAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjustments: Option<Vec<ReceiptAdjustment>>,
}

impl ReceiptTemplate {
    pub fn new(
        recipient_name: impl Into<String>,
        order_number: impl Into<String>,
        payment_method: impl Into<String>,
        summary: ReceiptSummary,
    ) -> Self {
        Self {
            recipient_name: recipient_name.into(),
            order_number: order_number.into(),
            currency: DEFAULT_CURRENCY.to_string(),
            payment_method: payment_method.into(),
            sharable: false,
            summary,
            merchant_name: None,
            timestamp: None,
            order_url: None,
            elements: None,
            address: None,
            adjustments: None,
        }
    }

    /// ISO 4217 currency code
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn sharable(mut self, sharable: bool) -> Self {
        self.sharable = sharable;
        self
    }

    pub fn merchant_name(mut self, name: impl Into<String>) -> Self {
        self.merchant_name = Some(name.into());
        self
    }

    pub fn timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn order_url(mut self, url: impl Into<String>) -> Self {
        self.order_url = Some(url.into());
        self
    }

    pub fn elements(mut self, elements: Vec<ReceiptElement>) -> Self {
        self.elements = Some(elements);
        self
    }

    pub fn address(mut self, address: ReceiptAddress) -> Self {
        self.address = Some(address);
        self
    }

    pub fn adjustments(mut self, adjustments: Vec<ReceiptAdjustment>) -> Self {
        self.adjustments = Some(adjustments);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tax: Option<f64>,
    pub total_cost: f64,
}

impl ReceiptSummary {
    pub fn new(total_cost: f64) -> Self {
        Self {
            subtotal: None,
            shipping_cost: None,
            total_tax: None,
            total_cost,
        }
    }
}

/// Line item on a receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptElement {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl ReceiptElement {
    pub fn new(title: impl Into<String>, price: f64) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            quantity: None,
            price,
            currency: None,
            image_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptAddress {
    pub street_1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub state: String,
    pub country: String,
}

/// Discount or surcharge applied to the order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptAdjustment {
    pub name: String,
    pub amount: f64,
}

// =============================================================================
// Media
// =============================================================================

/// Media types accepted by the media template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateMediaType {
    Image,
    Video,
}

/// Where the media template's content comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaSource {
    /// Facebook URL of the media
    Url(String),
    /// ID returned by the Attachment Upload API
    AttachmentId(String),
}

impl MediaSource {
    /// Pick the source from two optional inputs.
    ///
    /// `url` wins when both are present. Fails when neither is.
    pub fn from_parts(url: Option<String>, attachment_id: Option<String>) -> Result<Self> {
        match (url, attachment_id) {
            (Some(url), Some(_)) => {
                debug!("both url and attachment_id given for media template, using url");
                Ok(Self::Url(url))
            }
            (Some(url), None) => Ok(Self::Url(url)),
            (None, Some(id)) => Ok(Self::AttachmentId(id)),
            (None, None) => Err(MessengerError::InvalidArgument(
                "media template needs either a url or an attachment_id".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaTemplate {
    pub elements: Vec<MediaElement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaElement {
    pub media_type: TemplateMediaType,
    #[serde(flatten)]
    pub source: MediaSource,
    pub buttons: Vec<Button>,
}

macro_rules! impl_into_payload {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for TemplatePayload {
                fn from(template: $ty) -> Self {
                    Self::$variant(template)
                }
            }
        )*
    };
}

impl_into_payload! {
    ButtonTemplate => Button,
    GenericTemplate => Generic,
    ListTemplate => List,
    OpenGraphTemplate => OpenGraph,
    ReceiptTemplate => Receipt,
    MediaTemplate => Media,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn to_json<T: Serialize>(value: &T) -> serde_json::Value {
        serde_json::to_value(value).unwrap()
    }

    #[test]
    fn test_button_template() {
        let payload = TemplatePayload::button(
            "What do you want to do?",
            vec![
                Button::web_url("https://example.com", "Visit"),
                Button::postback("Talk", "TALK"),
            ],
        );

        assert_eq!(
            to_json(&Message::template(payload)),
            json!({
                "attachment": {
                    "type": "template",
                    "payload": {
                        "template_type": "button",
                        "text": "What do you want to do?",
                        "buttons": [
                            {"type": "web_url", "url": "https://example.com", "title": "Visit"},
                            {"type": "postback", "title": "Talk", "payload": "TALK"}
                        ]
                    }
                }
            })
        );
    }

    #[test]
    fn test_generic_template() {
        let element = GenericElement::new("Shirt")
            .subtitle("Cotton")
            .image_url("https://example.com/shirt.png")
            .default_action(DefaultAction::web_url("https://example.com/shirt"))
            .button(Button::postback("Buy", "BUY_SHIRT"));
        let bare = GenericElement::new("Hat");

        assert_eq!(
            to_json(&TemplatePayload::generic(vec![element, bare])),
            json!({
                "template_type": "generic",
                "elements": [
                    {
                        "title": "Shirt",
                        "subtitle": "Cotton",
                        "image_url": "https://example.com/shirt.png",
                        "default_action": {"type": "web_url", "url": "https://example.com/shirt"},
                        "buttons": [{"type": "postback", "title": "Buy", "payload": "BUY_SHIRT"}]
                    },
                    {"title": "Hat"}
                ]
            })
        );
    }

    #[test]
    fn test_list_template_omits_unset_fields() {
        let payload = TemplatePayload::list(
            vec![GenericElement::new("One"), GenericElement::new("Two")],
            None,
            None,
        );
        let value = to_json(&payload);

        assert_eq!(
            value,
            json!({
                "template_type": "list",
                "elements": [{"title": "One"}, {"title": "Two"}]
            })
        );
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("top_element_style"));
        assert!(!object.contains_key("buttons"));
    }

    #[test]
    fn test_list_template_with_style_and_button() {
        let payload = TemplatePayload::list(
            vec![GenericElement::new("One"), GenericElement::new("Two")],
            Some(TopElementStyle::Compact),
            Some(Button::postback("More", "MORE")),
        );

        assert_eq!(
            to_json(&payload),
            json!({
                "template_type": "list",
                "elements": [{"title": "One"}, {"title": "Two"}],
                "top_element_style": "compact",
                "buttons": [{"type": "postback", "title": "More", "payload": "MORE"}]
            })
        );
    }

    #[test]
    fn test_open_graph_template() {
        let payload = TemplatePayload::open_graph(
            "https://open.spotify.com/track/7GhIk7Il098yCjg4BQjzvb",
            vec![Button::web_url("https://en.wikipedia.org", "View More")],
        );

        assert_eq!(
            to_json(&payload),
            json!({
                "template_type": "open_graph",
                "elements": [{
                    "url": "https://open.spotify.com/track/7GhIk7Il098yCjg4BQjzvb",
                    "buttons": [{"type": "web_url", "url": "https://en.wikipedia.org", "title": "View More"}]
                }]
            })
        );
    }

    #[test]
    fn test_receipt_defaults_and_omissions() {
        let receipt = ReceiptTemplate::new("Stephane Crozatier", "12345678902", "Visa 2345", ReceiptSummary::new(56.14));

        assert_eq!(
            to_json(&TemplatePayload::from(receipt)),
            json!({
                "template_type": "receipt",
                "recipient_name": "Stephane Crozatier",
                "order_number": "12345678902",
                "currency": "USD",
                "payment_method": "Visa 2345",
                "sharable": false,
                "summary": {"total_cost": 56.14}
            })
        );
    }

    #[test]
    fn test_receipt_full() {
        let receipt = ReceiptTemplate::new(
            "Stephane Crozatier",
            "12345678902",
            "Visa 2345",
            ReceiptSummary {
                subtotal: Some(75.0),
                shipping_cost: Some(4.95),
                total_tax: Some(6.19),
                total_cost: 56.14,
            },
        )
        .currency("EUR")
        .sharable(true)
        .merchant_name("Acme")
        .timestamp("1428444852")
        .elements(vec![ReceiptElement {
            quantity: Some(2),
            ..ReceiptElement::new("Classic White T-Shirt", 50.0)
        }])
        .address(ReceiptAddress {
            street_1: "1 Hacker Way".into(),
            street_2: None,
            city: "Menlo Park".into(),
            postal_code: "94025".into(),
            state: "CA".into(),
            country: "US".into(),
        })
        .adjustments(vec![ReceiptAdjustment {
            name: "New Customer Discount".into(),
            amount: 20.0,
        }]);

        let value = to_json(&TemplatePayload::from(receipt));
        assert_eq!(value["currency"], json!("EUR"));
        assert_eq!(value["sharable"], json!(true));
        assert_eq!(value["merchant_name"], json!("Acme"));
        assert_eq!(value["timestamp"], json!("1428444852"));
        assert_eq!(
            value["elements"],
            json!([{"title": "Classic White T-Shirt", "quantity": 2, "price": 50.0}])
        );
        assert_eq!(
            value["address"],
            json!({
                "street_1": "1 Hacker Way",
                "city": "Menlo Park",
                "postal_code": "94025",
                "state": "CA",
                "country": "US"
            })
        );
        assert_eq!(
            value["adjustments"],
            json!([{"name": "New Customer Discount", "amount": 20.0}])
        );
        assert!(value.get("order_url").is_none());
    }

    #[test]
    fn test_media_template_url() {
        let payload = TemplatePayload::media(
            TemplateMediaType::Image,
            MediaSource::Url("https://www.facebook.com/photo.php?fbid=1".into()),
            Button::web_url("https://example.com", "View"),
        );

        assert_eq!(
            to_json(&payload),
            json!({
                "template_type": "media",
                "elements": [{
                    "media_type": "image",
                    "url": "https://www.facebook.com/photo.php?fbid=1",
                    "buttons": [{"type": "web_url", "url": "https://example.com", "title": "View"}]
                }]
            })
        );
    }

    #[test]
    fn test_media_template_attachment_id() {
        let payload = TemplatePayload::media(
            TemplateMediaType::Video,
            MediaSource::AttachmentId("1854626884821032".into()),
            Button::postback("Like", "LIKE"),
        );

        let element = &to_json(&payload)["elements"][0];
        assert_eq!(element["media_type"], json!("video"));
        assert_eq!(element["attachment_id"], json!("1854626884821032"));
        assert!(element.get("url").is_none());
    }

    #[test]
    fn test_media_source_precedence() {
        assert_eq!(
            MediaSource::from_parts(Some("https://x".into()), Some("123".into())).unwrap(),
            MediaSource::Url("https://x".into())
        );
        assert_eq!(
            MediaSource::from_parts(None, Some("123".into())).unwrap(),
            MediaSource::AttachmentId("123".into())
        );
        assert!(matches!(
            MediaSource::from_parts(None, None),
            Err(MessengerError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_open_graph_keeps_empty_buttons() {
        let value = to_json(&TemplatePayload::open_graph("https://x", vec![]));
        assert_eq!(
            value["elements"],
            json!([{"url": "https://x", "buttons": []}])
        );
    }

    #[test]
    fn test_receipt_keeps_explicit_empty_lists() {
        let receipt = ReceiptTemplate::new("Ann", "42", "Visa 1234", ReceiptSummary::new(0.0))
            .elements(vec![])
            .adjustments(vec![]);

        let value = to_json(&TemplatePayload::from(receipt));
        assert_eq!(value["elements"], json!([]));
        assert_eq!(value["adjustments"], json!([]));
    }

    #[test]
    fn test_template_type_names() {
        let payload = TemplatePayload::open_graph("https://x", vec![]);
        assert_eq!(payload.template_type(), "open_graph");
        assert_eq!(to_json(&payload)["template_type"], json!("open_graph"));
    }
}
