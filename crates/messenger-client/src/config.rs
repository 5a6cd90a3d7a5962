//! Client configuration with YAML support

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MessengerError, Result};

/// Graph API version used when none is configured
pub const DEFAULT_API_VERSION: &str = "2.11";

/// Graph API host used when none is configured
pub const DEFAULT_GRAPH_URL: &str = "https://graph.facebook.com";

const REDACTED: &str = "***";

/// Messenger client configuration
///
/// Can be loaded from YAML or JSON, or constructed programmatically:
///
/// ```yaml
/// access_token: "EAAG..."
/// api_version: "2.11"        # optional
/// timeout_ms: 30000          # optional, no timeout when absent
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Page access token sent as `Authorization: Bearer <token>`
    pub access_token: String,

    /// Graph API version, interpolated verbatim into the URI
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Scheme and host of the Graph API
    #[serde(default = "default_graph_url")]
    pub graph_url: String,

    /// Total request timeout in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Connect timeout in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_ms: Option<u64>,
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_graph_url() -> String {
    DEFAULT_GRAPH_URL.to_string()
}

impl ClientConfig {
    /// Create a configuration with defaults for everything but the token
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            api_version: default_api_version(),
            graph_url: default_graph_url(),
            timeout_ms: None,
            connect_timeout_ms: None,
        }
    }

    /// Create a builder for programmatic configuration
    pub fn builder(access_token: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder::new(access_token)
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            MessengerError::Config(format!("failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| MessengerError::Config(e.to_string()))
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| MessengerError::Config(e.to_string()))
    }

    /// Serialize configuration to YAML with the access token masked
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.redacted()).map_err(|e| MessengerError::Config(e.to_string()))
    }

    /// Fail unless an access token is present
    pub fn validate(&self) -> Result<()> {
        if self.access_token.trim().is_empty() {
            return Err(MessengerError::MissingAccessToken);
        }
        Ok(())
    }

    /// The Send API endpoint derived from host and version
    pub fn messages_uri(&self) -> String {
        format!(
            "{}/v{}/me/messages",
            self.graph_url.trim_end_matches('/'),
            self.api_version
        )
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    fn redacted(&self) -> Self {
        Self {
            access_token: REDACTED.to_string(),
            ..self.clone()
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("access_token", &REDACTED)
            .field("api_version", &self.api_version)
            .field("graph_url", &self.graph_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .finish()
    }
}

/// Builder for ClientConfig
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder with the given access token
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            config: ClientConfig::new(access_token),
        }
    }

    /// Set the Graph API version (e.g. "2.11")
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.config.api_version = version.into();
        self
    }

    /// Point the client at a different Graph host
    pub fn graph_url(mut self, url: impl Into<String>) -> Self {
        self.config.graph_url = url.into();
        self
    }

    /// Set request timeout in milliseconds
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeout_ms = Some(ms);
        self
    }

    /// Set connect timeout in milliseconds
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = Some(ms);
        self
    }

    /// Build the configuration
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
access_token: "page-token"
api_version: "3.2"
timeout_ms: 5000
"#;

        let config = ClientConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.access_token, "page-token");
        assert_eq!(config.api_version, "3.2");
        assert_eq!(config.graph_url, DEFAULT_GRAPH_URL);
        assert_eq!(config.timeout(), Some(Duration::from_millis(5000)));
        assert_eq!(config.connect_timeout(), None);
    }

    #[test]
    fn test_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messenger.yaml");
        std::fs::write(&path, "access_token: \"from-file\"\n").unwrap();

        let config = ClientConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.access_token, "from-file");
        assert_eq!(config.api_version, DEFAULT_API_VERSION);

        let missing = ClientConfig::from_yaml_file(dir.path().join("absent.yaml"));
        assert!(matches!(missing, Err(MessengerError::Config(_))));
    }

    #[test]
    fn test_json_defaults() {
        let config = ClientConfig::from_json(r#"{"access_token":"t"}"#).unwrap();
        assert_eq!(config.api_version, "2.11");
        assert_eq!(
            config.messages_uri(),
            "https://graph.facebook.com/v2.11/me/messages"
        );
    }

    #[test]
    fn test_missing_token_field_is_config_error() {
        let err = ClientConfig::from_yaml("api_version: \"2.11\"").unwrap_err();
        assert!(matches!(err, MessengerError::Config(_)));
    }

    #[test]
    fn test_validate() {
        assert!(ClientConfig::new("token").validate().is_ok());
        assert!(matches!(
            ClientConfig::new("").validate(),
            Err(MessengerError::MissingAccessToken)
        ));
        assert!(matches!(
            ClientConfig::new("   ").validate(),
            Err(MessengerError::MissingAccessToken)
        ));
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::builder("token")
            .api_version("4.0")
            .graph_url("http://127.0.0.1:9000/")
            .timeout_ms(250)
            .connect_timeout_ms(100)
            .build();

        assert_eq!(
            config.messages_uri(),
            "http://127.0.0.1:9000/v4.0/me/messages"
        );
        assert_eq!(config.timeout_ms, Some(250));
        assert_eq!(config.connect_timeout_ms, Some(100));
    }

    #[test]
    fn test_version_is_not_validated() {
        let config = ClientConfig::builder("token").api_version("latest").build();
        assert_eq!(
            config.messages_uri(),
            "https://graph.facebook.com/vlatest/me/messages"
        );
    }

    #[test]
    fn test_token_redacted() {
        let config = ClientConfig::new("super-secret-token");

        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret-token"));

        let yaml = config.to_yaml().unwrap();
        assert!(!yaml.contains("super-secret-token"));
        assert!(yaml.contains("api_version"));
    }
}
