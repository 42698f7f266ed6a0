//! Connection settings supplied by the owning SDK.

use serde::Deserialize;

/// Where the backend lives and how this application identifies itself.
///
/// `api_domain` is scheme + host with no trailing slash, e.g.
/// `http://api.example.com`. It is joined to the port and path verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    #[serde(alias = "apiDomain")]
    pub api_domain: String,
    #[serde(alias = "httpPort")]
    pub http_port: u16,
    #[serde(alias = "appCode")]
    pub app_code: String,
}

impl ClientConfig {
    pub fn new(api_domain: impl Into<String>, http_port: u16, app_code: impl Into<String>) -> Self {
        Self {
            api_domain: api_domain.into(),
            http_port,
            app_code: app_code.into(),
        }
    }
}
