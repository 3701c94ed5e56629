//! Webex Gateway Configuration

use callbridge_core::config::{env_bool, env_opt, env_or, env_u16};
use callbridge_core::{BridgeError, Result};

use crate::client::WebexClientOptions;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub http_bind: String,
    pub enable_stdio: bool,
    pub enable_sse: bool,
    /// Empty when the operator expects the OAuth bootstrap to obtain one.
    pub webex_access_token: String,
    pub webex_client_id: Option<String>,
    pub webex_client_secret: Option<String>,
    pub oauth_callback_port: u16,
    pub webex_base_url: String,
    pub webex_analytics_base_url: String,
    pub request_timeout_secs: u64,
    /// Workaround for the CDR feed rejecting `.000` millisecond fields.
    pub pad_zero_millis: bool,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            http_bind: env_or("HTTP_BIND", "0.0.0.0:8080"),
            enable_stdio: env_bool("MCP_ENABLE_STDIO", true),
            enable_sse: env_bool("MCP_ENABLE_SSE", false),
            webex_access_token: env_or("WEBEX_ACCESS_TOKEN", ""),
            webex_client_id: env_opt("WEBEX_CLIENT_ID"),
            webex_client_secret: env_opt("WEBEX_CLIENT_SECRET"),
            oauth_callback_port: env_u16("OAUTH_CALLBACK_PORT", 8080),
            webex_base_url: env_or("WEBEX_BASE_URL", "https://webexapis.com/v1"),
            webex_analytics_base_url: env_or(
                "WEBEX_ANALYTICS_BASE_URL",
                "https://analytics.webexapis.com/v1",
            ),
            request_timeout_secs: 30,
            pad_zero_millis: env_bool("CDR_PAD_ZERO_MILLIS", true),
        };

        if config.webex_access_token.is_empty()
            && (config.webex_client_id.is_none() || config.webex_client_secret.is_none())
        {
            return Err(BridgeError::Config(
                "WEBEX_ACCESS_TOKEN must be set, or WEBEX_CLIENT_ID and WEBEX_CLIENT_SECRET \
                 for the interactive OAuth flow"
                    .to_string(),
            ));
        }

        Ok(config)
    }

    pub fn client_options(&self) -> WebexClientOptions {
        WebexClientOptions {
            access_token: self.webex_access_token.clone(),
            base_url: self.webex_base_url.clone(),
            analytics_base_url: self.webex_analytics_base_url.clone(),
            request_timeout_secs: self.request_timeout_secs,
            pad_zero_millis: self.pad_zero_millis,
        }
    }
}
