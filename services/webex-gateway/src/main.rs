//! Webex Gateway
//!
//! Model Context Protocol server bridging Webex Calling management APIs:
//! - Tools: organization, users, locations, queues, devices, licenses,
//!   phone numbers, voicemail, webhooks
//! - Reporting: call history, the CDR analytics feed, PSTN-minute rollups
//!
//! Speaks newline-delimited JSON-RPC over stdio for MCP hosts (Claude
//! Desktop, Cursor, etc.); an optional HTTP surface serves health probes
//! and an SSE keep-alive stream.

#![allow(dead_code)]

use std::sync::Arc;

use callbridge_core::{BridgeService, HealthStatus, ReadinessStatus, Result, ServiceRuntime};
use callbridge_mcp_sdk::StdioTransport;
use tracing::info;

mod area_codes;
mod cdr;
mod client;
mod config;
mod server;
mod tools;

#[cfg(test)]
mod tests;

pub use config::GatewayConfig;

use client::WebexClient;
use server::McpServer;

#[tokio::main]
async fn main() -> Result<()> {
    // Stdout is the MCP transport; all logging goes to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("webex_gateway=debug".parse().expect("valid tracing directive")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    info!("Starting Webex Gateway");

    let service = Arc::new(WebexGatewayService::new().await?);
    ServiceRuntime::run(service).await
}

pub struct WebexGatewayService {
    config: GatewayConfig,
    mcp_server: Arc<McpServer>,
    start_time: std::time::Instant,
}

impl WebexGatewayService {
    pub async fn new() -> Result<Self> {
        let mut config = GatewayConfig::from_env()?;

        // No token configured: run the interactive OAuth bootstrap.
        if config.webex_access_token.is_empty() {
            let (Some(client_id), Some(client_secret)) =
                (config.webex_client_id.clone(), config.webex_client_secret.clone())
            else {
                return Err(callbridge_core::BridgeError::Config(
                    "OAuth bootstrap requires WEBEX_CLIENT_ID and WEBEX_CLIENT_SECRET".to_string(),
                ));
            };
            let oauth = client::oauth::WebexOAuth::new(client_id, client_secret)
                .with_redirect_uri(format!(
                    "http://localhost:{}/callback",
                    config.oauth_callback_port
                ));
            let tokens = oauth
                .authorize(config.oauth_callback_port)
                .await
                .map_err(|e| callbridge_core::BridgeError::Auth(e.to_string()))?;
            config.webex_access_token = tokens.access_token;
        }

        let client = Arc::new(WebexClient::new(config.client_options()));
        let mcp_server = Arc::new(McpServer::new(client));

        Ok(Self {
            config,
            mcp_server,
            start_time: std::time::Instant::now(),
        })
    }
}

async fn serve_http(http_bind: String) -> Result<()> {
    let app = axum::Router::new()
        .route("/health", axum::routing::get(|| async { "OK" }))
        .route("/ready", axum::routing::get(|| async { "OK" }))
        .route("/mcp/v1/sse", axum::routing::get(server::sse_handler));

    let listener = tokio::net::TcpListener::bind(&http_bind).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| callbridge_core::BridgeError::Network(e.to_string()))
}

#[async_trait::async_trait]
impl BridgeService for WebexGatewayService {
    fn service_id(&self) -> &'static str {
        "webex-gateway"
    }

    async fn health(&self) -> HealthStatus {
        HealthStatus {
            healthy: true,
            service_id: self.service_id().to_string(),
            version: self.version().to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    async fn ready(&self) -> ReadinessStatus {
        ReadinessStatus {
            ready: true,
            dependencies: vec![callbridge_core::DependencyStatus {
                name: "webex-api".to_string(),
                available: true,
                latency_ms: None,
            }],
        }
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down Webex Gateway");
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        if self.config.enable_sse {
            info!(http = %self.config.http_bind, "Starting HTTP surface");
            if !self.config.enable_stdio {
                return serve_http(self.config.http_bind.clone()).await;
            }
            let http_bind = self.config.http_bind.clone();
            tokio::spawn(async move {
                if let Err(e) = serve_http(http_bind).await {
                    tracing::error!("HTTP surface error: {}", e);
                }
            });
        }

        info!("Serving MCP over stdio");
        let mcp_server = self.mcp_server.clone();
        StdioTransport::serve(move |request| {
            let mcp_server = mcp_server.clone();
            async move { mcp_server.dispatch(request).await }
        })
        .await?;

        Ok(())
    }
}
