//! MCP Server implementation

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream::Stream;
use serde_json::{json, Value};

use callbridge_mcp_sdk::protocol::{
    error_codes, McpRequest, McpResponse, ServerCapabilities, ToolsCapability,
};
use callbridge_mcp_sdk::tool::ToolResult;

use crate::client::WebexClient;
use crate::tools::GatewayTools;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// MCP Server: capability advertisement plus request dispatch.
pub struct McpServer {
    capabilities: ServerCapabilities,
    tools: GatewayTools,
}

impl McpServer {
    pub fn new(client: Arc<WebexClient>) -> Self {
        Self {
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            tools: GatewayTools::new(client),
        }
    }

    /// Handle one JSON-RPC request. Tool failures are rendered as textual
    /// tool results (`isError: true`), never as protocol errors; the host
    /// process must not see a fault for an upstream problem.
    pub async fn dispatch(&self, request: McpRequest) -> McpResponse {
        match request.method.as_str() {
            "initialize" => McpResponse::success(
                request.id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": &self.capabilities,
                    "serverInfo": {
                        "name": "webex-gateway",
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }),
            ),
            "ping" => McpResponse::success(request.id, json!({})),
            "tools/list" => McpResponse::success(
                request.id,
                json!({ "tools": self.tools.list() }),
            ),
            "tools/call" => {
                let params = request.params.unwrap_or(Value::Null);
                let Some(name) = params.get("name").and_then(Value::as_str) else {
                    return McpResponse::error(
                        request.id,
                        error_codes::INVALID_PARAMS,
                        "tools/call requires a tool name",
                    );
                };
                let args = params.get("arguments").cloned().unwrap_or(json!({}));

                let result = match self.tools.execute(name, args).await {
                    Ok(result) => result,
                    Err(e) => ToolResult::error(format!("Error calling {}: {}", name, e)),
                };
                match serde_json::to_value(&result) {
                    Ok(value) => McpResponse::success(request.id, value),
                    Err(e) => McpResponse::error(
                        request.id,
                        error_codes::INTERNAL_ERROR,
                        e.to_string(),
                    ),
                }
            }
            other => McpResponse::error(
                request.id,
                error_codes::METHOD_NOT_FOUND,
                format!("Unknown method: {}", other),
            ),
        }
    }
}

/// Simple ping stream for SSE
struct PingStream {
    interval: tokio::time::Interval,
}

impl PingStream {
    fn new() -> Self {
        Self {
            interval: tokio::time::interval(Duration::from_secs(30)),
        }
    }
}

impl Stream for PingStream {
    type Item = std::result::Result<Event, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match Pin::new(&mut self.interval).poll_tick(cx) {
            Poll::Ready(_) => {
                let event = Event::default()
                    .data(r#"{"jsonrpc":"2.0","method":"ping"}"#)
                    .event("message");
                Poll::Ready(Some(Ok(event)))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// SSE handler for MCP over HTTP
pub async fn sse_handler() -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    Sse::new(PingStream::new()).keep_alive(KeepAlive::default())
}
