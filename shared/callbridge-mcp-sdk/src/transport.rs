//! MCP Transport layer
//!
//! Newline-delimited JSON-RPC over stdio. Stdout carries protocol frames
//! only; anything the service wants to log must go to stderr.

use std::future::Future;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use crate::protocol::{error_codes, McpNotification, McpRequest, McpResponse, RequestId};

/// Stdio transport: reads one JSON-RPC message per line, dispatches
/// requests to the handler, and writes one response per line.
pub struct StdioTransport;

impl StdioTransport {
    /// Serve until stdin reaches EOF. Notifications (messages without an
    /// id) are consumed without a reply.
    pub async fn serve<F, Fut>(handler: F) -> std::io::Result<()>
    where
        F: Fn(McpRequest) -> Fut,
        Fut: Future<Output = McpResponse>,
    {
        let stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        let mut lines = stdin.lines();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<McpRequest>(line) {
                Ok(request) => {
                    debug!(method = %request.method, "Dispatching MCP request");
                    handler(request).await
                }
                Err(_) => {
                    // A message without an id is a notification, not an error.
                    if serde_json::from_str::<McpNotification>(line).is_ok() {
                        debug!("Ignoring MCP notification");
                        continue;
                    }
                    warn!("Unparseable MCP message on stdin");
                    McpResponse::error(RequestId::Null, error_codes::PARSE_ERROR, "Parse error")
                }
            };

            let mut frame = serde_json::to_vec(&response)?;
            frame.push(b'\n');
            stdout.write_all(&frame).await?;
            stdout.flush().await?;
        }

        Ok(())
    }
}
