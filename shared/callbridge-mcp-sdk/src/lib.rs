//! Callbridge MCP SDK
//!
//! Model Context Protocol implementation for exposing telephony operations
//! to LLM hosts over JSON-RPC 2.0.

pub mod protocol;
pub mod tool;
pub mod transport;

pub use protocol::{McpError, McpNotification, McpRequest, McpResponse, RequestId};
pub use tool::{Tool, ToolDefinition, ToolError, ToolResult};
pub use transport::StdioTransport;
