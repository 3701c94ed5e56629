//! Webex MCP tools
//!
//! One tool per management operation, grouped by domain. Every tool replies
//! with text (pretty JSON or a human-readable message); client errors are
//! mapped to `ToolError` and rendered as text by the dispatch layer.

mod devices;
mod org;
mod reporting;
mod settings;
mod telephony;
mod users;

use std::sync::Arc;

use callbridge_mcp_sdk::tool::{Tool, ToolDefinition, ToolError, ToolResult};
use serde_json::Value;

use crate::client::WebexClient;

/// Collection of Webex MCP tools
pub struct GatewayTools {
    tools: Vec<Box<dyn Tool>>,
}

impl GatewayTools {
    pub fn new(client: Arc<WebexClient>) -> Self {
        let mut tools: Vec<Box<dyn Tool>> = Vec::new();
        tools.extend(org::tools(&client));
        tools.extend(users::tools(&client));
        tools.extend(telephony::tools(&client));
        tools.extend(devices::tools(&client));
        tools.extend(reporting::tools(&client));
        tools.extend(settings::tools(&client));
        Self { tools }
    }

    pub fn list(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| ToolDefinition::from(t.as_ref())).collect()
    }

    pub async fn execute(&self, name: &str, args: Value) -> Result<ToolResult, ToolError> {
        for tool in &self.tools {
            if tool.name() == name {
                return tool.execute(args).await;
            }
        }
        Err(ToolError::NotFound(name.to_string()))
    }
}

// Argument extraction helpers shared by the tool implementations.

pub(crate) fn require_str(args: &Value, key: &str) -> Result<String, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ToolError::InvalidInput(format!("{} is required", key)))
}

pub(crate) fn optional_str(args: &Value, key: &str) -> Option<String> {
    args.get(key).and_then(Value::as_str).map(str::to_string)
}

pub(crate) fn max_results(args: &Value) -> u32 {
    args.get("max_results").and_then(Value::as_u64).unwrap_or(100) as u32
}

/// Copy the given keys into a JSON object, skipping absent ones. Used for
/// partial-update bodies where only supplied fields should be forwarded.
pub(crate) fn body_from_args(args: &Value, keys: &[(&str, &str)]) -> Value {
    let mut body = serde_json::Map::new();
    for (arg_key, wire_key) in keys {
        if let Some(value) = args.get(*arg_key) {
            if !value.is_null() {
                body.insert(wire_key.to_string(), value.clone());
            }
        }
    }
    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn body_from_args_skips_absent_and_null_fields() {
        let args = json!({"display_name": "Ada", "first_name": null, "extra": 1});
        let body = body_from_args(
            &args,
            &[("display_name", "displayName"), ("first_name", "firstName")],
        );
        assert_eq!(body, json!({"displayName": "Ada"}));
    }

    #[test]
    fn max_results_defaults_to_100() {
        assert_eq!(max_results(&json!({})), 100);
        assert_eq!(max_results(&json!({"max_results": 25})), 25);
    }
}
