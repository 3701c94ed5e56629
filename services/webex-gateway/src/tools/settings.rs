//! Voicemail and webhook tools.

use std::sync::Arc;

use async_trait::async_trait;
use callbridge_mcp_sdk::tool::{Tool, ToolError, ToolResult};
use serde_json::{json, Value};

use crate::client::WebexClient;
use super::{body_from_args, max_results, require_str};

pub(super) fn tools(client: &Arc<WebexClient>) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(GetUserVoicemailSettingsTool { client: client.clone() }),
        Box::new(UpdateUserVoicemailSettingsTool { client: client.clone() }),
        Box::new(ListWebhooksTool { client: client.clone() }),
        Box::new(CreateWebhookTool { client: client.clone() }),
        Box::new(GetWebhookDetailsTool { client: client.clone() }),
        Box::new(UpdateWebhookTool { client: client.clone() }),
        Box::new(DeleteWebhookTool { client: client.clone() }),
    ]
}

struct GetUserVoicemailSettingsTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for GetUserVoicemailSettingsTool {
    fn name(&self) -> &str { "get_user_voicemail_settings" }
    fn description(&self) -> &str { "Get voicemail settings for a user" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "person_id": { "type": "string", "description": "User ID" }
            },
            "required": ["person_id"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let person_id = require_str(&args, "person_id")?;
        let result = self.client.get_user_voicemail_settings(&person_id).await?;
        Ok(ToolResult::json(&result))
    }
}

struct UpdateUserVoicemailSettingsTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for UpdateUserVoicemailSettingsTool {
    fn name(&self) -> &str { "update_user_voicemail_settings" }
    fn description(&self) -> &str { "Update voicemail settings for a user" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "person_id": { "type": "string", "description": "User ID" },
                "enabled": { "type": "boolean", "description": "Enable voicemail" },
                "greeting": { "type": "object", "description": "Greeting configuration" },
                "pin": { "type": "string", "description": "PIN" }
            },
            "required": ["person_id"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let person_id = require_str(&args, "person_id")?;
        let fields = body_from_args(
            &args,
            &[("enabled", "enabled"), ("greeting", "greeting"), ("pin", "pin")],
        );
        let result = self
            .client
            .update_user_voicemail_settings(&person_id, &fields)
            .await?;
        Ok(ToolResult::json(&result))
    }
}

struct ListWebhooksTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for ListWebhooksTool {
    fn name(&self) -> &str { "list_webhooks" }
    fn description(&self) -> &str { "List all webhooks" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "max_results": { "type": "integer", "description": "Maximum number of results to return (default: 100)", "default": 100 }
            },
            "required": []
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let result = self.client.list_webhooks(max_results(&args)).await?;
        Ok(ToolResult::json(&Value::Array(result)))
    }
}

struct CreateWebhookTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for CreateWebhookTool {
    fn name(&self) -> &str { "create_webhook" }
    fn description(&self) -> &str { "Create a webhook" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Webhook name" },
                "target_url": { "type": "string", "description": "Target URL" },
                "resource": { "type": "string", "description": "Resource type" },
                "event": { "type": "string", "description": "Event type" },
                "secret": { "type": "string", "description": "Webhook secret" }
            },
            "required": ["name", "target_url", "resource", "event"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        for key in ["name", "target_url", "resource", "event"] {
            require_str(&args, key)?;
        }
        let fields = body_from_args(
            &args,
            &[
                ("name", "name"),
                ("target_url", "targetUrl"),
                ("resource", "resource"),
                ("event", "event"),
                ("secret", "secret"),
            ],
        );
        let result = self.client.create_webhook(&fields).await?;
        Ok(ToolResult::json(&result))
    }
}

struct GetWebhookDetailsTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for GetWebhookDetailsTool {
    fn name(&self) -> &str { "get_webhook_details" }
    fn description(&self) -> &str { "Get webhook details" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "webhook_id": { "type": "string", "description": "Webhook ID" }
            },
            "required": ["webhook_id"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let webhook_id = require_str(&args, "webhook_id")?;
        let result = self.client.get_webhook_details(&webhook_id).await?;
        Ok(ToolResult::json(&result))
    }
}

struct UpdateWebhookTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for UpdateWebhookTool {
    fn name(&self) -> &str { "update_webhook" }
    fn description(&self) -> &str { "Update a webhook" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "webhook_id": { "type": "string", "description": "Webhook ID" },
                "name": { "type": "string", "description": "Webhook name" },
                "target_url": { "type": "string", "description": "Target URL" },
                "secret": { "type": "string", "description": "Webhook secret" }
            },
            "required": ["webhook_id"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let webhook_id = require_str(&args, "webhook_id")?;
        let fields = body_from_args(
            &args,
            &[("name", "name"), ("target_url", "targetUrl"), ("secret", "secret")],
        );
        let result = self.client.update_webhook(&webhook_id, &fields).await?;
        Ok(ToolResult::json(&result))
    }
}

struct DeleteWebhookTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for DeleteWebhookTool {
    fn name(&self) -> &str { "delete_webhook" }
    fn description(&self) -> &str { "Delete a webhook" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "webhook_id": { "type": "string", "description": "Webhook ID" }
            },
            "required": ["webhook_id"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let webhook_id = require_str(&args, "webhook_id")?;
        self.client.delete_webhook(&webhook_id).await?;
        Ok(ToolResult::text(format!("Webhook {} deleted", webhook_id)))
    }
}
