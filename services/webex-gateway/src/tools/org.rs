//! Organization and location tools.

use std::sync::Arc;

use async_trait::async_trait;
use callbridge_mcp_sdk::tool::{Tool, ToolError, ToolResult};
use serde_json::{json, Value};

use crate::client::WebexClient;
use super::{body_from_args, max_results, optional_str, require_str};

pub(super) fn tools(client: &Arc<WebexClient>) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(GetOrganizationInfoTool { client: client.clone() }),
        Box::new(GetMyInfoTool { client: client.clone() }),
        Box::new(ListLocationsTool { client: client.clone() }),
        Box::new(GetLocationDetailsTool { client: client.clone() }),
        Box::new(CreateLocationTool { client: client.clone() }),
        Box::new(UpdateLocationTool { client: client.clone() }),
        Box::new(DeleteLocationTool { client: client.clone() }),
    ]
}

struct GetOrganizationInfoTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for GetOrganizationInfoTool {
    fn name(&self) -> &str { "get_organization_info" }
    fn description(&self) -> &str { "Get information about your Webex organization" }
    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {}, "required": [] })
    }
    async fn execute(&self, _args: Value) -> Result<ToolResult, ToolError> {
        let result = self.client.get_organization_info().await?;
        Ok(ToolResult::json(&result))
    }
}

struct GetMyInfoTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for GetMyInfoTool {
    fn name(&self) -> &str { "get_my_info" }
    fn description(&self) -> &str { "Get information about the authenticated user" }
    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {}, "required": [] })
    }
    async fn execute(&self, _args: Value) -> Result<ToolResult, ToolError> {
        let result = self.client.get_my_info().await?;
        Ok(ToolResult::json(&result))
    }
}

struct ListLocationsTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for ListLocationsTool {
    fn name(&self) -> &str { "list_locations" }
    fn description(&self) -> &str { "List all locations in your Webex organization" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "org_id": { "type": "string", "description": "Optional organization ID to filter locations" },
                "max_results": { "type": "integer", "description": "Maximum number of results to return (default: 100)", "default": 100 }
            },
            "required": []
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let result = self
            .client
            .list_locations(optional_str(&args, "org_id").as_deref(), max_results(&args))
            .await?;
        Ok(ToolResult::json(&Value::Array(result)))
    }
}

struct GetLocationDetailsTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for GetLocationDetailsTool {
    fn name(&self) -> &str { "get_location_details" }
    fn description(&self) -> &str { "Get detailed information about a specific location" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location_id": { "type": "string", "description": "The ID of the location" }
            },
            "required": ["location_id"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let location_id = require_str(&args, "location_id")?;
        let result = self.client.get_location_details(&location_id).await?;
        Ok(ToolResult::json(&result))
    }
}

struct CreateLocationTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for CreateLocationTool {
    fn name(&self) -> &str { "create_location" }
    fn description(&self) -> &str { "Create a new location" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Location name" },
                "address": { "type": "object", "description": "Address object" },
                "org_id": { "type": "string", "description": "Organization ID" }
            },
            "required": ["name", "address"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let name = require_str(&args, "name")?;
        let address = args
            .get("address")
            .cloned()
            .ok_or_else(|| ToolError::InvalidInput("address is required".to_string()))?;
        let result = self
            .client
            .create_location(&name, &address, optional_str(&args, "org_id").as_deref())
            .await?;
        Ok(ToolResult::json(&result))
    }
}

struct UpdateLocationTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for UpdateLocationTool {
    fn name(&self) -> &str { "update_location" }
    fn description(&self) -> &str { "Update a location" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location_id": { "type": "string", "description": "Location ID" },
                "name": { "type": "string", "description": "Location name" },
                "address": { "type": "object", "description": "Address object" }
            },
            "required": ["location_id"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let location_id = require_str(&args, "location_id")?;
        let fields = body_from_args(&args, &[("name", "name"), ("address", "address")]);
        let result = self.client.update_location(&location_id, &fields).await?;
        Ok(ToolResult::json(&result))
    }
}

struct DeleteLocationTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for DeleteLocationTool {
    fn name(&self) -> &str { "delete_location" }
    fn description(&self) -> &str { "Delete a location" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location_id": { "type": "string", "description": "Location ID" }
            },
            "required": ["location_id"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let location_id = require_str(&args, "location_id")?;
        self.client.delete_location(&location_id).await?;
        Ok(ToolResult::text(format!("Location {} deleted", location_id)))
    }
}
