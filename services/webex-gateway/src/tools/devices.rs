//! Device, phone number, and license tools.

use std::sync::Arc;

use async_trait::async_trait;
use callbridge_mcp_sdk::tool::{Tool, ToolError, ToolResult};
use serde_json::{json, Value};

use crate::client::WebexClient;
use super::{max_results, optional_str, require_str};

pub(super) fn tools(client: &Arc<WebexClient>) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(ListDevicesTool { client: client.clone() }),
        Box::new(GetDeviceDetailsTool { client: client.clone() }),
        Box::new(ListPhoneNumbersTool { client: client.clone() }),
        Box::new(GetPhoneNumberDetailsTool { client: client.clone() }),
        Box::new(ListLicensesTool { client: client.clone() }),
        Box::new(GetLicenseDetailsTool { client: client.clone() }),
        Box::new(ListUserLicensesTool { client: client.clone() }),
        Box::new(AssignLicenseToUserTool { client: client.clone() }),
        Box::new(RemoveLicenseFromUserTool { client: client.clone() }),
    ]
}

struct ListDevicesTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for ListDevicesTool {
    fn name(&self) -> &str { "list_devices" }
    fn description(&self) -> &str { "List devices in your organization" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "person_id": { "type": "string", "description": "Optional user ID to filter devices" },
                "location_id": { "type": "string", "description": "Optional location ID to filter devices" },
                "max_results": { "type": "integer", "description": "Maximum number of results to return (default: 100)", "default": 100 }
            },
            "required": []
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let result = self
            .client
            .list_devices(
                optional_str(&args, "person_id").as_deref(),
                optional_str(&args, "location_id").as_deref(),
                max_results(&args),
            )
            .await?;
        Ok(ToolResult::json(&Value::Array(result)))
    }
}

struct GetDeviceDetailsTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for GetDeviceDetailsTool {
    fn name(&self) -> &str { "get_device_details" }
    fn description(&self) -> &str { "Get details about a specific device" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "device_id": { "type": "string", "description": "The ID of the device" }
            },
            "required": ["device_id"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let device_id = require_str(&args, "device_id")?;
        let result = self.client.get_device_details(&device_id).await?;
        Ok(ToolResult::json(&result))
    }
}

struct ListPhoneNumbersTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for ListPhoneNumbersTool {
    fn name(&self) -> &str { "list_phone_numbers" }
    fn description(&self) -> &str { "List phone numbers in your organization" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location_id": { "type": "string", "description": "Optional location ID to filter phone numbers" },
                "org_id": { "type": "string", "description": "Optional organization ID to filter phone numbers" },
                "number": { "type": "string", "description": "Optional phone number to search for" },
                "max_results": { "type": "integer", "description": "Maximum number of results to return (default: 100)", "default": 100 }
            },
            "required": []
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let result = self
            .client
            .list_phone_numbers(
                optional_str(&args, "location_id").as_deref(),
                optional_str(&args, "org_id").as_deref(),
                optional_str(&args, "number").as_deref(),
                max_results(&args),
            )
            .await?;
        Ok(ToolResult::json(&Value::Array(result)))
    }
}

struct GetPhoneNumberDetailsTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for GetPhoneNumberDetailsTool {
    fn name(&self) -> &str { "get_phone_number_details" }
    fn description(&self) -> &str { "Get details about a specific phone number" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "number_id": { "type": "string", "description": "The ID of the phone number" }
            },
            "required": ["number_id"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let number_id = require_str(&args, "number_id")?;
        let result = self.client.get_phone_number_details(&number_id).await?;
        Ok(ToolResult::json(&result))
    }
}

struct ListLicensesTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for ListLicensesTool {
    fn name(&self) -> &str { "list_licenses" }
    fn description(&self) -> &str { "List all licenses in your organization" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "org_id": { "type": "string", "description": "Optional organization ID to filter licenses" },
                "max_results": { "type": "integer", "description": "Maximum number of results to return (default: 100)", "default": 100 }
            },
            "required": []
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let result = self
            .client
            .list_licenses(optional_str(&args, "org_id").as_deref(), max_results(&args))
            .await?;
        Ok(ToolResult::json(&Value::Array(result)))
    }
}

struct GetLicenseDetailsTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for GetLicenseDetailsTool {
    fn name(&self) -> &str { "get_license_details" }
    fn description(&self) -> &str { "Get details about a specific license" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "license_id": { "type": "string", "description": "The ID of the license" }
            },
            "required": ["license_id"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let license_id = require_str(&args, "license_id")?;
        let result = self.client.get_license_details(&license_id).await?;
        Ok(ToolResult::json(&result))
    }
}

struct ListUserLicensesTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for ListUserLicensesTool {
    fn name(&self) -> &str { "list_user_licenses" }
    fn description(&self) -> &str { "List licenses assigned to a user" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "person_id": { "type": "string", "description": "The ID of the user" }
            },
            "required": ["person_id"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let person_id = require_str(&args, "person_id")?;
        let result = self.client.list_user_licenses(&person_id).await?;
        Ok(ToolResult::json(&Value::Array(result)))
    }
}

struct AssignLicenseToUserTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for AssignLicenseToUserTool {
    fn name(&self) -> &str { "assign_license_to_user" }
    fn description(&self) -> &str { "Assign a license to a user" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "person_id": { "type": "string", "description": "The ID of the user" },
                "license_id": { "type": "string", "description": "The ID of the license to assign" }
            },
            "required": ["person_id", "license_id"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let person_id = require_str(&args, "person_id")?;
        let license_id = require_str(&args, "license_id")?;
        let result = self.client.assign_license_to_user(&person_id, &license_id).await?;
        Ok(ToolResult::json(&result))
    }
}

struct RemoveLicenseFromUserTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for RemoveLicenseFromUserTool {
    fn name(&self) -> &str { "remove_license_from_user" }
    fn description(&self) -> &str { "Remove a license from a user" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "person_id": { "type": "string", "description": "The ID of the user" },
                "license_id": { "type": "string", "description": "The ID of the license to remove" }
            },
            "required": ["person_id", "license_id"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let person_id = require_str(&args, "person_id")?;
        let license_id = require_str(&args, "license_id")?;
        let result = self.client.remove_license_from_user(&person_id, &license_id).await?;
        Ok(ToolResult::json(&result))
    }
}
