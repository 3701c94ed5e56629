//! User management tools.

use std::sync::Arc;

use async_trait::async_trait;
use callbridge_mcp_sdk::tool::{Tool, ToolError, ToolResult};
use serde_json::{json, Value};

use crate::client::WebexClient;
use super::{body_from_args, max_results, optional_str, require_str};

pub(super) fn tools(client: &Arc<WebexClient>) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(ListUsersTool { client: client.clone() }),
        Box::new(GetUserDetailsTool { client: client.clone() }),
        Box::new(GetUserByEmailTool { client: client.clone() }),
        Box::new(SearchUsersTool { client: client.clone() }),
        Box::new(CreateUserTool { client: client.clone() }),
        Box::new(UpdateUserTool { client: client.clone() }),
        Box::new(DeleteUserTool { client: client.clone() }),
        Box::new(GetUserCallingSettingsTool { client: client.clone() }),
    ]
}

struct ListUsersTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for ListUsersTool {
    fn name(&self) -> &str { "list_users" }
    fn description(&self) -> &str { "List users in your Webex organization" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "org_id": { "type": "string", "description": "Optional organization ID to filter users" },
                "location_id": { "type": "string", "description": "Optional location ID to filter users" },
                "max_results": { "type": "integer", "description": "Maximum number of results to return (default: 100)", "default": 100 }
            },
            "required": []
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let result = self
            .client
            .list_users(
                optional_str(&args, "org_id").as_deref(),
                optional_str(&args, "location_id").as_deref(),
                max_results(&args),
            )
            .await?;
        Ok(ToolResult::json(&Value::Array(result)))
    }
}

struct GetUserDetailsTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for GetUserDetailsTool {
    fn name(&self) -> &str { "get_user_details" }
    fn description(&self) -> &str { "Get detailed information about a specific user by ID" }
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
        let result = self.client.get_user_details(&person_id).await?;
        Ok(ToolResult::json(&result))
    }
}

struct GetUserByEmailTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for GetUserByEmailTool {
    fn name(&self) -> &str { "get_user_by_email" }
    fn description(&self) -> &str { "Get user information by email address" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "email": { "type": "string", "description": "The email address of the user" }
            },
            "required": ["email"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let email = require_str(&args, "email")?;
        match self.client.get_user_by_email(&email).await? {
            Some(user) => Ok(ToolResult::json(&user)),
            None => Ok(ToolResult::text(format!("User with email {} not found", email))),
        }
    }
}

struct SearchUsersTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for SearchUsersTool {
    fn name(&self) -> &str { "search_users" }
    fn description(&self) -> &str { "Search for users by display name or email address" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Search query (display name or email)" },
                "org_id": { "type": "string", "description": "Optional organization ID to filter search" },
                "max_results": { "type": "integer", "description": "Maximum number of results to return (default: 100)", "default": 100 }
            },
            "required": ["query"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let query = require_str(&args, "query")?;
        let result = self
            .client
            .search_users(&query, optional_str(&args, "org_id").as_deref(), max_results(&args))
            .await?;
        Ok(ToolResult::json(&Value::Array(result)))
    }
}

struct CreateUserTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for CreateUserTool {
    fn name(&self) -> &str { "create_user" }
    fn description(&self) -> &str { "Create a new user" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "emails": { "type": "array", "items": { "type": "string" }, "description": "User email addresses" },
                "display_name": { "type": "string", "description": "Display name" },
                "first_name": { "type": "string", "description": "First name" },
                "last_name": { "type": "string", "description": "Last name" },
                "org_id": { "type": "string", "description": "Organization ID" },
                "location_id": { "type": "string", "description": "Location ID" }
            },
            "required": ["emails", "display_name"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        if args.get("emails").and_then(Value::as_array).is_none() {
            return Err(ToolError::InvalidInput("emails is required".to_string()));
        }
        require_str(&args, "display_name")?;
        let fields = body_from_args(
            &args,
            &[
                ("emails", "emails"),
                ("display_name", "displayName"),
                ("first_name", "firstName"),
                ("last_name", "lastName"),
                ("org_id", "orgId"),
                ("location_id", "locationId"),
            ],
        );
        let result = self.client.create_user(&fields).await?;
        Ok(ToolResult::json(&result))
    }
}

struct UpdateUserTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for UpdateUserTool {
    fn name(&self) -> &str { "update_user" }
    fn description(&self) -> &str { "Update a user" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "person_id": { "type": "string", "description": "User ID" },
                "display_name": { "type": "string", "description": "Display name" },
                "first_name": { "type": "string", "description": "First name" },
                "last_name": { "type": "string", "description": "Last name" },
                "emails": { "type": "array", "items": { "type": "string" }, "description": "Email addresses" },
                "location_id": { "type": "string", "description": "Location ID" }
            },
            "required": ["person_id"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let person_id = require_str(&args, "person_id")?;
        let fields = body_from_args(
            &args,
            &[
                ("display_name", "displayName"),
                ("first_name", "firstName"),
                ("last_name", "lastName"),
                ("emails", "emails"),
                ("location_id", "locationId"),
            ],
        );
        let result = self.client.update_user(&person_id, &fields).await?;
        Ok(ToolResult::json(&result))
    }
}

struct DeleteUserTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for DeleteUserTool {
    fn name(&self) -> &str { "delete_user" }
    fn description(&self) -> &str { "Delete a user" }
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
        self.client.delete_user(&person_id).await?;
        Ok(ToolResult::text(format!("User {} deleted", person_id)))
    }
}

struct GetUserCallingSettingsTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for GetUserCallingSettingsTool {
    fn name(&self) -> &str { "get_user_calling_settings" }
    fn description(&self) -> &str { "Get calling settings for a specific user" }
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
        let result = self.client.get_user_calling_settings(&person_id).await?;
        Ok(ToolResult::json(&result))
    }
}
