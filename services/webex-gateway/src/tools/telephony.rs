//! Call queue and auto attendant tools.

use std::sync::Arc;

use async_trait::async_trait;
use callbridge_mcp_sdk::tool::{Tool, ToolError, ToolResult};
use serde_json::{json, Value};

use crate::client::WebexClient;
use super::{body_from_args, max_results, optional_str, require_str};

pub(super) fn tools(client: &Arc<WebexClient>) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(ListCallQueuesTool { client: client.clone() }),
        Box::new(GetCallQueueDetailsTool { client: client.clone() }),
        Box::new(CreateCallQueueTool { client: client.clone() }),
        Box::new(UpdateCallQueueTool { client: client.clone() }),
        Box::new(DeleteCallQueueTool { client: client.clone() }),
        Box::new(ListQueueAgentsTool { client: client.clone() }),
        Box::new(AddAgentToQueueTool { client: client.clone() }),
        Box::new(RemoveAgentFromQueueTool { client: client.clone() }),
        Box::new(ListAutoAttendantsTool { client: client.clone() }),
        Box::new(GetAutoAttendantDetailsTool { client: client.clone() }),
    ]
}

struct ListCallQueuesTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for ListCallQueuesTool {
    fn name(&self) -> &str { "list_call_queues" }
    fn description(&self) -> &str { "List all call queues in your organization" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location_id": { "type": "string", "description": "Optional location ID to filter call queues" },
                "max_results": { "type": "integer", "description": "Maximum number of results to return (default: 100)", "default": 100 }
            },
            "required": []
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let result = self
            .client
            .list_call_queues(optional_str(&args, "location_id").as_deref(), max_results(&args))
            .await?;
        Ok(ToolResult::json(&Value::Array(result)))
    }
}

struct GetCallQueueDetailsTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for GetCallQueueDetailsTool {
    fn name(&self) -> &str { "get_call_queue_details" }
    fn description(&self) -> &str { "Get detailed information about a specific call queue" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "queue_id": { "type": "string", "description": "The ID of the call queue" }
            },
            "required": ["queue_id"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let queue_id = require_str(&args, "queue_id")?;
        let result = self.client.get_call_queue_details(&queue_id).await?;
        Ok(ToolResult::json(&result))
    }
}

struct CreateCallQueueTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for CreateCallQueueTool {
    fn name(&self) -> &str { "create_call_queue" }
    fn description(&self) -> &str { "Create a new call queue" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Queue name" },
                "location_id": { "type": "string", "description": "Location ID" },
                "phone_number": { "type": "string", "description": "Phone number" },
                "call_policies": { "type": "object", "description": "Call policies" }
            },
            "required": ["name", "location_id"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        require_str(&args, "name")?;
        let location_id = require_str(&args, "location_id")?;
        let fields = body_from_args(
            &args,
            &[
                ("name", "name"),
                ("phone_number", "phoneNumber"),
                ("call_policies", "callPolicies"),
            ],
        );
        let result = self.client.create_call_queue(&location_id, &fields).await?;
        Ok(ToolResult::json(&result))
    }
}

struct UpdateCallQueueTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for UpdateCallQueueTool {
    fn name(&self) -> &str { "update_call_queue" }
    fn description(&self) -> &str { "Update a call queue" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location_id": { "type": "string", "description": "Location ID" },
                "queue_id": { "type": "string", "description": "Queue ID" },
                "name": { "type": "string", "description": "Queue name" },
                "phone_number": { "type": "string", "description": "Phone number" },
                "call_policies": { "type": "object", "description": "Call policies" }
            },
            "required": ["location_id", "queue_id"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let location_id = require_str(&args, "location_id")?;
        let queue_id = require_str(&args, "queue_id")?;
        let fields = body_from_args(
            &args,
            &[
                ("name", "name"),
                ("phone_number", "phoneNumber"),
                ("call_policies", "callPolicies"),
            ],
        );
        let result = self.client.update_call_queue(&location_id, &queue_id, &fields).await?;
        Ok(ToolResult::json(&result))
    }
}

struct DeleteCallQueueTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for DeleteCallQueueTool {
    fn name(&self) -> &str { "delete_call_queue" }
    fn description(&self) -> &str { "Delete a call queue" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location_id": { "type": "string", "description": "Location ID" },
                "queue_id": { "type": "string", "description": "Queue ID" }
            },
            "required": ["location_id", "queue_id"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let location_id = require_str(&args, "location_id")?;
        let queue_id = require_str(&args, "queue_id")?;
        self.client.delete_call_queue(&location_id, &queue_id).await?;
        Ok(ToolResult::text(format!("Call queue {} deleted", queue_id)))
    }
}

struct ListQueueAgentsTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for ListQueueAgentsTool {
    fn name(&self) -> &str { "list_queue_agents" }
    fn description(&self) -> &str { "List all agents in a call queue" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location_id": { "type": "string", "description": "Location ID" },
                "queue_id": { "type": "string", "description": "Queue ID" }
            },
            "required": ["location_id", "queue_id"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let location_id = require_str(&args, "location_id")?;
        let queue_id = require_str(&args, "queue_id")?;
        let result = self.client.list_queue_agents(&location_id, &queue_id).await?;
        Ok(ToolResult::json(&Value::Array(result)))
    }
}

struct AddAgentToQueueTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for AddAgentToQueueTool {
    fn name(&self) -> &str { "add_agent_to_queue" }
    fn description(&self) -> &str { "Add an agent to a call queue" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location_id": { "type": "string", "description": "Location ID" },
                "queue_id": { "type": "string", "description": "Queue ID" },
                "person_id": { "type": "string", "description": "User ID" }
            },
            "required": ["location_id", "queue_id", "person_id"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let location_id = require_str(&args, "location_id")?;
        let queue_id = require_str(&args, "queue_id")?;
        let person_id = require_str(&args, "person_id")?;
        self.client
            .add_agent_to_queue(&location_id, &queue_id, &person_id)
            .await?;
        Ok(ToolResult::text(format!("Agent {} added to queue {}", person_id, queue_id)))
    }
}

struct RemoveAgentFromQueueTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for RemoveAgentFromQueueTool {
    fn name(&self) -> &str { "remove_agent_from_queue" }
    fn description(&self) -> &str { "Remove an agent from a call queue" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location_id": { "type": "string", "description": "Location ID" },
                "queue_id": { "type": "string", "description": "Queue ID" },
                "person_id": { "type": "string", "description": "User ID" }
            },
            "required": ["location_id", "queue_id", "person_id"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let location_id = require_str(&args, "location_id")?;
        let queue_id = require_str(&args, "queue_id")?;
        let person_id = require_str(&args, "person_id")?;
        self.client
            .remove_agent_from_queue(&location_id, &queue_id, &person_id)
            .await?;
        Ok(ToolResult::text(format!("Agent {} removed from queue {}", person_id, queue_id)))
    }
}

struct ListAutoAttendantsTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for ListAutoAttendantsTool {
    fn name(&self) -> &str { "list_auto_attendants" }
    fn description(&self) -> &str { "List all auto attendants in your organization" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location_id": { "type": "string", "description": "Optional location ID to filter auto attendants" },
                "max_results": { "type": "integer", "description": "Maximum number of results to return (default: 100)", "default": 100 }
            },
            "required": []
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let result = self
            .client
            .list_auto_attendants(optional_str(&args, "location_id").as_deref(), max_results(&args))
            .await?;
        Ok(ToolResult::json(&Value::Array(result)))
    }
}

struct GetAutoAttendantDetailsTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for GetAutoAttendantDetailsTool {
    fn name(&self) -> &str { "get_auto_attendant_details" }
    fn description(&self) -> &str { "Get detailed information about a specific auto attendant" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "auto_attendant_id": { "type": "string", "description": "The ID of the auto attendant" }
            },
            "required": ["auto_attendant_id"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let auto_attendant_id = require_str(&args, "auto_attendant_id")?;
        let result = self.client.get_auto_attendant_details(&auto_attendant_id).await?;
        Ok(ToolResult::json(&result))
    }
}
