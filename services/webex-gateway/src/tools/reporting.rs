//! Reporting and analytics tools: call history, the CDR feed, and the
//! PSTN-minute rollup built on top of it.

use std::sync::Arc;

use async_trait::async_trait;
use callbridge_mcp_sdk::tool::{Tool, ToolError, ToolResult};
use serde_json::{json, Value};

use crate::area_codes;
use crate::cdr::{time::TimeSpec, CdrQuery};
use crate::client::WebexClient;
use super::{max_results, optional_str, require_str};

pub(super) fn tools(client: &Arc<WebexClient>) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(GetCallHistoryTool { client: client.clone() }),
        Box::new(GetCallDetailRecordsTool { client: client.clone() }),
        Box::new(GetPstnMinutesTool { client: client.clone() }),
        Box::new(LookupAreaCodeTool),
    ]
}

fn cdr_query_from_args(args: &Value) -> CdrQuery {
    CdrQuery {
        start_time: optional_str(args, "start_time").map(TimeSpec::from),
        end_time: optional_str(args, "end_time").map(TimeSpec::from),
        person_id: optional_str(args, "person_id"),
        location_id: optional_str(args, "location_id"),
        max_results: max_results(args),
    }
}

struct GetCallHistoryTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for GetCallHistoryTool {
    fn name(&self) -> &str { "get_call_history" }
    fn description(&self) -> &str { "Get call history for a user or location" }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "person_id": { "type": "string", "description": "Optional user ID to filter call history" },
                "location_id": { "type": "string", "description": "Optional location ID to filter call history" },
                "start_time": { "type": "string", "description": "Optional start time in ISO 8601 format (e.g., 2024-01-01T00:00:00Z)" },
                "end_time": { "type": "string", "description": "Optional end time in ISO 8601 format (e.g., 2024-01-31T23:59:59Z)" },
                "max_results": { "type": "integer", "description": "Maximum number of results to return (default: 100)", "default": 100 }
            },
            "required": []
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        let result = self
            .client
            .get_call_history(
                optional_str(&args, "person_id").as_deref(),
                optional_str(&args, "location_id").as_deref(),
                optional_str(&args, "start_time").as_deref(),
                optional_str(&args, "end_time").as_deref(),
                max_results(&args),
            )
            .await?;
        Ok(ToolResult::json(&Value::Array(result)))
    }
}

struct GetCallDetailRecordsTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for GetCallDetailRecordsTool {
    fn name(&self) -> &str { "get_call_detail_records" }
    fn description(&self) -> &str {
        "Get call detail records (CDRs) for reporting. The analytics feed only serves windows \
         between 5 minutes and 48 hours in the past"
    }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "start_time": { "type": "string", "description": "Start time in ISO 8601 format (e.g., 2024-01-01T00:00:00Z)" },
                "end_time": { "type": "string", "description": "End time in ISO 8601 format (e.g., 2024-01-31T23:59:59Z)" },
                "person_id": { "type": "string", "description": "Optional user ID to filter records" },
                "location_id": { "type": "string", "description": "Optional location ID to filter records" },
                "max_results": { "type": "integer", "description": "Maximum number of results to return (default: 100)", "default": 100 }
            },
            "required": ["start_time", "end_time"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        require_str(&args, "start_time")?;
        require_str(&args, "end_time")?;
        let query = cdr_query_from_args(&args);
        let records = self.client.get_call_detail_records(&query).await?;
        let records: Vec<Value> = records.into_iter().map(Value::Object).collect();
        Ok(ToolResult::json(&Value::Array(records)))
    }
}

struct GetPstnMinutesTool {
    client: Arc<WebexClient>,
}

#[async_trait]
impl Tool for GetPstnMinutesTool {
    fn name(&self) -> &str { "get_pstn_minutes" }
    fn description(&self) -> &str {
        "Calculate total PSTN (external) call minutes from call detail records for a time window"
    }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "start_time": { "type": "string", "description": "Start time in ISO 8601 format (e.g., 2024-01-01T00:00:00Z)" },
                "end_time": { "type": "string", "description": "End time in ISO 8601 format (e.g., 2024-01-31T23:59:59Z)" },
                "person_id": { "type": "string", "description": "Optional user ID to filter records" },
                "location_id": { "type": "string", "description": "Optional location ID to filter records" }
            },
            "required": ["start_time", "end_time"]
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        require_str(&args, "start_time")?;
        require_str(&args, "end_time")?;
        let query = cdr_query_from_args(&args);
        let summary = self.client.get_pstn_minutes(&query).await?;
        let summary = serde_json::to_value(&summary)
            .map_err(|e| ToolError::Internal(e.to_string()))?;
        Ok(ToolResult::json(&summary))
    }
}

struct LookupAreaCodeTool;

#[async_trait]
impl Tool for LookupAreaCodeTool {
    fn name(&self) -> &str { "lookup_area_code" }
    fn description(&self) -> &str {
        "Look up the US state for a NANP area code or phone number"
    }
    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "area_code": { "type": "string", "description": "Three-digit area code" },
                "number": { "type": "string", "description": "Full phone number (E.164 or 10-digit)" }
            },
            "required": []
        })
    }
    async fn execute(&self, args: Value) -> Result<ToolResult, ToolError> {
        if let Some(code) = optional_str(&args, "area_code") {
            return Ok(match area_codes::state_for_area_code(&code) {
                Some(state) => ToolResult::json(&json!({ "areaCode": code, "state": state })),
                None => ToolResult::text(format!("Area code {} not found", code)),
            });
        }
        if let Some(number) = optional_str(&args, "number") {
            return Ok(match area_codes::state_for_number(&number) {
                Some(state) => ToolResult::json(&json!({ "number": number, "state": state })),
                None => ToolResult::text(format!("No state mapping for number {}", number)),
            });
        }
        Err(ToolError::InvalidInput(
            "either area_code or number is required".to_string(),
        ))
    }
}
