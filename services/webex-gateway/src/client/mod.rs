//! Webex API client.
//!
//! Thin async client over the Webex REST surface. Two endpoint roots are in
//! play: the primary API (`https://webexapis.com/v1`) for the management
//! surface, and the analytics root (`https://analytics.webexapis.com/v1`)
//! for the CDR feed. The analytics root is passed explicitly per call;
//! the primary base URL is never mutated, so concurrent requests on one
//! client are safe.

pub mod error;
pub mod oauth;

use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};
use tracing::debug;

pub use error::{Result, WebexError};

const FORBIDDEN_HINT: &str =
    "The token lacks the required admin role; detailed call history additionally requires the \
     'Webex Calling Detailed Call History API access' role assigned by an administrator";
const NOT_FOUND_HINT: &str =
    "The endpoint may not be available for this organization; check that Webex Calling is enabled \
     and the resource id is correct";

/// Substrings that mark an HTTP 400 as a malformed-input rejection, i.e.
/// one that a different parameter shape may get past. Used only as a
/// fallback when the structured error body gives nothing to go on.
const MALFORMED_INPUT_MARKERS: &[&str] = &["invalid", "malformed", "unable to parse", "bad request"];

/// Construction options for [`WebexClient`].
#[derive(Debug, Clone)]
pub struct WebexClientOptions {
    pub access_token: String,
    pub base_url: String,
    pub analytics_base_url: String,
    pub request_timeout_secs: u64,
    /// See `cdr::time::canonicalize`.
    pub pad_zero_millis: bool,
}

impl Default for WebexClientOptions {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            base_url: "https://webexapis.com/v1".to_string(),
            analytics_base_url: "https://analytics.webexapis.com/v1".to_string(),
            request_timeout_secs: 30,
            pad_zero_millis: true,
        }
    }
}

/// Client for the Webex management and analytics APIs.
pub struct WebexClient {
    http: Client,
    base_url: String,
    analytics_base_url: String,
    access_token: String,
    pub(crate) pad_zero_millis: bool,
}

impl WebexClient {
    pub fn new(options: WebexClientOptions) -> Self {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(options.request_timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: options.base_url,
            analytics_base_url: options.analytics_base_url,
            access_token: options.access_token,
            pad_zero_millis: options.pad_zero_millis,
        }
    }

    /// Configured primary endpoint root.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Configured analytics endpoint root.
    pub fn analytics_base_url(&self) -> &str {
        &self.analytics_base_url
    }

    async fn request(
        &self,
        method: Method,
        url: String,
        params: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        debug!(method = %method, url = %url, "Webex API request");

        let mut request = self
            .http
            .request(method, &url)
            .bearer_auth(&self.access_token)
            .header("Content-Type", "application/json");
        if !params.is_empty() {
            request = request.query(params);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            if text.trim().is_empty() {
                // DELETE and some PUTs reply 204 with no body.
                return Ok(Value::Null);
            }
            return serde_json::from_str(&text).map_err(|e| WebexError::UnexpectedStatus {
                status: status.as_u16(),
                body: format!("unparseable body: {}", e),
            });
        }

        Err(Self::error_for_status(status, text))
    }

    /// Map a non-success status to the error taxonomy. 400 retryability is
    /// decided from the structured Webex error body (`message`,
    /// `errors[].description`), falling back to raw-text matching.
    fn error_for_status(status: StatusCode, body: String) -> WebexError {
        let detail = upstream_detail(&body);
        match status.as_u16() {
            400 => WebexError::Rejected {
                retryable: indicates_malformed_input(&body),
                message: detail,
            },
            401 => WebexError::Auth { detail },
            403 => WebexError::Forbidden {
                detail,
                hint: FORBIDDEN_HINT,
            },
            404 => WebexError::NotFound {
                detail,
                hint: NOT_FOUND_HINT,
            },
            429 => WebexError::RateLimited { detail },
            code => WebexError::UnexpectedStatus { status: code, body: detail },
        }
    }

    pub(crate) async fn get(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value> {
        self.request(Method::GET, format!("{}{}", self.base_url, endpoint), params, None)
            .await
    }

    /// GET against the analytics root. The root is part of the call, not
    /// client state.
    pub(crate) async fn analytics_get(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Value> {
        self.request(
            Method::GET,
            format!("{}{}", self.analytics_base_url, endpoint),
            params,
            None,
        )
        .await
    }

    pub(crate) async fn post(&self, endpoint: &str, body: &Value) -> Result<Value> {
        self.request(Method::POST, format!("{}{}", self.base_url, endpoint), &[], Some(body))
            .await
    }

    pub(crate) async fn put(&self, endpoint: &str, body: &Value) -> Result<Value> {
        self.request(Method::PUT, format!("{}{}", self.base_url, endpoint), &[], Some(body))
            .await
    }

    pub(crate) async fn patch(&self, endpoint: &str, body: &Value) -> Result<Value> {
        self.request(Method::PATCH, format!("{}{}", self.base_url, endpoint), &[], Some(body))
            .await
    }

    pub(crate) async fn delete(&self, endpoint: &str) -> Result<Value> {
        self.request(Method::DELETE, format!("{}{}", self.base_url, endpoint), &[], None)
            .await
    }
}

/// Pull the human-readable message out of a Webex error body.
fn upstream_detail(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<Value>(body) {
        if let Some(message) = parsed.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no response body".to_string()
    } else {
        trimmed.chars().take(300).collect()
    }
}

fn indicates_malformed_input(body: &str) -> bool {
    let mut texts: Vec<String> = Vec::new();
    if let Ok(parsed) = serde_json::from_str::<Value>(body) {
        if let Some(message) = parsed.get("message").and_then(Value::as_str) {
            texts.push(message.to_lowercase());
        }
        if let Some(errors) = parsed.get("errors").and_then(Value::as_array) {
            for err in errors {
                if let Some(desc) = err.get("description").and_then(Value::as_str) {
                    texts.push(desc.to_lowercase());
                }
            }
        }
    }
    if texts.is_empty() {
        texts.push(body.to_lowercase());
    }
    texts
        .iter()
        .any(|t| MALFORMED_INPUT_MARKERS.iter().any(|m| t.contains(m)))
}

/// Unwrap the standard `{"items": [...]}` list envelope.
fn items(value: Value) -> Vec<Value> {
    match value {
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

fn max_param(max_results: u32) -> (&'static str, String) {
    ("max", max_results.to_string())
}

// Management surface: uniform REST proxies.
impl WebexClient {
    pub async fn get_organization_info(&self) -> Result<Value> {
        self.get("/organizations", &[]).await
    }

    pub async fn get_my_info(&self) -> Result<Value> {
        self.get("/people/me", &[]).await
    }

    pub async fn list_locations(&self, org_id: Option<&str>, max_results: u32) -> Result<Vec<Value>> {
        let mut params = vec![max_param(max_results)];
        if let Some(org_id) = org_id {
            params.push(("orgId", org_id.to_string()));
        }
        Ok(items(self.get("/locations", &params).await?))
    }

    pub async fn get_location_details(&self, location_id: &str) -> Result<Value> {
        self.get(&format!("/locations/{}", location_id), &[]).await
    }

    pub async fn create_location(
        &self,
        name: &str,
        address: &Value,
        org_id: Option<&str>,
    ) -> Result<Value> {
        let mut body = json!({ "name": name, "address": address });
        if let Some(org_id) = org_id {
            body["orgId"] = json!(org_id);
        }
        self.post("/locations", &body).await
    }

    pub async fn update_location(&self, location_id: &str, fields: &Value) -> Result<Value> {
        self.put(&format!("/locations/{}", location_id), fields).await
    }

    pub async fn delete_location(&self, location_id: &str) -> Result<Value> {
        self.delete(&format!("/locations/{}", location_id)).await
    }

    pub async fn list_users(
        &self,
        org_id: Option<&str>,
        location_id: Option<&str>,
        max_results: u32,
    ) -> Result<Vec<Value>> {
        let mut params = vec![max_param(max_results)];
        if let Some(org_id) = org_id {
            params.push(("orgId", org_id.to_string()));
        }
        if let Some(location_id) = location_id {
            params.push(("locationId", location_id.to_string()));
        }
        Ok(items(self.get("/people", &params).await?))
    }

    pub async fn get_user_details(&self, person_id: &str) -> Result<Value> {
        self.get(&format!("/people/{}", person_id), &[]).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<Value>> {
        let params = vec![("email", email.to_string())];
        let mut found = items(self.get("/people", &params).await?);
        if found.is_empty() {
            Ok(None)
        } else {
            Ok(Some(found.remove(0)))
        }
    }

    /// Search by display name and by email, deduplicated by id. The People
    /// API has no single fuzzy-search parameter, so both probes run.
    pub async fn search_users(
        &self,
        query: &str,
        org_id: Option<&str>,
        max_results: u32,
    ) -> Result<Vec<Value>> {
        let mut by_name = vec![("displayName", query.to_string()), max_param(max_results)];
        if let Some(org_id) = org_id {
            by_name.push(("orgId", org_id.to_string()));
        }
        let by_email = vec![("email", query.to_string()), max_param(max_results)];

        let mut results: Vec<Value> = Vec::new();
        let mut seen: Vec<String> = Vec::new();
        for batch in [
            items(self.get("/people", &by_name).await?),
            items(self.get("/people", &by_email).await?),
        ] {
            for person in batch {
                let id = person
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                if !seen.contains(&id) {
                    seen.push(id);
                    results.push(person);
                }
            }
        }
        Ok(results)
    }

    pub async fn create_user(&self, fields: &Value) -> Result<Value> {
        self.post("/people", fields).await
    }

    pub async fn update_user(&self, person_id: &str, fields: &Value) -> Result<Value> {
        self.put(&format!("/people/{}", person_id), fields).await
    }

    pub async fn delete_user(&self, person_id: &str) -> Result<Value> {
        self.delete(&format!("/people/{}", person_id)).await
    }

    pub async fn get_user_calling_settings(&self, person_id: &str) -> Result<Value> {
        self.get(&format!("/telephony/config/people/{}", person_id), &[])
            .await
    }

    pub async fn list_call_queues(
        &self,
        location_id: Option<&str>,
        max_results: u32,
    ) -> Result<Vec<Value>> {
        let mut params = vec![max_param(max_results)];
        if let Some(location_id) = location_id {
            params.push(("locationId", location_id.to_string()));
        }
        Ok(items(self.get("/telephony/config/queues", &params).await?))
    }

    pub async fn get_call_queue_details(&self, queue_id: &str) -> Result<Value> {
        self.get(&format!("/telephony/config/queues/{}", queue_id), &[])
            .await
    }

    pub async fn create_call_queue(&self, location_id: &str, fields: &Value) -> Result<Value> {
        self.post(
            &format!("/telephony/config/locations/{}/queues", location_id),
            fields,
        )
        .await
    }

    pub async fn update_call_queue(
        &self,
        location_id: &str,
        queue_id: &str,
        fields: &Value,
    ) -> Result<Value> {
        self.put(
            &format!("/telephony/config/locations/{}/queues/{}", location_id, queue_id),
            fields,
        )
        .await
    }

    pub async fn delete_call_queue(&self, location_id: &str, queue_id: &str) -> Result<Value> {
        self.delete(&format!(
            "/telephony/config/locations/{}/queues/{}",
            location_id, queue_id
        ))
        .await
    }

    async fn get_location_queue(&self, location_id: &str, queue_id: &str) -> Result<Value> {
        self.get(
            &format!("/telephony/config/locations/{}/queues/{}", location_id, queue_id),
            &[],
        )
        .await
    }

    pub async fn list_queue_agents(&self, location_id: &str, queue_id: &str) -> Result<Vec<Value>> {
        let queue = self.get_location_queue(location_id, queue_id).await?;
        Ok(queue
            .get("agents")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    /// Queue membership has no per-agent endpoint upstream; both mutations
    /// are read-modify-write on the queue's agent list.
    pub async fn add_agent_to_queue(
        &self,
        location_id: &str,
        queue_id: &str,
        person_id: &str,
    ) -> Result<Value> {
        let mut agents = self.list_queue_agents(location_id, queue_id).await?;
        let already_present = agents
            .iter()
            .any(|a| a.get("id").and_then(Value::as_str) == Some(person_id));
        if !already_present {
            agents.push(json!({ "id": person_id }));
        }
        self.update_call_queue(location_id, queue_id, &json!({ "agents": agents }))
            .await
    }

    pub async fn remove_agent_from_queue(
        &self,
        location_id: &str,
        queue_id: &str,
        person_id: &str,
    ) -> Result<Value> {
        let mut agents = self.list_queue_agents(location_id, queue_id).await?;
        agents.retain(|a| a.get("id").and_then(Value::as_str) != Some(person_id));
        self.update_call_queue(location_id, queue_id, &json!({ "agents": agents }))
            .await
    }

    pub async fn list_auto_attendants(
        &self,
        location_id: Option<&str>,
        max_results: u32,
    ) -> Result<Vec<Value>> {
        let mut params = vec![max_param(max_results)];
        if let Some(location_id) = location_id {
            params.push(("locationId", location_id.to_string()));
        }
        Ok(items(self.get("/telephony/config/autoAttendants", &params).await?))
    }

    pub async fn get_auto_attendant_details(&self, auto_attendant_id: &str) -> Result<Value> {
        self.get(
            &format!("/telephony/config/autoAttendants/{}", auto_attendant_id),
            &[],
        )
        .await
    }

    /// Recent call history from the primary API. Distinct from the CDR
    /// feed: different endpoint root, looser parameter contract.
    pub async fn get_call_history(
        &self,
        person_id: Option<&str>,
        location_id: Option<&str>,
        start_time: Option<&str>,
        end_time: Option<&str>,
        max_results: u32,
    ) -> Result<Vec<Value>> {
        let mut params = vec![max_param(max_results)];
        if let Some(person_id) = person_id {
            params.push(("personId", person_id.to_string()));
        }
        if let Some(location_id) = location_id {
            params.push(("locationId", location_id.to_string()));
        }
        if let Some(start_time) = start_time {
            params.push(("startTime", start_time.to_string()));
        }
        if let Some(end_time) = end_time {
            params.push(("endTime", end_time.to_string()));
        }
        Ok(items(self.get("/telephony/calls/callHistory", &params).await?))
    }

    pub async fn list_devices(
        &self,
        person_id: Option<&str>,
        location_id: Option<&str>,
        max_results: u32,
    ) -> Result<Vec<Value>> {
        let mut params = vec![max_param(max_results)];
        if let Some(person_id) = person_id {
            params.push(("personId", person_id.to_string()));
        }
        if let Some(location_id) = location_id {
            params.push(("locationId", location_id.to_string()));
        }
        Ok(items(self.get("/devices", &params).await?))
    }

    pub async fn get_device_details(&self, device_id: &str) -> Result<Value> {
        self.get(&format!("/devices/{}", device_id), &[]).await
    }

    pub async fn list_licenses(&self, org_id: Option<&str>, max_results: u32) -> Result<Vec<Value>> {
        let mut params = vec![max_param(max_results)];
        if let Some(org_id) = org_id {
            params.push(("orgId", org_id.to_string()));
        }
        Ok(items(self.get("/licenses", &params).await?))
    }

    pub async fn get_license_details(&self, license_id: &str) -> Result<Value> {
        self.get(&format!("/licenses/{}", license_id), &[]).await
    }

    pub async fn list_user_licenses(&self, person_id: &str) -> Result<Vec<Value>> {
        let user = self.get_user_details(person_id).await?;
        Ok(user
            .get("licenses")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    pub async fn assign_license_to_user(&self, person_id: &str, license_id: &str) -> Result<Value> {
        self.license_operation(person_id, license_id, "add").await
    }

    pub async fn remove_license_from_user(&self, person_id: &str, license_id: &str) -> Result<Value> {
        self.license_operation(person_id, license_id, "remove").await
    }

    async fn license_operation(
        &self,
        person_id: &str,
        license_id: &str,
        operation: &str,
    ) -> Result<Value> {
        let body = json!({
            "personId": person_id,
            "licenses": [{ "operation": operation, "id": license_id }],
        });
        self.patch("/licenses/users", &body).await
    }

    pub async fn list_phone_numbers(
        &self,
        location_id: Option<&str>,
        org_id: Option<&str>,
        number: Option<&str>,
        max_results: u32,
    ) -> Result<Vec<Value>> {
        let mut params = vec![max_param(max_results)];
        if let Some(location_id) = location_id {
            params.push(("locationId", location_id.to_string()));
        }
        if let Some(org_id) = org_id {
            params.push(("orgId", org_id.to_string()));
        }
        if let Some(number) = number {
            params.push(("phoneNumber", number.to_string()));
        }
        Ok(items(self.get("/telephony/config/numbers", &params).await?))
    }

    pub async fn get_phone_number_details(&self, number_id: &str) -> Result<Value> {
        self.get(&format!("/telephony/config/numbers/{}", number_id), &[])
            .await
    }

    pub async fn get_user_voicemail_settings(&self, person_id: &str) -> Result<Value> {
        self.get(&format!("/telephony/config/people/{}/voicemail", person_id), &[])
            .await
    }

    pub async fn update_user_voicemail_settings(
        &self,
        person_id: &str,
        fields: &Value,
    ) -> Result<Value> {
        self.put(
            &format!("/telephony/config/people/{}/voicemail", person_id),
            fields,
        )
        .await
    }

    pub async fn list_webhooks(&self, max_results: u32) -> Result<Vec<Value>> {
        let params = vec![max_param(max_results)];
        Ok(items(self.get("/webhooks", &params).await?))
    }

    pub async fn create_webhook(&self, fields: &Value) -> Result<Value> {
        self.post("/webhooks", fields).await
    }

    pub async fn get_webhook_details(&self, webhook_id: &str) -> Result<Value> {
        self.get(&format!("/webhooks/{}", webhook_id), &[]).await
    }

    pub async fn update_webhook(&self, webhook_id: &str, fields: &Value) -> Result<Value> {
        self.put(&format!("/webhooks/{}", webhook_id), fields).await
    }

    pub async fn delete_webhook(&self, webhook_id: &str) -> Result<Value> {
        self.delete(&format!("/webhooks/{}", webhook_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_error_body_drives_retryability() {
        let body = r#"{"message": "POST failed", "errors": [{"description": "Invalid input for field startTime"}], "trackingId": "t1"}"#;
        assert!(indicates_malformed_input(body));

        let body = r#"{"message": "Organization not eligible", "trackingId": "t2"}"#;
        assert!(!indicates_malformed_input(body));
    }

    #[test]
    fn raw_text_fallback_for_unstructured_bodies() {
        assert!(indicates_malformed_input("400 Bad Request"));
        assert!(!indicates_malformed_input("quota exceeded"));
    }

    #[test]
    fn items_unwraps_envelope_and_passes_arrays_through() {
        let wrapped = json!({"items": [{"id": "a"}]});
        assert_eq!(items(wrapped).len(), 1);
        let bare = json!([{"id": "a"}, {"id": "b"}]);
        assert_eq!(items(bare).len(), 2);
        assert!(items(json!({"other": 1})).is_empty());
    }
}
