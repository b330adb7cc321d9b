//! Microsoft Planner task board and Azure AD directory over Microsoft Graph.

use super::{network_error, response_error};
use crate::error::Error;
use async_trait::async_trait;
use log::*;
use meeting_ai::traits::directory::Provider as DirectoryProvider;
use meeting_ai::traits::task_board::Provider as TaskBoardProvider;
use meeting_ai::types::task_board::{DirectoryUser, KnownPlan, NewTask, TaskDetailsUpdate};
use meeting_ai::Error as MeetingAiError;
use meeting_auth::api_key::{ApiKeyProvider, BearerTokenAuth, ProviderAuth};
use meeting_auth::oauth::TokenSource;
use reqwest::{header, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;

const SERVICE: &str = "Microsoft Graph";

#[derive(Debug, Deserialize)]
struct CreatedResource {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaskDetailsResource {
    #[serde(rename = "@odata.etag", default)]
    etag: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlanList {
    #[serde(default)]
    value: Vec<PlanResource>,
}

#[derive(Debug, Deserialize)]
struct PlanResource {
    id: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphUser {
    id: String,
    #[serde(default)]
    mail: Option<String>,
    #[serde(default)]
    user_principal_name: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

/// Microsoft Graph client for Planner plans, tasks and user lookups.
///
/// Requests are never retried: plan and task creation are not idempotent.
pub struct GraphPlannerClient {
    client: reqwest::Client,
    base_url: String,
    /// Group (or roster) URL new plans are created in.
    container_url: Option<String>,
    tokens: Arc<dyn TokenSource>,
}

impl GraphPlannerClient {
    pub fn new(
        base_url: &str,
        container_url: Option<String>,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            container_url: container_url.map(|url| url.trim_end_matches('/').to_string()),
            tokens,
        })
    }

    async fn auth(&self) -> Result<BearerTokenAuth, MeetingAiError> {
        let token = self.tokens.access_token().await.map_err(|e| {
            warn!("Failed to acquire a Microsoft Graph token: {e}");
            MeetingAiError::Authentication(e.to_string())
        })?;
        Ok(BearerTokenAuth::new(ApiKeyProvider::MicrosoftGraph, token))
    }

    fn container_url(&self) -> Result<&str, MeetingAiError> {
        self.container_url.as_deref().ok_or_else(|| {
            MeetingAiError::Configuration("MICROSOFT_PLANNER_CONTAINER_URL is not set".to_string())
        })
    }

    /// Posts `body` to `path` and returns the id of the created resource.
    async fn create(
        &self,
        path: &str,
        body: &Value,
        what: &str,
    ) -> Result<String, MeetingAiError> {
        let url = format!("{}{}", self.base_url, path);
        let auth = self.auth().await?;

        let response = auth
            .authenticate(self.client.post(&url))
            .json(body)
            .send()
            .await
            .map_err(|e| network_error(SERVICE, e))?;

        if !response.status().is_success() {
            return Err(response_error(SERVICE, response).await);
        }

        let created: CreatedResource = response.json().await.map_err(|e| {
            warn!("Failed to parse created {what}: {e:?}");
            MeetingAiError::Deserialization(format!("Invalid {what} from {SERVICE}: {e}"))
        })?;

        created
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| MeetingAiError::Provider(format!("Failed to create Planner {what}")))
    }
}

/// Graph body for a new task. Dates are omitted when unknown.
fn task_body(task: &NewTask) -> Value {
    let assignments: Map<String, Value> = task
        .assignee_ids
        .iter()
        .map(|user_id| {
            (
                user_id.clone(),
                json!({
                    "@odata.type": "#microsoft.graph.plannerAssignment",
                    "orderHint": " !",
                }),
            )
        })
        .collect();

    let mut body = json!({
        "planId": task.plan_id,
        "title": task.title,
        "assignments": assignments,
        "priority": task.priority.to_external(),
    });
    if let Some(due) = task.due_date_time {
        body["dueDateTime"] = json!(due.to_rfc3339());
    }
    if let Some(start) = task.start_date_time {
        body["startDateTime"] = json!(start.to_rfc3339());
    }
    body
}

fn details_body(details: &TaskDetailsUpdate) -> Value {
    let checklist: Map<String, Value> = details
        .checklist
        .iter()
        .map(|entry| {
            (
                entry.id.clone(),
                json!({
                    "@odata.type": "microsoft.graph.plannerChecklistItem",
                    "title": entry.title,
                    "isChecked": entry.is_checked,
                }),
            )
        })
        .collect();

    json!({
        "description": details.description,
        "checklist": checklist,
    })
}

#[async_trait]
impl TaskBoardProvider for GraphPlannerClient {
    async fn create_plan(&self, title: &str) -> Result<String, MeetingAiError> {
        let body = json!({
            "container": { "url": self.container_url()? },
            "title": title,
        });

        let plan_id = self.create("/planner/plans", &body, "plan").await?;
        info!("Created Planner plan {plan_id} '{title}'");
        Ok(plan_id)
    }

    async fn create_task(&self, task: &NewTask) -> Result<String, MeetingAiError> {
        let task_id = self
            .create("/planner/tasks", &task_body(task), "task")
            .await?;
        debug!("Created Planner task {task_id} in plan {}", task.plan_id);
        Ok(task_id)
    }

    async fn update_task_details(
        &self,
        task_id: &str,
        details: &TaskDetailsUpdate,
    ) -> Result<(), MeetingAiError> {
        let url = format!("{}/planner/tasks/{}/details", self.base_url, task_id);
        let auth = self.auth().await?;

        // Planner only accepts updates that name the current version of the details.
        let response = auth
            .authenticate(self.client.get(&url))
            .send()
            .await
            .map_err(|e| network_error(SERVICE, e))?;

        if !response.status().is_success() {
            return Err(response_error(SERVICE, response).await);
        }

        let header_etag = response
            .headers()
            .get(header::ETAG)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let current: TaskDetailsResource = response.json().await.map_err(|e| {
            warn!("Failed to parse Planner task details: {e:?}");
            MeetingAiError::Deserialization(format!("Invalid task details from {SERVICE}: {e}"))
        })?;
        let etag = current.etag.or(header_etag).ok_or_else(|| {
            MeetingAiError::Provider(format!("No etag on the details of task {task_id}"))
        })?;

        let response = auth
            .authenticate(self.client.patch(&url))
            .header(header::IF_MATCH, etag)
            .json(&details_body(details))
            .send()
            .await
            .map_err(|e| network_error(SERVICE, e))?;

        if !response.status().is_success() {
            return Err(response_error(SERVICE, response).await);
        }

        debug!(
            "Updated details of Planner task {task_id} with {} checklist items",
            details.checklist.len()
        );
        Ok(())
    }

    async fn list_plans(&self) -> Result<Vec<KnownPlan>, MeetingAiError> {
        let url = format!("{}/planner/plans", self.container_url()?);
        let auth = self.auth().await?;

        let response = auth
            .authenticate(self.client.get(&url))
            .send()
            .await
            .map_err(|e| network_error(SERVICE, e))?;

        if !response.status().is_success() {
            return Err(response_error(SERVICE, response).await);
        }

        let plans: PlanList = response.json().await.map_err(|e| {
            warn!("Failed to parse Planner plans: {e:?}");
            MeetingAiError::Deserialization(format!("Invalid plan list from {SERVICE}: {e}"))
        })?;

        Ok(plans
            .value
            .into_iter()
            .map(|plan| KnownPlan {
                id: plan.id,
                title: plan.title,
            })
            .collect())
    }

    fn provider_id(&self) -> &str {
        "microsoft_planner"
    }
}

#[async_trait]
impl DirectoryProvider for GraphPlannerClient {
    async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<DirectoryUser>, MeetingAiError> {
        let url = format!(
            "{}/users/{}?$select=id,mail,userPrincipalName,displayName",
            self.base_url,
            urlencoding::encode(email)
        );
        let auth = self.auth().await?;

        let response = auth
            .authenticate(self.client.get(&url))
            .send()
            .await
            .map_err(|e| network_error(SERVICE, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("No directory user for {email}");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(response_error(SERVICE, response).await);
        }

        let user: GraphUser = response.json().await.map_err(|e| {
            warn!("Failed to parse directory user: {e:?}");
            MeetingAiError::Deserialization(format!("Invalid user from {SERVICE}: {e}"))
        })?;

        Ok(Some(DirectoryUser {
            id: user.id,
            email: user.mail.or(user.user_principal_name),
            display_name: user.display_name,
        }))
    }
}
