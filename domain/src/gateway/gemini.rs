//! Gemini client that extracts grouped action items from a transcript file.
//!
//! The transcript is sent inline (base64) to `models/{model}:generateContent`
//! with a JSON response type, and the model's answer is deserialized straight
//! into the extraction model, so an answer that breaks its invariants is
//! rejected here.

use super::{network_error, response_error};
use crate::error::Error;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::*;
use meeting_ai::traits::analysis::Provider;
use meeting_ai::types::analysis::Request;
use meeting_ai::types::task_board::KnownPlan;
use meeting_ai::{Error as MeetingAiError, ExtractedMeeting};
use meeting_auth::api_key::{ApiKeyAuth, ApiKeyProvider, ProviderAuth};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SERVICE: &str = "Gemini";

const SYSTEM_PROMPT: &str = r#"You analyze meeting transcripts and answer with a single JSON object and nothing else.

1. Write a short factual summary of the meeting into "meeting_summary".
2. Find every concrete action item. Group related items by theme; each theme is one entry of "task_groups" with a short "group_description".
3. For every group fill "plan_association":
   - When one of the existing plans listed by the user fits the group with a confidence of at least 0.5, use "association_type": "existing", the plan's title as "plan_title", and a "plan_reference" with that plan's "plan_id", "plan_title" and your "confidence_score".
   - Otherwise use "association_type": "new" with a fitting "plan_title" and no "plan_reference".
   - Explain the grouping in "rationale".
4. For every task give:
   - "title": short and action oriented
   - "details": {"description": what has to be done, "checklist_items": [{"title": step}] when the discussion broke the task into steps}
   - "assignments": [{"assignee_name": person or team, "assignee_email": email or null}], empty when nobody was assigned
   - "due_date": "YYYY-MM-DD" when a deadline was mentioned, resolved against the meeting date, otherwise null
   - "startDateTime": ISO 8601 date-time, the meeting start unless stated otherwise
   - "priority": 1 for urgent, 3 for important, 5 for medium, 9 for low; 5 when nothing was said

Only use information present in the transcript.

Example:
{
  "meeting_summary": "The team reviewed document management and volunteer outreach.",
  "task_groups": [
    {
      "plan_association": {
        "association_type": "existing",
        "plan_title": "Document Management",
        "plan_reference": {"plan_id": "DM-001", "plan_title": "Document Management", "confidence_score": 0.9},
        "rationale": "All tasks centralize document handling."
      },
      "group_description": "Organize program documents.",
      "tasks": [
        {
          "title": "Compile a list of all documents",
          "details": {
            "description": "List every program document with its location and update frequency.",
            "checklist_items": [{"title": "Identify documents"}, {"title": "Log locations"}]
          },
          "assignments": [{"assignee_name": "Program Support Team", "assignee_email": null}],
          "due_date": "2025-09-12",
          "startDateTime": "2025-09-04T09:38:00Z",
          "priority": 5
        }
      ]
    }
  ]
}"#;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

/// Gemini REST API client
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    auth: ApiKeyAuth,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: &str, base_url: &str) -> Result<Self, Error> {
        let auth = ApiKeyAuth::from_config(ApiKeyProvider::Gemini, api_key)?;

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(180))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            auth,
        })
    }

    fn build_request(request: Request) -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: Some(SYSTEM_PROMPT.to_string()),
                    inline_data: None,
                }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: request.mime_type,
                            data: STANDARD.encode(&request.file_data),
                        }),
                    },
                    Part {
                        text: Some(known_plans_prompt(&request.known_plans)),
                        inline_data: None,
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        }
    }
}

fn known_plans_prompt(known_plans: &[KnownPlan]) -> String {
    if known_plans.is_empty() {
        return "There are no existing plans.".to_string();
    }

    let plans: Vec<String> = known_plans
        .iter()
        .map(|plan| format!("- {} (plan_id: {})", plan.title, plan.id))
        .collect();
    format!("Existing plans:\n{}", plans.join("\n"))
}

/// Parses the JSON text the model produced. Models sometimes wrap it in a
/// markdown fence even when asked for JSON.
fn parse_extraction(text: &str) -> Result<ExtractedMeeting, MeetingAiError> {
    let trimmed = text.trim();
    let json = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|inner| inner.strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str(json).map_err(|e| {
        warn!("Failed to parse Gemini extraction: {e:?}, response: {text}");
        MeetingAiError::Deserialization(format!("Invalid extraction from Gemini: {e}"))
    })
}

#[async_trait]
impl Provider for GeminiClient {
    async fn extract(&self, request: Request) -> Result<ExtractedMeeting, MeetingAiError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        debug!(
            "Sending {} byte transcript to {} ({})",
            request.file_data.len(),
            self.model,
            request.mime_type
        );

        let body = Self::build_request(request);
        let response = self
            .auth
            .authenticate(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| network_error(SERVICE, e))?;

        if !response.status().is_success() {
            return Err(response_error(SERVICE, response).await);
        }

        let generated: GenerateContentResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse Gemini response: {e:?}");
            MeetingAiError::Deserialization(format!("Invalid response from Gemini: {e}"))
        })?;

        let text: String = generated
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            error!("Gemini returned no content");
            return Err(MeetingAiError::Provider(
                "Gemini returned an empty response".to_string(),
            ));
        }

        let extracted = parse_extraction(&text)?;
        info!(
            "Gemini extracted {} task groups",
            extracted.task_groups.len()
        );
        Ok(extracted)
    }

    fn provider_id(&self) -> &str {
        "gemini"
    }

    async fn verify_credentials(&self) -> Result<bool, MeetingAiError> {
        let url = format!("{}/models/{}", self.base_url, self.model);

        let response = self
            .auth
            .authenticate(self.client.get(&url))
            .send()
            .await
            .map_err(|e| network_error(SERVICE, e))?;

        Ok(response.status().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meeting_ai::AssociationType;
    use serde_json::json;

    fn extraction_json() -> String {
        json!({
            "meeting_summary": "Hiring update",
            "task_groups": [{
                "plan_association": {
                    "association_type": "new",
                    "plan_title": "Hiring",
                    "rationale": "Recruiting work"
                },
                "group_description": "Open roles",
                "tasks": [{
                    "title": "Post job",
                    "details": { "description": "Publish the opening", "checklist_items": [] },
                    "assignments": [],
                    "due_date": null,
                    "startDateTime": "2025-09-04T09:38:00Z",
                    "priority": "3"
                }]
            }]
        })
        .to_string()
    }

    fn gemini_body(text: &str) -> String {
        json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
        })
        .to_string()
    }

    fn client(base_url: &str) -> GeminiClient {
        GeminiClient::new(Some("test-key".to_string()), "gemini-2.5-flash", base_url).unwrap()
    }

    #[tokio::test]
    async fn extract_parses_the_model_answer() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .match_body(mockito::Matcher::PartialJson(json!({
                "contents": [{ "role": "user", "parts": [
                    { "inlineData": { "mimeType": "text/plain", "data": "aGVsbG8=" } },
                    { "text": "There are no existing plans." }
                ]}],
                "generationConfig": { "responseMimeType": "application/json" }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(gemini_body(&extraction_json()))
            .create_async()
            .await;

        let extracted = client(&server.url())
            .extract(Request::new(b"hello".to_vec(), "text/plain"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(extracted.meeting_summary.as_deref(), Some("Hiring update"));
        assert_eq!(extracted.task_groups.len(), 1);
        let group = &extracted.task_groups[0];
        assert_eq!(
            group.plan_association().association_type(),
            AssociationType::New
        );
        assert_eq!(group.tasks()[0].priority().to_external(), 3);
    }

    #[tokio::test]
    async fn extract_rejects_answers_that_break_the_model() {
        let mut server = mockito::Server::new_async().await;
        let invalid = json!({
            "task_groups": [{
                "plan_association": { "association_type": "existing", "plan_title": "Hiring" },
                "tasks": [{ "title": "Post job", "details": { "description": "x" } }]
            }]
        })
        .to_string();
        let _mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .with_status(200)
            .with_body(gemini_body(&invalid))
            .create_async()
            .await;

        let err = client(&server.url())
            .extract(Request::new(b"hello".to_vec(), "text/plain"))
            .await
            .unwrap_err();

        assert!(matches!(err, MeetingAiError::Deserialization(_)));
    }

    #[tokio::test]
    async fn extract_reports_rejected_keys() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/gemini-2.5-flash:generateContent")
            .with_status(403)
            .with_body(r#"{"error":{"message":"API key not valid"}}"#)
            .create_async()
            .await;

        let err = client(&server.url())
            .extract(Request::new(b"hello".to_vec(), "text/plain"))
            .await
            .unwrap_err();

        assert!(matches!(err, MeetingAiError::Authentication(_)));
    }

    #[tokio::test]
    async fn verify_credentials_checks_the_model_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/models/gemini-2.5-flash")
            .match_header("x-goog-api-key", "test-key")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        assert!(client(&server.url()).verify_credentials().await.unwrap());
    }

    #[test]
    fn fenced_answers_are_unwrapped() {
        let fenced = format!("```json\n{}\n```", extraction_json());
        assert_eq!(parse_extraction(&fenced).unwrap().task_groups.len(), 1);
    }

    #[test]
    fn known_plans_are_listed_with_their_ids() {
        let prompt = known_plans_prompt(&[KnownPlan {
            id: "plan-1".to_string(),
            title: "Website".to_string(),
        }]);
        assert!(prompt.contains("- Website (plan_id: plan-1)"));
    }

    #[test]
    fn missing_api_key_is_a_config_error() {
        assert!(GeminiClient::new(None, "gemini-2.5-flash", "http://localhost").is_err());
    }
}
