use crate::controller::{health_check_controller, transcript_controller};
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// Room for multipart boundaries and the meeting details field on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Meeting Tasks API"
        ),
        paths(
            health_check_controller::health_check,
            transcript_controller::process,
            transcript_controller::save,
            transcript_controller::upload_tasks,
        ),
        components(
            schemas(
                domain::AssociationType,
                domain::CheckListItem,
                domain::MeetingDetails,
                domain::MeetingExtractionResult,
                domain::PlanAssociation,
                domain::PlanReference,
                domain::TaskAssignment,
                domain::TaskDetails,
                domain::TaskGroup,
                domain::TranscriptionTask,
                domain::pipeline::SaveSummary,
                domain::pipeline::SyncStatus,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "meeting_tasks", description = "Meeting transcript to task board API")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines the bearer token requirement for gaining access to our
// API endpoints for OpenAPI.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(transcript_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi2.json", ApiDoc::openapi()).path("/rapidoc"))
        .fallback_service(static_routes())
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn transcript_routes(app_state: AppState) -> Router {
    let upload_limit = app_state.config().max_file_size + MULTIPART_OVERHEAD;

    Router::new()
        .route(
            "/transcripts/process",
            post(transcript_controller::process).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/transcripts/save", post(transcript_controller::save))
        .route(
            "/transcripts/upload_tasks",
            post(transcript_controller::upload_tasks),
        )
        .with_state(app_state)
}

// This will serve static files that we can use as a "fallback" for when the server panics
pub fn static_routes() -> Router {
    Router::new().fallback_service(ServeDir::new("./"))
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod router_tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use domain::gateway::Gateways;
    use meeting_auth::error::{identity_error, Error as AuthError, IdentityErrorKind};
    use meeting_auth::identity::{AuthenticatedSubject, IdentityVerifier};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::{json, Value};
    use service::config::Config;
    use std::sync::Arc;
    use tower::ServiceExt;

    const VALID_TOKEN: &str = "valid-token";

    struct StaticVerifier;

    #[async_trait]
    impl IdentityVerifier for StaticVerifier {
        async fn verify(&self, bearer_token: &str) -> Result<AuthenticatedSubject, AuthError> {
            if bearer_token == VALID_TOKEN {
                Ok(AuthenticatedSubject {
                    id: "5f0f6c2e-2f1b-4d8e-9b7a-3c1d2e4f5a6b".to_string(),
                    email: Some("host@example.com".to_string()),
                })
            } else {
                Err(identity_error(IdentityErrorKind::InvalidToken, "unknown token"))
            }
        }
    }

    fn app_with(db: MockDatabase) -> Router {
        let db = Arc::new(db.into_connection());
        let service_state = service::AppState::new(Config::default(), &db);
        let gateways = Gateways {
            identity: Some(Arc::new(StaticVerifier)),
            ..Gateways::default()
        };
        define_routes(AppState::new(service_state, gateways))
    }

    fn app() -> Router {
        app_with(MockDatabase::new(DatabaseBackend::Postgres))
    }

    fn json_request(path: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn extraction_result() -> Value {
        json!({
            "meeting_details": {"meeting_title": "Weekly sync", "meeting_date": "2024-05-01"},
            "meeting_summary": "Discussed the redesign",
            "meeting_date": "2024-05-01",
            "task_groups": [{
                "plan_association": {"association_type": "new", "plan_title": "Hiring"},
                "group_description": "Open roles",
                "tasks": [{
                    "title": "Post the job ad",
                    "details": {"description": "Post on the careers page", "checklist_items": []}
                }]
            }]
        })
    }

    #[tokio::test]
    async fn health_check_is_public() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn transcript_routes_require_a_bearer_token() {
        for path in ["/transcripts/save", "/transcripts/upload_tasks"] {
            let response = app()
                .oneshot(json_request(path, None, extraction_result()))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{path}");
        }
    }

    #[tokio::test]
    async fn rejected_tokens_are_unauthorized() {
        let response = app()
            .oneshot(json_request(
                "/transcripts/save",
                Some("forged-token"),
                extraction_result(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_extraction_results_are_unprocessable() {
        let mut body = extraction_result();
        body["meeting_date"] = json!("last tuesday");

        let response = app()
            .oneshot(json_request("/transcripts/save", Some(VALID_TOKEN), body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn upload_without_a_task_board_is_a_server_error() {
        let response = app()
            .oneshot(json_request(
                "/transcripts/upload_tasks",
                Some(VALID_TOKEN),
                extraction_result(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn process_without_an_analysis_provider_is_a_server_error() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/transcripts/process")
            .header(header::AUTHORIZATION, format!("Bearer {VALID_TOKEN}"))
            .header(
                header::CONTENT_TYPE,
                "multipart/form-data; boundary=XBOUNDARY",
            )
            .body(Body::from(
                "--XBOUNDARY\r\nContent-Disposition: form-data; name=\"meeting_details\"\r\n\r\n{}\r\n--XBOUNDARY--\r\n",
            ))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
