//! Controller for transcript processing and task board uploads.
//!
//! `process` turns an uploaded transcript into an extraction result for the
//! caller to review. `save` and `upload_tasks` take a reviewed result back.

use crate::controller::ApiResponse;
use crate::extractors::authenticated_caller::AuthenticatedCaller;
use crate::{AppState, Error};

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use domain::error::Error as DomainError;
use domain::transcript_file::TranscriptFile;
use domain::{extraction, pipeline, MeetingDetails, MeetingExtractionResult};
use log::*;

const FILE_FIELD: &str = "file";
const MEETING_DETAILS_FIELD: &str = "meeting_details";

/// POST /transcripts/process
///
/// Analyze a `.txt` or `.pdf` transcript. The multipart body carries the file
/// in `file` and the meeting title and date as a JSON string in `meeting_details`.
#[utoipa::path(
    post,
    path = "/transcripts/process",
    request_body(content_type = "multipart/form-data", description = "Fields `file` and `meeting_details`"),
    responses(
        (status = 200, description = "Transcript analyzed", body = MeetingExtractionResult),
        (status = 400, description = "Bad file type, file size or meeting details"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "The analysis service failed"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn process(
    AuthenticatedCaller(caller): AuthenticatedCaller,
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, Error> {
    debug!("POST process transcript for caller {}", caller.subject_id);

    let analysis = app_state.gateways.analysis.clone().ok_or_else(|| {
        error!("Transcript submitted but no analysis provider is configured");
        DomainError::config("analysis provider is not configured")
    })?;

    let (file, details) = read_upload(multipart, app_state.config().max_file_size).await?;

    let result = extraction::extract(
        analysis.as_ref(),
        app_state.gateways.task_board.as_deref(),
        file,
        details,
    )
    .await?;

    info!(
        "Extracted {} action items in {} task groups",
        result.action_items_count(),
        result.task_groups().len()
    );

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), result)))
}

/// POST /transcripts/save
///
/// Store a reviewed extraction result and sync its tasks to the task board.
/// The meeting is stored even when the sync fails; the response says which.
#[utoipa::path(
    post,
    path = "/transcripts/save",
    request_body = MeetingExtractionResult,
    responses(
        (status = 201, description = "Meeting saved", body = pipeline::SaveSummary),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Malformed extraction result"),
        (status = 500, description = "The meeting could not be stored"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn save(
    AuthenticatedCaller(caller): AuthenticatedCaller,
    State(app_state): State<AppState>,
    Json(result): Json<MeetingExtractionResult>,
) -> Result<impl IntoResponse, Error> {
    debug!(
        "POST save meeting {:?} with {} action items",
        result.meeting_details().title,
        result.action_items_count()
    );

    let summary = pipeline::handle_save(
        app_state.db_conn_ref(),
        app_state.gateways.task_board.as_deref(),
        app_state.gateways.directory.as_deref(),
        &result,
        caller.host_id(),
    )
    .await?;

    info!(
        "Saved meeting {} with {} tasks, sync {}",
        summary.meeting_id, summary.task_count, summary.sync_status
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), summary)),
    ))
}

/// POST /transcripts/upload_tasks
///
/// Push a reviewed extraction result to the task board without storing it.
#[utoipa::path(
    post,
    path = "/transcripts/upload_tasks",
    request_body = MeetingExtractionResult,
    responses(
        (status = 204, description = "Tasks uploaded"),
        (status = 400, description = "A plan association cannot be resolved"),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Malformed extraction result"),
        (status = 502, description = "The task board rejected the upload"),
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_tasks(
    AuthenticatedCaller(_caller): AuthenticatedCaller,
    State(app_state): State<AppState>,
    Json(result): Json<MeetingExtractionResult>,
) -> Result<impl IntoResponse, Error> {
    debug!(
        "POST upload {} task groups to the task board",
        result.task_groups().len()
    );

    pipeline::upload_only(
        app_state.gateways.task_board.as_deref(),
        app_state.gateways.directory.as_deref(),
        &result,
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn read_upload(
    mut multipart: Multipart,
    max_file_size: usize,
) -> Result<(TranscriptFile, MeetingDetails), Error> {
    let mut file = None;
    let mut details = None;

    while let Some(field) = multipart.next_field().await.map_err(malformed_upload)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(FILE_FIELD) => {
                let file_name = field.file_name().map(str::to_string);
                let data = field.bytes().await.map_err(malformed_upload)?;
                file = Some(TranscriptFile::new(file_name, data.to_vec(), max_file_size)?);
            }
            Some(MEETING_DETAILS_FIELD) => {
                let text = field.text().await.map_err(malformed_upload)?;
                details = Some(parse_meeting_details(&text)?);
            }
            other => debug!("Ignoring multipart field {other:?}"),
        }
    }

    let file = file.ok_or_else(|| DomainError::validation("transcript file is required"))?;
    let details =
        details.ok_or_else(|| DomainError::validation("meeting details are required"))?;

    Ok((file, details))
}

fn parse_meeting_details(text: &str) -> Result<MeetingDetails, DomainError> {
    serde_json::from_str(text).map_err(|e| {
        warn!("Rejected meeting details: {e}");
        DomainError::validation(format!("meeting details are not valid JSON: {e}"))
    })
}

fn malformed_upload(err: axum::extract::multipart::MultipartError) -> DomainError {
    warn!("Failed to read multipart upload: {err}");
    DomainError::validation(format!("malformed upload: {}", err.body_text()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meeting_details_accept_title_and_date() {
        let details =
            parse_meeting_details(r#"{"meeting_title":"Weekly sync","meeting_date":"2024-05-01"}"#)
                .unwrap();

        assert_eq!(details.title.as_deref(), Some("Weekly sync"));
        assert_eq!(details.date.as_deref(), Some("2024-05-01"));
    }

    #[test]
    fn meeting_details_must_be_json() {
        let err = parse_meeting_details("Weekly sync on Monday").unwrap_err();
        assert!(err.to_string().contains("meeting details are not valid JSON"));
    }
}
