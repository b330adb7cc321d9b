//! Turns an uploaded transcript into a validated extraction result.

use crate::error::Error;
use crate::transcript_file::TranscriptFile;
use log::*;
use meeting_ai::traits::analysis::Provider as AnalysisProvider;
use meeting_ai::traits::task_board::Provider as TaskBoard;
use meeting_ai::types::analysis::Request;
use meeting_ai::types::task_board::KnownPlan;
use meeting_ai::{MeetingDetails, MeetingExtractionResult};

/// Sends `file` to the analysis provider and merges its answer with the
/// caller's `details`. The meeting date of the result is the date in `details`.
pub async fn extract(
    analysis: &dyn AnalysisProvider,
    task_board: Option<&dyn TaskBoard>,
    file: TranscriptFile,
    details: MeetingDetails,
) -> Result<MeetingExtractionResult, Error> {
    let known_plans = known_plans(task_board).await;

    debug!(
        "Extracting '{}' ({}, {} bytes) with {} known plans via {}",
        file.file_name,
        file.mime_type,
        file.data.len(),
        known_plans.len(),
        analysis.provider_id()
    );

    let request = Request::new(file.data, file.mime_type).with_known_plans(known_plans);
    let extracted = analysis.extract(request).await?;

    let result = MeetingExtractionResult::from_extraction(extracted, details)?;
    info!(
        "Extracted {} action items in {} task groups",
        result.action_items_count(),
        result.task_groups().len()
    );

    Ok(result)
}

async fn known_plans(task_board: Option<&dyn TaskBoard>) -> Vec<KnownPlan> {
    let Some(task_board) = task_board else {
        return Vec::new();
    };

    match task_board.list_plans().await {
        Ok(plans) => plans,
        Err(err) => {
            warn!("Could not list task board plans, extracting without them: {err}");
            Vec::new()
        }
    }
}
