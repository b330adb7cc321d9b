//! This module re-exports various items from the `entity_api` and `meeting-ai` crates.
//!
//! The purpose of this re-export is to ensure that consumers of the `domain` crate do not need to
//! directly depend on the `entity_api` crate. By re-exporting these items, we provide a clear and
//! consistent interface for the extraction model and stored rows within the domain layer, while
//! the underlying implementation details remain in the lower crates.

// Re-exports from `entity` crate via `entity_api`
pub use entity_api::{goals, meeting_status, meetings, task_status, tasks, Id};

// The extraction model shared with providers
pub use meeting_ai::{
    AssociationType, CheckListItem, MeetingDetails, MeetingExtractionResult, PlanAssociation,
    PlanReference, TaskAssignment, TaskDetails, TaskGroup, TaskPriority, TranscriptionTask,
};

pub mod checklist;
pub mod error;
pub mod extraction;
pub mod identity;
pub mod pipeline;
pub mod plan_resolver;
pub mod projection;
pub mod sync;
pub mod transcript_file;

pub mod gateway;

#[cfg(test)]
pub(crate) mod test_support;
