//! Meeting AI abstraction layer for transcript analysis and task board providers.
//!
//! This crate provides trait-based abstractions and the shared data model for
//! turning a meeting transcript into tracked work:
//! - LLM-powered extraction of grouped action items from a transcript
//! - Task board providers that hold plans and tasks (Microsoft Planner, etc.)
//! - Directory lookups that turn assignee emails into task board user ids
//!
//! The design is provider-agnostic, enabling applications to swap between
//! different service providers (Gemini, other LLMs, other task boards) without
//! changing application code.

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::Error;
pub use types::extraction::{
    AssociationType, CheckListItem, ExtractedMeeting, MeetingDetails, MeetingExtractionResult,
    PlanAssociation, PlanReference, TaskAssignment, TaskDetails, TaskGroup, TranscriptionTask,
};
pub use types::priority::TaskPriority;
