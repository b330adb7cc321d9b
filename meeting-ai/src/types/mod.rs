//! Shared data types for providers and the extraction pipeline.

pub mod analysis;
pub mod extraction;
pub mod priority;
pub mod task_board;
pub mod timestamp;
