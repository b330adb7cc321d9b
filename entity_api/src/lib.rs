pub use entity::{goals, meeting_status, meetings, task_status, tasks, Id};

pub mod error;
pub mod goal;
pub mod meeting;
pub mod task;
