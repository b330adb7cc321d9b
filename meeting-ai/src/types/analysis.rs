//! Types for transcript analysis requests.

use super::task_board::KnownPlan;

/// A transcript file handed to an analysis provider.
#[derive(Debug, Clone)]
pub struct Request {
    /// Raw file contents. Providers extract the text themselves.
    pub file_data: Vec<u8>,
    /// MIME type of `file_data` (e.g. `text/plain`, `application/pdf`).
    pub mime_type: String,
    /// Plans already on the task board, offered to the model as association candidates.
    pub known_plans: Vec<KnownPlan>,
}

impl Request {
    pub fn new(file_data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            file_data,
            mime_type: mime_type.into(),
            known_plans: Vec::new(),
        }
    }

    pub fn with_known_plans(mut self, known_plans: Vec<KnownPlan>) -> Self {
        self.known_plans = known_plans;
        self
    }
}
