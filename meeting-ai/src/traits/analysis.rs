//! AI analysis provider trait.

use crate::types::analysis::Request;
use crate::types::extraction::ExtractedMeeting;
use crate::Error;
use async_trait::async_trait;

/// Abstraction for LLM-powered meeting transcript analysis.
///
/// Implementations send the transcript file to a large language model and
/// parse its answer into grouped action items. Supports Gemini today; the
/// trait enables model comparison and provider switching.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Extract a summary and plan-grouped tasks from a transcript file.
    ///
    /// Processing typically takes 10-60 seconds depending on transcript length and model.
    /// A response that does not satisfy the extraction model's invariants is
    /// reported as `Error::Deserialization`.
    async fn extract(&self, request: Request) -> Result<ExtractedMeeting, Error>;

    /// Return unique identifier for this provider (e.g., "gemini").
    ///
    /// Must be lowercase, alphanumeric with underscores only.
    fn provider_id(&self) -> &str;

    /// Validate API credentials by making a lightweight test request.
    ///
    /// Returns false if credentials are invalid or expired.
    async fn verify_credentials(&self) -> Result<bool, Error>;
}
