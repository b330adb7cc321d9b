//! Directory lookup trait.

use crate::types::task_board::DirectoryUser;
use crate::Error;
use async_trait::async_trait;

/// Resolves people named in a transcript to task board users.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Find the user with `email`, or `None` if the directory has no match.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<DirectoryUser>, Error>;
}
