use async_trait::async_trait;

use crate::Result;

/// Port for the external answer-generation service.
///
/// One prompt in, one answer out. Implementations must not retry; any failure
/// is reported as [`crate::Error::ExternalService`].
#[async_trait]
pub trait AnswerService: Send + Sync {
    async fn generate_answer(&self, prompt: &str) -> Result<String>;
}
