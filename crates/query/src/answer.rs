use extract::{ChatClient, LlmError};

/// Narrow capability seam between the query engine and the hosted model:
/// one prompt in, one answer out. Tests substitute a recording double.
pub trait PromptAnswerer {
    fn answer(
        &self,
        system: &str,
        user: &str,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;
}

/// Production implementation over the DeepSeek chat client. Single
/// attempt per invocation, no retry.
pub struct DeepSeekAnswerer {
    client: ChatClient,
}

impl DeepSeekAnswerer {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

impl PromptAnswerer for DeepSeekAnswerer {
    async fn answer(&self, system: &str, user: &str) -> Result<String, LlmError> {
        self.client.chat(system, user).await
    }
}
