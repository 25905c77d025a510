pub mod debounce;
pub mod latest;
mod report;

use log::warn;
use std::sync::Arc;

use crate::config::prompt::{ self, PromptConfig };
use crate::llm::GenerativeClient;

/// Shown when a critique request fails after being dispatched.
pub const CRITIQUE_PLACEHOLDER: &str = "Could not fetch feedback.";

/// Shown as the student's turn when a reply cannot be generated.
pub const STUDENT_REPLY_PLACEHOLDER: &str =
    "Sorry, I could not come up with a question about that.";

/// Minimum explanation length before a critique is worth requesting.
pub const DEFAULT_CRITIQUE_MIN_CHARS: usize = 20;

/// Asks the generative endpoint for short critiques of the teacher's
/// writing and for the simulated student's replies. Every operation fails
/// soft: network errors, bad payloads, and a missing credential all turn
/// into placeholder strings, never into errors for the caller.
#[derive(Clone)]
pub struct FeedbackRequester {
    client: Option<Arc<dyn GenerativeClient>>,
    prompts: Arc<PromptConfig>,
    critique_min_chars: usize,
}

impl FeedbackRequester {
    pub fn new(
        client: Option<Arc<dyn GenerativeClient>>,
        prompts: Arc<PromptConfig>,
        critique_min_chars: usize
    ) -> Self {
        Self { client, prompts, critique_min_chars }
    }

    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    pub(crate) fn client(&self) -> Option<&Arc<dyn GenerativeClient>> {
        self.client.as_ref()
    }

    pub(crate) fn prompts(&self) -> &PromptConfig {
        &self.prompts
    }

    /// Short critique of an in-progress explanation. Returns `None` when no
    /// request should be made at all (no credential, or the text is too
    /// short) so the displayed critique stays empty.
    pub async fn critique(&self, text: &str) -> Option<String> {
        let client = self.client.as_ref()?;
        if text.chars().count() <= self.critique_min_chars {
            return None;
        }

        let prompt = match prompt::get_critique_prompt(&self.prompts, text) {
            Ok(p) => p,
            Err(e) => {
                warn!("Critique prompt unavailable: {}", e);
                return Some(CRITIQUE_PLACEHOLDER.to_string());
            }
        };

        match client.generate(&prompt).await {
            Ok(reply) => Some(reply.trim().to_string()),
            Err(e) => {
                warn!("Critique request failed: {}", e);
                Some(CRITIQUE_PLACEHOLDER.to_string())
            }
        }
    }

    /// The student's reaction to an explanation: a natural response plus one
    /// question. Substitutes a fixed placeholder on any failure.
    pub async fn student_reply(&self, text: &str) -> String {
        let client = match &self.client {
            Some(c) => c,
            None => {
                return STUDENT_REPLY_PLACEHOLDER.to_string();
            }
        };

        let prompt = match prompt::get_student_reaction_prompt(&self.prompts, text) {
            Ok(p) => p,
            Err(e) => {
                warn!("Student reaction prompt unavailable: {}", e);
                return STUDENT_REPLY_PLACEHOLDER.to_string();
            }
        };

        match client.generate(&prompt).await {
            Ok(reply) => reply.trim().to_string(),
            Err(e) => {
                warn!("Student reply request failed: {}", e);
                STUDENT_REPLY_PLACEHOLDER.to_string()
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use std::error::Error as StdError;

    use crate::llm::GenerativeClient;

    /// Always answers with a fixed string.
    pub struct ScriptedClient(pub &'static str);

    #[async_trait]
    impl GenerativeClient for ScriptedClient {
        async fn generate(&self, _prompt: &str) -> Result<String, Box<dyn StdError + Send + Sync>> {
            Ok(self.0.to_string())
        }
    }

    /// Always fails, standing in for a dead network.
    pub struct FailingClient;

    #[async_trait]
    impl GenerativeClient for FailingClient {
        async fn generate(&self, _prompt: &str) -> Result<String, Box<dyn StdError + Send + Sync>> {
            Err("connection refused".into())
        }
    }
}
