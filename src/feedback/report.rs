use log::warn;
use rand::Rng;
use serde::Deserialize;

use super::FeedbackRequester;
use crate::config::prompt;
use crate::models::feedback::{ mock_report_lists, FeedbackReport };
use crate::models::{ Role, TeachingSession };

/// Shape the summary prompt asks the endpoint to produce. Deserialization
/// is strict about the three keys; anything that does not match falls
/// closed into the mock report.
#[derive(Deserialize)]
struct SummaryPayload {
    strengths: Vec<String>,
    improvements: Vec<String>,
    suggestions: Vec<String>,
}

/// Generators often wrap JSON in a Markdown fence; strip one if present
/// before the strict parse.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

fn parse_summary(raw: &str) -> Option<SummaryPayload> {
    serde_json::from_str(strip_code_fence(raw)).ok()
}

pub fn format_transcript(session: &TeachingSession) -> String {
    let mut result = String::new();
    for message in &session.messages {
        let speaker = match message.role {
            Role::Teacher => "Teacher",
            Role::Student => "Student",
        };
        result.push_str(&format!("{}: {}\n", speaker, message.text));
    }
    result
}

/// The score is uniform in [70, 100] on every path; it deliberately carries
/// no relation to the content.
fn random_score() -> u8 {
    rand::thread_rng().gen_range(70..=100)
}

fn mock_report() -> FeedbackReport {
    let (strengths, improvements, suggestions) = mock_report_lists();
    FeedbackReport {
        overall_score: random_score(),
        strengths,
        improvements,
        suggestions,
    }
}

impl FeedbackRequester {
    /// Build the feedback report for a completed session: ask the endpoint
    /// for a structured summary of the transcript, falling back to the
    /// fixed mock contents when no credential is configured or the reply
    /// does not match the expected shape.
    pub async fn session_report(&self, session: &TeachingSession) -> FeedbackReport {
        let client = match self.client() {
            Some(c) => c,
            None => {
                return mock_report();
            }
        };

        let transcript = format_transcript(session);
        let summary_prompt = match
            prompt::get_session_summary_prompt(self.prompts(), &transcript)
        {
            Ok(p) => p,
            Err(e) => {
                warn!("Summary prompt unavailable: {}", e);
                return mock_report();
            }
        };

        let raw = match client.generate(&summary_prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Summary request failed: {}", e);
                return mock_report();
            }
        };

        match parse_summary(&raw) {
            Some(payload) =>
                FeedbackReport {
                    overall_score: random_score(),
                    strengths: payload.strengths,
                    improvements: payload.improvements,
                    suggestions: payload.suggestions,
                },
            None => {
                warn!("Summary response did not match the expected shape, using mock report");
                mock_report()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::test_support::{ FailingClient, ScriptedClient };
    use crate::config::prompt::PromptConfig;
    use crate::models::{ Category, ChatMessage };
    use std::sync::Arc;

    fn session() -> TeachingSession {
        TeachingSession {
            category: Category::Mathematics,
            messages: vec![
                ChatMessage::student("Hi! What will you teach me?"),
                ChatMessage::teacher("Integrals accumulate change over an interval."),
            ],
            created_at: 0,
            completed: true,
        }
    }

    fn requester(client: Option<Arc<dyn crate::llm::GenerativeClient>>) -> FeedbackRequester {
        FeedbackRequester::new(client, Arc::new(PromptConfig::default()), 20)
    }

    #[tokio::test]
    async fn test_report_without_credential_uses_mock_contents() {
        let report = requester(None).session_report(&session()).await;
        let (strengths, improvements, suggestions) = mock_report_lists();
        assert_eq!(report.strengths, strengths);
        assert_eq!(report.improvements, improvements);
        assert_eq!(report.suggestions, suggestions);
        assert!((70..=100).contains(&report.overall_score));
    }

    #[tokio::test]
    async fn test_malformed_summary_falls_back_to_mock() {
        let requester = requester(Some(Arc::new(ScriptedClient("The lesson was nice overall!"))));
        let report = requester.session_report(&session()).await;
        let (strengths, _, _) = mock_report_lists();
        assert_eq!(report.strengths, strengths);
    }

    #[tokio::test]
    async fn test_endpoint_failure_falls_back_to_mock() {
        let requester = requester(Some(Arc::new(FailingClient)));
        let report = requester.session_report(&session()).await;
        let (_, improvements, _) = mock_report_lists();
        assert_eq!(report.improvements, improvements);
    }

    #[tokio::test]
    async fn test_well_formed_summary_is_used() {
        let requester = requester(
            Some(
                Arc::new(
                    ScriptedClient(
                        r#"{"strengths": ["clear"], "improvements": ["examples"], "suggestions": ["practice"]}"#
                    )
                )
            )
        );
        let report = requester.session_report(&session()).await;
        assert_eq!(report.strengths, vec!["clear".to_string()]);
        assert_eq!(report.improvements, vec!["examples".to_string()]);
        assert_eq!(report.suggestions, vec!["practice".to_string()]);
    }

    #[test]
    fn test_fenced_json_is_accepted() {
        let raw = "```json\n{\"strengths\": [], \"improvements\": [], \"suggestions\": []}\n```";
        assert!(parse_summary(raw).is_some());
    }

    #[test]
    fn test_missing_key_fails_closed() {
        let raw = r#"{"strengths": [], "improvements": []}"#;
        assert!(parse_summary(raw).is_none());
    }

    #[test]
    fn test_transcript_labels_both_roles() {
        let transcript = format_transcript(&session());
        assert!(transcript.contains("Student: Hi! What will you teach me?"));
        assert!(transcript.contains("Teacher: Integrals accumulate change over an interval."));
    }

    #[test]
    fn test_score_range_is_70_to_100() {
        for _ in 0..50 {
            let score = random_score();
            assert!((70..=100).contains(&score));
        }
    }
}
