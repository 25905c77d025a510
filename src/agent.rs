use log::{ info, warn };
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::Args;
use crate::config::profile::Profile;
use crate::config::prompt::{ load_prompts_or_default, PromptConfig };
use crate::export::export_report;
use crate::feedback::FeedbackRequester;
use crate::llm::{ new_client, GenerativeClient, GenerativeConfig };
use crate::models::{ Category, FeedbackReport, TeachingSession };
use crate::session::TeachingController;
use crate::speech::{ create_speech_capture, SpeechCapture };
use crate::store::{ create_session_store, SessionStore };

/// Application facade: owns the configured collaborators and exposes the
/// operations a front end drives. All state beyond the collaborators lives
/// in the per-session `TeachingController` handed back to the caller.
pub struct TutorAgent {
    requester: FeedbackRequester,
    store: Arc<dyn SessionStore>,
    speech: Arc<dyn SpeechCapture>,
    prompts: Arc<PromptConfig>,
    profile: Profile,
    args: Args,
}

impl TutorAgent {
    pub fn new(args: Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let profile = Profile::load(&args.profile_path)?;
        let prompts = load_prompts_or_default(&args.prompts_path)?;
        let store = create_session_store(&args)?;
        let speech = create_speech_capture(&args);

        let client = Self::build_client(&args, &profile);
        let requester = FeedbackRequester::new(
            client,
            Arc::clone(&prompts),
            args.critique_min_chars
        );

        Ok(Self { requester, store, speech, prompts, profile, args })
    }

    /// The flag/env credential takes precedence over the saved profile
    /// credential; with neither, the app runs in its canned offline mode.
    fn build_client(args: &Args, profile: &Profile) -> Option<Arc<dyn GenerativeClient>> {
        let api_key = if !args.api_key.is_empty() {
            Some(args.api_key.clone())
        } else {
            profile.api_key.clone()
        };

        let Some(api_key) = api_key else {
            info!("No API credential configured; follow-up questions use the scripted lists");
            return None;
        };

        let config = GenerativeConfig {
            api_key: Some(api_key),
            model: args.model.clone(),
            base_url: args.base_url.clone(),
        };
        match new_client(&config) {
            Ok(client) => {
                info!("Generative client configured: model={}", args.model);
                Some(client)
            }
            Err(e) => {
                warn!("Failed to configure generative client: {}", e);
                None
            }
        }
    }

    pub fn credential_configured(&self) -> bool {
        self.requester.has_client()
    }

    pub fn requester(&self) -> &FeedbackRequester {
        &self.requester
    }

    pub fn critique_debounce_ms(&self) -> u64 {
        self.args.critique_debounce_ms
    }

    pub fn speech(&self) -> &Arc<dyn SpeechCapture> {
        &self.speech
    }

    pub fn start_session(&self, category: Category) -> TeachingController {
        info!("Starting {} teaching session", category);
        TeachingController::new(category)
    }

    /// One accepted send appends the teacher message and exactly one
    /// student reply: generated when a credential is configured, otherwise
    /// the next scripted question for the category. Returns false when the
    /// send was rejected.
    pub async fn send_message(
        &self,
        controller: &mut TeachingController,
        input: &str
    ) -> bool {
        if !controller.accept_input(input) {
            return false;
        }

        let reply = if self.requester.has_client() {
            self.requester.student_reply(input.trim()).await
        } else {
            controller.next_canned_question()
        };
        controller.push_student_reply(reply);
        true
    }

    /// Live critique of the current input, for the debounced display slot.
    pub async fn critique(&self, text: &str) -> Option<String> {
        self.requester.critique(text).await
    }

    /// End the session and append the immutable record to the store.
    pub async fn finish_session(
        &self,
        controller: &mut TeachingController
    ) -> Result<TeachingSession, Box<dyn Error + Send + Sync>> {
        let session = controller.finish();
        self.store.append(&session).await?;
        info!(
            "Session saved: category={} messages={}",
            session.category,
            session.messages.len()
        );
        Ok(session)
    }

    pub async fn generate_report(&self, session: &TeachingSession) -> FeedbackReport {
        self.requester.session_report(session).await
    }

    pub async fn list_sessions(
        &self,
        category: Option<Category>
    ) -> Result<Vec<TeachingSession>, Box<dyn Error + Send + Sync>> {
        let sessions = self.store.load_all().await?;
        Ok(crate::store::filter_by_category(&sessions, category))
    }

    /// Overwrite the saved credential and swap the generative client to
    /// match. An empty key clears the credential.
    pub fn save_api_key(&mut self, key: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.profile.set_api_key(key);
        self.profile.save(&self.args.profile_path)?;

        let client = Self::build_client(&self.args, &self.profile);
        self.requester = FeedbackRequester::new(
            client,
            Arc::clone(&self.prompts),
            self.args.critique_min_chars
        );
        Ok(())
    }

    pub async fn capture_speech(&self) -> Option<String> {
        self.speech.capture().await
    }

    pub fn export(
        &self,
        session: &TeachingSession,
        report: &FeedbackReport
    ) -> Result<PathBuf, Box<dyn Error + Send + Sync>> {
        export_report(session, report, &self.args.export_dir, self.args.export_page_lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::session::TeachingPhase;

    fn agent() -> TutorAgent {
        TutorAgent::new(Args::for_tests()).unwrap()
    }

    #[tokio::test]
    async fn test_mathematics_send_scenario() {
        let agent = agent();
        let mut controller = agent.start_session(Category::Mathematics);
        assert_eq!(controller.phase(), TeachingPhase::Initial);
        let before = controller.messages().len();

        // 60-character explanation typed by the teacher.
        let explanation = "Differentiation finds slopes and integration finds the areas";
        assert!(agent.send_message(&mut controller, explanation).await);

        assert_eq!(controller.phase(), TeachingPhase::Questions);
        assert_eq!(controller.messages().len(), before + 2);
        let appended = &controller.messages()[before..];
        assert_eq!(appended[0].role, Role::Teacher);
        assert_eq!(appended[1].role, Role::Student);
        // Without a credential the reply comes from the mathematics list.
        let questions = &crate::models::teaching::CATEGORY_QUESTIONS[&Category::Mathematics];
        assert!(questions.contains(&appended[1].text.as_str()));
    }

    #[tokio::test]
    async fn test_empty_send_changes_nothing() {
        let agent = agent();
        let mut controller = agent.start_session(Category::Science);
        let before = controller.messages().len();
        assert!(!agent.send_message(&mut controller, "   ").await);
        assert_eq!(controller.messages().len(), before);
    }

    #[tokio::test]
    async fn test_finished_session_round_trips_through_store() {
        let agent = agent();
        let mut controller = agent.start_session(Category::History);
        agent.send_message(&mut controller, "Rome fell for many reasons.").await;
        let session = agent.finish_session(&mut controller).await.unwrap();

        let loaded = agent.list_sessions(None).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].category, session.category);
        assert_eq!(loaded[0].messages.len(), session.messages.len());
        for (a, b) in loaded[0].messages.iter().zip(&session.messages) {
            assert_eq!(a.text, b.text);
        }

        let history_only = agent.list_sessions(Some(Category::History)).await.unwrap();
        assert_eq!(history_only.len(), 1);
        let science_only = agent.list_sessions(Some(Category::Science)).await.unwrap();
        assert!(science_only.is_empty());
    }

    #[tokio::test]
    async fn test_report_without_credential_is_the_mock() {
        let agent = agent();
        let mut controller = agent.start_session(Category::Language);
        agent.send_message(&mut controller, "Idioms rarely translate word for word.").await;
        let session = agent.finish_session(&mut controller).await.unwrap();

        let report = agent.generate_report(&session).await;
        let (strengths, improvements, suggestions) =
            crate::models::feedback::mock_report_lists();
        assert_eq!(report.strengths, strengths);
        assert_eq!(report.improvements, improvements);
        assert_eq!(report.suggestions, suggestions);
        assert!((70..=100).contains(&report.overall_score));
    }

    #[tokio::test]
    async fn test_critique_gated_without_credential() {
        let agent = agent();
        let text = "This explanation is certainly longer than twenty characters.";
        assert_eq!(agent.critique(text).await, None);
    }

    #[tokio::test]
    async fn test_saving_key_enables_the_client() {
        let mut agent = agent();
        assert!(!agent.credential_configured());
        agent.save_api_key("some-credential").unwrap();
        assert!(agent.credential_configured());
        agent.save_api_key("").unwrap();
        assert!(!agent.credential_configured());
    }
}
