use serde::Deserialize;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use log::warn;

#[derive(Debug)]
pub enum PromptError {
    TemplateNotFound(String),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::TemplateNotFound(key) => write!(f, "Prompt template '{}' not found", key),
            PromptError::IoError(e) => write!(f, "Prompt file IO error: {}", e),
            PromptError::JsonError(e) => write!(f, "Prompt JSON parsing error: {}", e),
        }
    }
}

impl Error for PromptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PromptError::IoError(e) => Some(e),
            PromptError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PromptError {
    fn from(err: std::io::Error) -> Self {
        PromptError::IoError(err)
    }
}

impl From<serde_json::Error> for PromptError {
    fn from(err: serde_json::Error) -> Self {
        PromptError::JsonError(err)
    }
}

const CRITIQUE_KEY: &str = "critique";
const STUDENT_REACTION_KEY: &str = "student_reaction";
const SESSION_SUMMARY_KEY: &str = "session_summary";

/// Prompt templates sent to the generative endpoint. Placeholders in
/// `{braces}` are substituted by the accessor functions.
#[derive(Deserialize, Debug, Clone)]
pub struct PromptConfig {
    pub templates: HashMap<String, String>,
}

impl Default for PromptConfig {
    fn default() -> Self {
        let mut templates = HashMap::new();
        templates.insert(
            CRITIQUE_KEY.to_string(),
            "Point out any logical or factual errors in the explanation below, and give \
             one improvement in 50 characters or less.\nExplanation: \"{explanation}\""
                .to_string()
        );
        templates.insert(
            STUDENT_REACTION_KEY.to_string(),
            "Below is a teacher's explanation. React to it naturally and warmly, the way a \
             real student would, and then ask the one question the student is most curious \
             about.\n\nExplanation: \"{explanation}\""
                .to_string()
        );
        templates.insert(
            SESSION_SUMMARY_KEY.to_string(),
            "Below is the transcript of a lesson in which a person taught a simulated \
             student. Evaluate the teacher's explanations and respond with ONLY a JSON \
             object of the form {\"strengths\": [...], \"improvements\": [...], \
             \"suggestions\": [...]}, where each value is an array of short strings.\n\n\
             Transcript:\n{transcript}"
                .to_string()
        );
        Self { templates }
    }
}

impl PromptConfig {
    fn validate(&self) -> Result<(), PromptError> {
        for key in [CRITIQUE_KEY, STUDENT_REACTION_KEY, SESSION_SUMMARY_KEY] {
            if !self.templates.contains_key(key) {
                return Err(PromptError::TemplateNotFound(format!("templates:{}", key)));
            }
        }
        Ok(())
    }
}

pub fn load_prompts(path: &str) -> Result<Arc<PromptConfig>, PromptError> {
    let file_content = fs::read_to_string(path)?;
    let config: PromptConfig = serde_json::from_str(&file_content)?;
    config.validate()?;
    Ok(Arc::new(config))
}

/// Load the prompt file if it exists; a missing file falls back to the
/// compiled-in templates. A present but unparsable file is still an error.
pub fn load_prompts_or_default(path: &str) -> Result<Arc<PromptConfig>, PromptError> {
    if !Path::new(path).exists() {
        warn!("Prompts file '{}' not found, using built-in templates", path);
        return Ok(Arc::new(PromptConfig::default()));
    }
    load_prompts(path)
}

fn get_template<'a>(config: &'a PromptConfig, key: &str) -> Result<&'a str, PromptError> {
    config.templates
        .get(key)
        .map(|s| s.as_str())
        .ok_or_else(|| PromptError::TemplateNotFound(format!("templates:{}", key)))
}

pub fn get_critique_prompt(
    config: &PromptConfig,
    explanation: &str
) -> Result<String, PromptError> {
    let template = get_template(config, CRITIQUE_KEY)?;
    Ok(template.replace("{explanation}", explanation))
}

pub fn get_student_reaction_prompt(
    config: &PromptConfig,
    explanation: &str
) -> Result<String, PromptError> {
    let template = get_template(config, STUDENT_REACTION_KEY)?;
    Ok(template.replace("{explanation}", explanation))
}

pub fn get_session_summary_prompt(
    config: &PromptConfig,
    transcript: &str
) -> Result<String, PromptError> {
    let template = get_template(config, SESSION_SUMMARY_KEY)?;
    Ok(template.replace("{transcript}", transcript))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_templates_validate() {
        assert!(PromptConfig::default().validate().is_ok());
    }

    #[test]
    fn test_critique_prompt_embeds_explanation() {
        let config = PromptConfig::default();
        let prompt = get_critique_prompt(&config, "water boils at 100C").unwrap();
        assert!(prompt.contains("water boils at 100C"));
        assert!(!prompt.contains("{explanation}"));
    }

    #[test]
    fn test_summary_prompt_embeds_transcript() {
        let config = PromptConfig::default();
        let prompt = get_session_summary_prompt(&config, "teacher: hi\nstudent: hi").unwrap();
        assert!(prompt.contains("teacher: hi"));
    }

    #[test]
    fn test_missing_template_is_reported_by_key() {
        let config = PromptConfig { templates: HashMap::new() };
        let err = get_critique_prompt(&config, "x").unwrap_err();
        assert!(err.to_string().contains("critique"));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = load_prompts_or_default("/nonexistent/prompts.json").unwrap();
        assert!(config.templates.contains_key("critique"));
    }
}
