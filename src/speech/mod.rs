use async_trait::async_trait;
use log::{ info, warn };
use std::sync::Arc;
use tokio::process::Command;

use crate::cli::Args;

/// Optional speech-to-text capability. Capture yields one final transcript
/// with no interim results; on any error the adapter surfaces a notice in
/// the log and resolves to `None`, leaving the caller idle again.
#[async_trait]
pub trait SpeechCapture: Send + Sync {
    fn is_available(&self) -> bool;

    async fn capture(&self) -> Option<String>;
}

/// Delegates transcription to a user-configured external command whose
/// stdout is taken as the final transcript.
pub struct CommandSpeech {
    command: String,
}

impl CommandSpeech {
    pub fn new(command: String) -> Self {
        Self { command }
    }
}

#[async_trait]
impl SpeechCapture for CommandSpeech {
    fn is_available(&self) -> bool {
        true
    }

    async fn capture(&self) -> Option<String> {
        info!("Capturing speech via: {}", self.command);
        let output = match Command::new("sh").arg("-c").arg(&self.command).output().await {
            Ok(out) => out,
            Err(e) => {
                warn!("Speech capture failed to start: {}", e);
                return None;
            }
        };

        if !output.status.success() {
            warn!("Speech capture exited with {}", output.status);
            return None;
        }

        let transcript = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if transcript.is_empty() {
            warn!("Speech capture produced an empty transcript");
            return None;
        }
        Some(transcript)
    }
}

/// Stand-in when no transcriber is configured.
pub struct NullSpeech;

#[async_trait]
impl SpeechCapture for NullSpeech {
    fn is_available(&self) -> bool {
        false
    }

    async fn capture(&self) -> Option<String> {
        None
    }
}

pub fn create_speech_capture(args: &Args) -> Arc<dyn SpeechCapture> {
    match &args.transcribe_cmd {
        Some(cmd) if !cmd.trim().is_empty() => {
            info!("Speech capture enabled via external command");
            Arc::new(CommandSpeech::new(cmd.clone()))
        }
        _ => Arc::new(NullSpeech),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_speech_is_unavailable_and_yields_nothing() {
        let speech = NullSpeech;
        assert!(!speech.is_available());
        assert_eq!(speech.capture().await, None);
    }

    #[tokio::test]
    async fn test_command_stdout_becomes_the_transcript() {
        let speech = CommandSpeech::new("echo ' the water cycle has three stages '".to_string());
        assert_eq!(
            speech.capture().await.as_deref(),
            Some("the water cycle has three stages")
        );
    }

    #[tokio::test]
    async fn test_failing_command_resets_to_idle() {
        let speech = CommandSpeech::new("exit 3".to_string());
        assert_eq!(speech.capture().await, None);
    }

    #[tokio::test]
    async fn test_empty_transcript_is_treated_as_failure() {
        let speech = CommandSpeech::new("true".to_string());
        assert_eq!(speech.capture().await, None);
    }
}
