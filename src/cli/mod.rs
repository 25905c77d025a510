pub mod repl;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Storage Args ---
    /// Session store backend (json, memory)
    #[arg(long, env = "STORE_TYPE", default_value = "json")]
    pub store_type: String,

    /// Path of the JSON file holding completed teaching sessions.
    #[arg(long, env = "SESSIONS_PATH", default_value = "data/sessions.json")]
    pub sessions_path: String,

    /// Path of the JSON file holding the saved user profile (API credential).
    #[arg(long, env = "PROFILE_PATH", default_value = "data/profile.json")]
    pub profile_path: String,

    // --- Generative Endpoint Args ---
    /// API key for the generative text endpoint. Overrides the saved profile credential.
    #[arg(long, env = "GENERATIVE_API_KEY", default_value = "")]
    pub api_key: String,

    /// Base URL of the generative text endpoint.
    #[arg(
        long,
        env = "GENERATIVE_BASE_URL",
        default_value = "https://generativelanguage.googleapis.com/v1beta"
    )]
    pub base_url: String,

    /// Model name used for all generation calls.
    #[arg(long, env = "GENERATIVE_MODEL", default_value = "gemini-1.5-flash")]
    pub model: String,

    /// Path to the prompt template file. Built-in templates are used when the file is absent.
    #[arg(long, env = "PROMPTS_PATH", default_value = "json/prompts.json")]
    pub prompts_path: String,

    // --- Live Critique Args ---
    /// Minimum explanation length (characters) before a live critique is requested.
    #[arg(long, env = "CRITIQUE_MIN_CHARS", default_value = "20")]
    pub critique_min_chars: usize,

    /// Input inactivity (milliseconds) before a live critique request fires.
    #[arg(long, env = "CRITIQUE_DEBOUNCE_MS", default_value = "1000")]
    pub critique_debounce_ms: u64,

    // --- Speech Args ---
    /// External command whose stdout is taken as a speech transcript. Speech capture is disabled when unset.
    #[arg(long, env = "TRANSCRIBE_CMD")]
    pub transcribe_cmd: Option<String>,

    // --- Export Args ---
    /// Directory feedback reports are exported into.
    #[arg(long, env = "EXPORT_DIR", default_value = "export")]
    pub export_dir: String,

    /// Lines per page in exported feedback documents.
    #[arg(long, env = "EXPORT_PAGE_LINES", default_value = "40")]
    pub export_page_lines: usize,
}

#[cfg(test)]
impl Args {
    /// Arguments pointing at throwaway locations, for tests.
    pub fn for_tests() -> Self {
        use uuid::Uuid;
        let scratch = std::env::temp_dir().join(format!("reverse-tutor-{}", Uuid::new_v4()));
        Self {
            store_type: "memory".to_string(),
            sessions_path: scratch.join("sessions.json").to_string_lossy().to_string(),
            profile_path: scratch.join("profile.json").to_string_lossy().to_string(),
            api_key: String::new(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            prompts_path: scratch.join("prompts.json").to_string_lossy().to_string(),
            critique_min_chars: 20,
            critique_debounce_ms: 1000,
            transcribe_cmd: None,
            export_dir: scratch.join("export").to_string_lossy().to_string(),
            export_page_lines: 40,
        }
    }
}
