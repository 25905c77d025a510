pub mod agent;
pub mod models;
pub mod config;
pub mod llm;
pub mod cli;
pub mod store;
pub mod session;
pub mod feedback;
pub mod speech;
pub mod export;

use agent::TutorAgent;
use cli::repl::Repl;
use cli::Args;
use log::info;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Session Store Type: {}", args.store_type);
    info!("Sessions Path: {}", args.sessions_path);
    info!("Profile Path: {}", args.profile_path);
    info!("Prompts Path: {}", args.prompts_path);
    info!("Generative Model: {}", args.model);
    info!("Generative Base URL: {}", args.base_url);
    info!("Critique Min Chars: {}", args.critique_min_chars);
    info!("Critique Debounce: {}ms", args.critique_debounce_ms);
    info!(
        "Speech Capture: {}",
        if args.transcribe_cmd.is_some() { "external command" } else { "disabled" }
    );
    info!("Export Directory: {}", args.export_dir);
    info!("-------------------------");

    let agent = TutorAgent::new(args)?;
    let mut repl = Repl::new(agent);
    repl.run().await
}
