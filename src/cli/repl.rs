use log::error;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{ AsyncBufReadExt, AsyncWriteExt, BufReader };

use crate::agent::TutorAgent;
use crate::feedback::debounce::Debouncer;
use crate::feedback::latest::ResponseSlot;
use crate::models::{ Category, FeedbackReport, Role, StudentMood, TeachingSession };
use crate::session::TeachingController;

/// Line-oriented front end over the agent. Each entered line during a
/// session is one send; `:done` ends the session, `:mic` fills the input
/// from the speech adapter.
pub struct Repl {
    agent: TutorAgent,
}

impl Repl {
    pub fn new(agent: TutorAgent) -> Self {
        Self { agent }
    }

    pub async fn run(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        println!("Reverse Tutor - explain a topic, the student asks back.");
        println!("Type 'help' for commands.");
        if !self.agent.credential_configured() {
            println!(
                "No API key configured: the student will use scripted questions. \
                 Set one with 'key <credential>'."
            );
        }

        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();

        loop {
            prompt("> ").await?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }

            let (command, rest) = split_command(&line);
            match command {
                "help" => print_help(),
                "quit" | "exit" => {
                    break;
                }
                "teach" => {
                    match rest.parse::<Category>() {
                        Ok(category) => self.run_session(category, &mut lines).await?,
                        Err(_) => print_categories(),
                    }
                }
                "sessions" => self.show_sessions(rest).await,
                "report" => self.show_report(rest).await,
                "export" => self.export_report(rest).await,
                "key" => {
                    match self.agent.save_api_key(rest) {
                        Ok(()) if rest.trim().is_empty() => println!("API key cleared."),
                        Ok(()) => println!("API key saved."),
                        Err(e) => error!("Failed to save API key: {}", e),
                    }
                }
                _ => println!("Unknown command '{}'. Type 'help'.", command),
            }
        }
        Ok(())
    }

    async fn run_session(
        &self,
        category: Category,
        lines: &mut tokio::io::Lines<BufReader<tokio::io::Stdin>>
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut controller = self.agent.start_session(category);
        println!();
        println!("--- {} lesson ---", category.title());
        println!("Explain in your own words. ':done' ends the lesson, ':mic' uses the microphone.");
        print_message(controller.messages().last());

        let critique_slot: Arc<ResponseSlot<String>> = Arc::new(ResponseSlot::new());
        let mut debouncer = Debouncer::new(
            Duration::from_millis(self.agent.critique_debounce_ms())
        );

        loop {
            // A critique that landed since the last turn is shown before
            // the next input, the way the side panel updates in place.
            if let Some(critique) = critique_slot.get().await {
                println!("[live feedback] {}", critique);
                critique_slot.clear().await;
            }

            prompt("you: ").await?;
            let Some(raw) = lines.next_line().await? else {
                break;
            };
            let input = match raw.trim() {
                ":done" => {
                    break;
                }
                ":mic" => {
                    if !self.agent.speech().is_available() {
                        println!("Speech capture is not configured (set TRANSCRIBE_CMD).");
                        continue;
                    }
                    match self.agent.capture_speech().await {
                        Some(transcript) => {
                            println!("you (voice): {}", transcript);
                            transcript
                        }
                        None => {
                            println!("Speech capture failed, please try again.");
                            continue;
                        }
                    }
                }
                other => other.to_string(),
            };

            self.schedule_critique(&critique_slot, &mut debouncer, &input);

            if self.agent.send_message(&mut controller, &input).await {
                print_mood(controller.mood());
                print_message(controller.messages().last());
            }
        }

        debouncer.cancel();
        self.finish_session(controller).await;
        Ok(())
    }

    /// Each submitted line counts as one input change: the critique request
    /// fires only after the debounce delay, and a newer change invalidates
    /// any stale response still in flight.
    fn schedule_critique(
        &self,
        slot: &Arc<ResponseSlot<String>>,
        debouncer: &mut Debouncer,
        input: &str
    ) {
        let requester = self.agent.requester().clone();
        let slot = Arc::clone(slot);
        let seq = slot.begin();
        let text = input.to_string();
        debouncer.call(async move {
            if let Some(critique) = requester.critique(&text).await {
                slot.accept(seq, critique).await;
            }
        });
    }

    async fn finish_session(&self, mut controller: TeachingController) {
        match self.agent.finish_session(&mut controller).await {
            Ok(session) => {
                print_message(session.messages.last());
                println!();
                println!("Lesson finished. Generating feedback...");
                let report = self.agent.generate_report(&session).await;
                print_report(&session, &report);
            }
            Err(e) => error!("Failed to save session: {}", e),
        }
    }

    async fn show_sessions(&self, filter: &str) {
        let category = parse_filter(filter);
        if !filter.trim().is_empty() && category.is_none() {
            print_categories();
            return;
        }

        match self.agent.list_sessions(category).await {
            Ok(sessions) if sessions.is_empty() => println!("No saved sessions."),
            Ok(sessions) => {
                if category.is_none() {
                    let tallies = crate::store::category_tallies(&sessions);
                    let mut summary: Vec<String> = Category::ALL
                        .iter()
                        .filter_map(|c| tallies.get(c).map(|n| format!("{} {}", c.title(), n)))
                        .collect();
                    summary.insert(0, format!("total {}", sessions.len()));
                    println!("{}", summary.join(" | "));
                }
                for (i, session) in sessions.iter().enumerate() {
                    println!(
                        "{:>3}. {:<17} {} messages, {}",
                        i + 1,
                        session.category.title(),
                        session.messages.len(),
                        if session.completed { "completed" } else { "in progress" }
                    );
                    if let Some(first) = session.first_explanation() {
                        println!("     first explanation: {}", preview(first, 60));
                    }
                }
            }
            Err(e) => error!("Failed to load sessions: {}", e),
        }
    }

    async fn show_report(&self, index: &str) {
        let Some(session) = self.pick_session(index).await else {
            return;
        };
        let report = self.agent.generate_report(&session).await;
        print_report(&session, &report);
    }

    async fn export_report(&self, index: &str) {
        let Some(session) = self.pick_session(index).await else {
            return;
        };
        let report = self.agent.generate_report(&session).await;
        match self.agent.export(&session, &report) {
            Ok(path) => println!("Report exported to {}", path.display()),
            Err(e) => error!("Export failed: {}", e),
        }
    }

    async fn pick_session(&self, index: &str) -> Option<TeachingSession> {
        let n: usize = match index.trim().parse() {
            Ok(n) => n,
            Err(_) => {
                println!("Give a session number, e.g. 'report 1' (see 'sessions').");
                return None;
            }
        };
        match self.agent.list_sessions(None).await {
            Ok(sessions) => {
                let session = sessions.into_iter().nth(n.saturating_sub(1));
                if session.is_none() {
                    println!("No session {}.", n);
                }
                session
            }
            Err(e) => {
                error!("Failed to load sessions: {}", e);
                None
            }
        }
    }
}

fn split_command(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (line, ""),
    }
}

fn parse_filter(filter: &str) -> Option<Category> {
    let trimmed = filter.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

async fn prompt(text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  teach <category>     start a lesson (e.g. 'teach mathematics')");
    println!("  sessions [category]  list saved lessons");
    println!("  report <n>           feedback report for lesson n");
    println!("  export <n>           write lesson n's report to a file");
    println!("  key <credential>     save the generative-endpoint API key");
    println!("  quit                 leave");
}

fn print_categories() {
    let tags: Vec<String> = Category::ALL.iter().map(|c| c.to_string()).collect();
    println!("Pick one of: {}", tags.join(", "));
}

fn print_message(message: Option<&crate::models::ChatMessage>) {
    if let Some(message) = message {
        let speaker = match message.role {
            Role::Teacher => "you",
            Role::Student => "student",
        };
        println!("{}: {}", speaker, message.text);
    }
}

fn print_mood(mood: StudentMood) {
    let label = match mood {
        StudentMood::Neutral => "listening",
        StudentMood::Thinking => "thinking...",
        StudentMood::Excited => "excited",
        StudentMood::Confused => "confused",
    };
    println!("(student is {})", label);
}

fn print_report(session: &TeachingSession, report: &FeedbackReport) {
    println!();
    println!("=== Feedback: {} ===", session.category.title());
    println!(
        "Analyzed {} explanations. Overall score: {}",
        session.teacher_message_count(),
        report.overall_score
    );
    print_section("What went well", &report.strengths);
    print_section("What to improve", &report.improvements);
    print_section("Suggested next steps", &report.suggestions);
}

fn print_section(heading: &str, items: &[String]) {
    println!("{}:", heading);
    for item in items {
        println!("  - {}", item);
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_command_separates_head_and_rest() {
        assert_eq!(split_command("teach mathematics"), ("teach", "mathematics"));
        assert_eq!(split_command("quit"), ("quit", ""));
        assert_eq!(split_command("key  abc "), ("key", "abc"));
    }

    #[test]
    fn test_parse_filter_accepts_blank_and_valid_categories() {
        assert_eq!(parse_filter("  "), None);
        assert_eq!(parse_filter("science"), Some(Category::Science));
        assert_eq!(parse_filter("pottery"), None);
    }

    #[test]
    fn test_preview_truncates_long_text() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("a very long explanation", 6), "a very...");
    }
}
