use chrono::{ TimeZone, Utc };
use log::info;
use std::error::Error;
use std::fs;
use std::path::{ Path, PathBuf };

use crate::models::{ FeedbackReport, Role, TeachingSession };

const PAGE_WIDTH: usize = 72;

/// Render a completed session and its report as a paginated plain-text
/// document and write it under `dir`. Returns the path of the written file.
pub fn export_report(
    session: &TeachingSession,
    report: &FeedbackReport,
    dir: &str,
    lines_per_page: usize
) -> Result<PathBuf, Box<dyn Error + Send + Sync>> {
    let lines = document_lines(session, report);
    let pages = paginate(&lines, lines_per_page);

    fs
        ::create_dir_all(dir)
        .map_err(|e| format!("Failed to create export directory '{}': {}", dir, e))?;
    let path = Path::new(dir).join(
        format!("feedback-{}-{}.txt", session.category, session.created_at)
    );
    fs
        ::write(&path, pages)
        .map_err(|e| format!("Failed to write export file '{}': {}", path.display(), e))?;
    info!("Feedback report exported to {}", path.display());
    Ok(path)
}

fn document_lines(session: &TeachingSession, report: &FeedbackReport) -> Vec<String> {
    let date = Utc
        .timestamp_opt(session.created_at, 0)
        .single()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| session.created_at.to_string());

    let mut lines = Vec::new();
    lines.push("Teaching Feedback Report".to_string());
    lines.push(format!("Subject: {}", session.category.title()));
    lines.push(format!("Date: {}", date));
    lines.push(format!("Overall score: {}", report.overall_score));
    lines.push(String::new());

    section(&mut lines, "What went well", &report.strengths);
    section(&mut lines, "What to improve", &report.improvements);
    section(&mut lines, "Suggested next steps", &report.suggestions);

    lines.push("Transcript".to_string());
    lines.push("-".repeat(PAGE_WIDTH));
    for message in &session.messages {
        let speaker = match message.role {
            Role::Teacher => "Teacher",
            Role::Student => "Student",
        };
        for wrapped in wrap(&format!("{}: {}", speaker, message.text), PAGE_WIDTH) {
            lines.push(wrapped);
        }
    }
    lines
}

fn section(lines: &mut Vec<String>, heading: &str, items: &[String]) {
    lines.push(heading.to_string());
    lines.push("-".repeat(PAGE_WIDTH));
    for (i, item) in items.iter().enumerate() {
        for wrapped in wrap(&format!("{}. {}", i + 1, item), PAGE_WIDTH) {
            lines.push(wrapped);
        }
    }
    lines.push(String::new());
}

/// Split the line list into fixed-height pages, each followed by a footer.
fn paginate(lines: &[String], lines_per_page: usize) -> String {
    let per_page = lines_per_page.max(1);
    let page_count = lines.len().div_ceil(per_page).max(1);

    let mut out = String::new();
    for (page, chunk) in lines.chunks(per_page).enumerate() {
        for line in chunk {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str(&format!("{:>width$}\n", format!("Page {}/{}", page + 1, page_count), width = PAGE_WIDTH));
        if page + 1 < page_count {
            out.push('\u{c}');
        }
    }
    out
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
