use chrono::Utc;

use crate::models::teaching::{ greeting, CATEGORY_QUESTIONS, CLOSING_LINE };
use crate::models::{ Category, ChatMessage, StudentMood, TeachingSession };

/// Stage of the scripted interaction. `Initial -> Questions` fires on the
/// first accepted send; `Completed` is only ever reached by the user ending
/// the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TeachingPhase {
    Initial,
    Questions,
    Completed,
}

/// Owns one teaching interaction: the ordered message log, the phase, the
/// student's mood, the scripted-question cursor, and the in-flight flag
/// that keeps sends serialized.
pub struct TeachingController {
    category: Category,
    messages: Vec<ChatMessage>,
    phase: TeachingPhase,
    mood: StudentMood,
    question_index: usize,
    awaiting_reply: bool,
    created_at: i64,
}

impl TeachingController {
    /// Start a session with the scripted student greeting already in the
    /// log.
    pub fn new(category: Category) -> Self {
        Self {
            category,
            messages: vec![ChatMessage::student(greeting(category))],
            phase: TeachingPhase::Initial,
            mood: StudentMood::Neutral,
            question_index: 0,
            awaiting_reply: false,
            created_at: Utc::now().timestamp(),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn phase(&self) -> TeachingPhase {
        self.phase
    }

    pub fn mood(&self) -> StudentMood {
        self.mood
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    /// Try to send an explanation. Rejected (a no-op returning false) when
    /// the trimmed input is empty, a student reply is still in flight, or
    /// the session is over. On acceptance exactly one teacher message is
    /// appended and the controller waits for exactly one student reply.
    pub fn accept_input(&mut self, input: &str) -> bool {
        if self.phase == TeachingPhase::Completed {
            return false;
        }
        if self.awaiting_reply {
            return false;
        }
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return false;
        }

        self.messages.push(ChatMessage::teacher(trimmed));
        if self.phase == TeachingPhase::Initial {
            self.phase = TeachingPhase::Questions;
        }
        self.awaiting_reply = true;
        self.mood = StudentMood::Thinking;
        true
    }

    /// Deliver the student's reply for the last accepted send.
    pub fn push_student_reply(&mut self, text: impl Into<String>) {
        if !self.awaiting_reply {
            return;
        }
        self.messages.push(ChatMessage::student(text));
        self.awaiting_reply = false;
        self.mood = StudentMood::Excited;
    }

    /// Next scripted question for this category. The cursor advances once
    /// per call and saturates at the last entry of the list.
    pub fn next_canned_question(&mut self) -> String {
        let questions = &CATEGORY_QUESTIONS[&self.category];
        let index = self.question_index.min(questions.len() - 1);
        self.question_index += 1;
        questions[index].to_string()
    }

    /// End the session. The student says goodbye, the phase moves to
    /// `Completed`, and the log freezes; the returned session is the
    /// immutable record handed to the store.
    pub fn finish(&mut self) -> TeachingSession {
        if self.phase != TeachingPhase::Completed {
            self.messages.push(ChatMessage::student(CLOSING_LINE));
            self.phase = TeachingPhase::Completed;
            self.mood = StudentMood::Excited;
            self.awaiting_reply = false;
        }
        TeachingSession {
            category: self.category,
            messages: self.messages.clone(),
            created_at: self.created_at,
            completed: true,
        }
    }
}
