use chrono::Utc;
use once_cell::sync::Lazy;
use serde::{ Deserialize, Serialize };
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Who authored a chat message. The person using the app is the teacher;
/// the simulated learner is the student.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Student,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Teacher => write!(f, "teacher"),
            Role::Student => write!(f, "student"),
        }
    }
}

/// One entry of a session transcript. Immutable once appended; insertion
/// order is the chronological order of the conversation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub text: String,
    pub created_at: i64,
}

impl ChatMessage {
    pub fn teacher(text: impl Into<String>) -> Self {
        Self::new(Role::Teacher, text)
    }

    pub fn student(text: impl Into<String>) -> Self {
        Self::new(Role::Student, text)
    }

    fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            created_at: Utc::now().timestamp(),
        }
    }
}

/// Subject taught in a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Mathematics,
    Science,
    History,
    Economics,
    ComputerScience,
    Language,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Mathematics,
        Category::Science,
        Category::History,
        Category::Economics,
        Category::ComputerScience,
        Category::Language,
    ];

    /// Human-readable name for display.
    pub fn title(&self) -> &'static str {
        match self {
            Category::Mathematics => "Mathematics",
            Category::Science => "Science",
            Category::History => "History",
            Category::Economics => "Economics",
            Category::ComputerScience => "Computer Science",
            Category::Language => "Language",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Category::Mathematics => "mathematics",
            Category::Science => "science",
            Category::History => "history",
            Category::Economics => "economics",
            Category::ComputerScience => "computer_science",
            Category::Language => "language",
        };
        write!(f, "{}", tag)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid category: '{0}'")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mathematics" | "math" => Ok(Category::Mathematics),
            "science" => Ok(Category::Science),
            "history" => Ok(Category::History),
            "economics" => Ok(Category::Economics),
            "computer_science" | "cs" => Ok(Category::ComputerScience),
            "language" => Ok(Category::Language),
            _ => Err(ParseCategoryError(s.to_string())),
        }
    }
}

/// How the simulated student is currently presented by the front end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StudentMood {
    Neutral,
    Thinking,
    Excited,
    Confused,
}

/// One complete teacher-student interaction, from the scripted greeting to
/// the explicit end. Never mutated after creation; persisted by appending
/// to the session store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TeachingSession {
    pub category: Category,
    pub messages: Vec<ChatMessage>,
    pub created_at: i64,
    pub completed: bool,
}

impl TeachingSession {
    /// Count of explanations the teacher gave during the session.
    pub fn teacher_message_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == Role::Teacher)
            .count()
    }

    /// The first explanation, used as a preview in the session history.
    pub fn first_explanation(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::Teacher)
            .map(|m| m.text.as_str())
    }
}

/// Scripted follow-up questions the student falls back to when no
/// generative endpoint is configured. Indexed by a running counter that
/// saturates at the last entry.
pub static CATEGORY_QUESTIONS: Lazy<HashMap<Category, Vec<&'static str>>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert(Category::Mathematics, vec![
        "Could you explain the relationship between differentiation and integration in more detail?",
        "How would I apply that formula to an actual problem?",
        "Is there another mathematical concept similar to this one?",
    ]);
    map.insert(Category::Science, vec![
        "Could you be more specific about the scientific principle behind that phenomenon?",
        "Is there a similar example I could see in everyday life?",
        "How should I interpret the results of that experiment?",
    ]);
    map.insert(Category::History, vec![
        "What impact did that event have on society at the time?",
        "How does it compare with what other countries went through in the same period?",
        "What lesson does it hold for us today?",
    ]);
    map.insert(Category::Economics, vec![
        "How does that economic theory play out in real markets?",
        "What would happen if we applied the idea to the current economy?",
        "How does it relate to other economic indicators?",
    ]);
    map.insert(Category::ComputerScience, vec![
        "What is the time complexity of that algorithm?",
        "How could I use this technique in a real project?",
        "How would it be implemented in other programming languages?",
    ]);
    map.insert(Category::Language, vec![
        "When are the exceptions to that grammar rule?",
        "How do native speakers actually use it?",
        "Are there other expressions with a similar meaning?",
    ]);
    map
});

/// Closing line the student says when the teacher ends the session.
pub const CLOSING_LINE: &str =
    "That was a great lesson! I learned a lot, thank you!";

/// Scripted opener the student greets the teacher with.
pub fn greeting(category: Category) -> String {
    format!(
        "Hi! I'm excited to take your {} lesson. What are you going to teach me?",
        category.title()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parses_canonical_tags() {
        assert_eq!("mathematics".parse::<Category>(), Ok(Category::Mathematics));
        assert_eq!("computer_science".parse::<Category>(), Ok(Category::ComputerScience));
        assert_eq!("Science".parse::<Category>(), Ok(Category::Science));
        assert!("astrology".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_display_round_trips() {
        for category in Category::ALL {
            let parsed: Category = category.to_string().parse().unwrap();
            assert_eq!(parsed, category);
        }
    }

    #[test]
    fn test_every_category_has_scripted_questions() {
        for category in Category::ALL {
            let questions = CATEGORY_QUESTIONS.get(&category).unwrap();
            assert!(!questions.is_empty());
        }
    }

    #[test]
    fn test_session_round_trips_through_json() {
        let session = TeachingSession {
            category: Category::Mathematics,
            messages: vec![
                ChatMessage::student(greeting(Category::Mathematics)),
                ChatMessage::teacher("The derivative measures instantaneous change."),
            ],
            created_at: 1_700_000_000,
            completed: true,
        };

        let json = serde_json::to_string(&session).unwrap();
        let restored: TeachingSession = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.category, session.category);
        assert_eq!(restored.messages.len(), session.messages.len());
        assert_eq!(restored.created_at, session.created_at);
        for (a, b) in restored.messages.iter().zip(&session.messages) {
            assert_eq!(a.text, b.text);
            assert_eq!(a.role, b.role);
            assert_eq!(a.created_at, b.created_at);
        }
    }

    #[test]
    fn test_teacher_message_count_ignores_student_turns() {
        let session = TeachingSession {
            category: Category::Science,
            messages: vec![
                ChatMessage::student("hello"),
                ChatMessage::teacher("photosynthesis"),
                ChatMessage::student("why?"),
            ],
            created_at: 0,
            completed: false,
        };
        assert_eq!(session.teacher_message_count(), 1);
        assert_eq!(session.first_explanation(), Some("photosynthesis"));
    }
}
