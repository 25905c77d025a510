pub mod teaching;
pub mod feedback;

pub use teaching::{
    Category,
    ChatMessage,
    ParseCategoryError,
    Role,
    StudentMood,
    TeachingSession,
};
pub use feedback::FeedbackReport;
