use serde::{ Deserialize, Serialize };

/// Feedback summary for one completed session. Derived on demand, never
/// persisted; viewing the same session twice may produce different reports.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedbackReport {
    pub overall_score: u8,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Fixed, non-personalized report contents used whenever no generative
/// endpoint is configured or its response is unusable.
pub fn mock_report_lists() -> (Vec<String>, Vec<String>, Vec<String>) {
    let strengths = vec![
        "Solid grasp of the core concepts".to_string(),
        "Answers to the student's questions were logical and well organized".to_string(),
        "Good at breaking complex material into plain language".to_string(),
    ];
    let improvements = vec![
        "Some technical terms were used without a precise definition".to_string(),
        "Examples and real applications could be more concrete".to_string(),
    ];
    let suggestions = vec![
        "Structure explanations in steps matched to the learner's level".to_string(),
        "Support explanations with diagrams or visual aids".to_string(),
        "Make the connections between related concepts more explicit".to_string(),
    ];
    (strengths, improvements, suggestions)
}
