use funnel_core::model::{
    AttemptId, BandTone, CallToAction, MenuEntry, Question, QuizId, ResultBand,
};

use super::state::QuizStep;

/// Position within the question sequence, 1-based for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionProgress {
    pub number: usize,
    pub total: usize,
}

/// What the result screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub band: ResultBand,
    pub tone: BandTone,
    pub score: u32,
    pub max_score: u32,
    pub percentage: u32,
    pub call_to_action: Option<CallToAction>,
    pub community_link: Option<CallToAction>,
}

/// Owned, read-only copy of the session for the presentation layer.
///
/// `loaded == false` with a `quiz_id` set means the id is not in the catalog;
/// the presentation keeps showing its loading placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub attempt_id: AttemptId,
    pub quiz_id: Option<QuizId>,
    pub loaded: bool,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub step: QuizStep,
    pub identity_name: Option<String>,
    /// Lesson cards, filled only on the menu step.
    pub menu: Vec<MenuEntry>,
    pub progress: Option<QuestionProgress>,
    pub question: Option<Question>,
    pub score: u32,
    pub result: Option<ResultView>,
}
