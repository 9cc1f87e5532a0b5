use std::collections::BTreeMap;
use std::fmt;

use funnel_core::model::{QuestionId, QuizId, UserIdentity};
use funnel_core::scoring;

/// Step of the funnel the user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuizStep {
    #[default]
    Intro,
    Menu,
    Question,
    Result,
}

impl fmt::Display for QuizStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QuizStep::Intro => "intro",
            QuizStep::Menu => "menu",
            QuizStep::Question => "question",
            QuizStep::Result => "result",
        };
        f.write_str(label)
    }
}

/// Everything a session tracks. Only `QuizSession` mutates it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub(crate) active_quiz_id: Option<QuizId>,
    pub(crate) step: QuizStep,
    pub(crate) question_index: usize,
    pub(crate) answers: BTreeMap<QuestionId, u32>,
    pub(crate) identity: Option<UserIdentity>,
}

impl SessionState {
    pub(crate) fn with_identity(identity: Option<UserIdentity>) -> Self {
        Self {
            identity,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn active_quiz_id(&self) -> Option<&QuizId> {
        self.active_quiz_id.as_ref()
    }

    #[must_use]
    pub fn step(&self) -> QuizStep {
        self.step
    }

    #[must_use]
    pub fn question_index(&self) -> usize {
        self.question_index
    }

    #[must_use]
    pub fn answers(&self) -> &BTreeMap<QuestionId, u32> {
        &self.answers
    }

    #[must_use]
    pub fn identity(&self) -> Option<&UserIdentity> {
        self.identity.as_ref()
    }

    /// Always derived from `answers`; there is no separately stored score.
    /// Saturates at `u32::MAX`.
    #[must_use]
    pub fn score(&self) -> u32 {
        scoring::total_points(self.answers.values().copied()).unwrap_or(u32::MAX)
    }

    /// Score after replacing the answer for `question` with `points`, or
    /// `None` if that total would not fit in a `u32`.
    pub(crate) fn score_with(&self, question: QuestionId, points: u32) -> Option<u32> {
        let others = self
            .answers
            .iter()
            .filter(|(id, _)| **id != question)
            .map(|(_, value)| *value);
        scoring::total_points(others.chain([points]))
    }

    pub(crate) fn clear_progress(&mut self) {
        self.question_index = 0;
        self.answers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_sums_answers() {
        let mut state = SessionState::default();
        state.answers.insert(QuestionId::new(1), 2);
        state.answers.insert(QuestionId::new(2), 3);
        assert_eq!(state.score(), 5);

        state.answers.insert(QuestionId::new(1), 0);
        assert_eq!(state.score(), 3);
    }

    #[test]
    fn score_saturates_and_score_with_detects_overflow() {
        let mut state = SessionState::default();
        state.answers.insert(QuestionId::new(1), u32::MAX);

        assert_eq!(state.score_with(QuestionId::new(2), 1), None);
        assert_eq!(state.score_with(QuestionId::new(1), 1), Some(1));

        state.answers.insert(QuestionId::new(2), 1);
        assert_eq!(state.score(), u32::MAX);
    }

    #[test]
    fn clear_progress_keeps_identity_and_quiz() {
        let identity = funnel_core::model::IdentityDraft::new("Ana", "11999999999")
            .validate()
            .unwrap();
        let mut state = SessionState::with_identity(Some(identity));
        state.active_quiz_id = Some(QuizId::new("quiz-1").unwrap());
        state.step = QuizStep::Result;
        state.question_index = 5;
        state.answers.insert(QuestionId::new(1), 3);

        state.clear_progress();

        assert_eq!(state.question_index(), 0);
        assert!(state.answers().is_empty());
        assert!(state.identity().is_some());
        assert!(state.active_quiz_id().is_some());
    }
}
