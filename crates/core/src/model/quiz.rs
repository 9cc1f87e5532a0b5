use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::{OptionId, QuestionId, QuizId};
use crate::scoring::total_points;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz title cannot be empty")]
    EmptyTitle,

    #[error("quiz must have at least one question")]
    NoQuestions,

    #[error("duplicate question id {0}")]
    DuplicateQuestionId(QuestionId),

    #[error("question {question} must offer exactly the options A, B, C and D in order")]
    InvalidOptions { question: QuestionId },

    #[error("quiz must have at least one result band")]
    NoResultBands,

    #[error("result band {index} has min {min} greater than max {max}")]
    InvalidBandRange { index: usize, min: u32, max: u32 },

    #[error("result band {index} starts at {found}, expected {expected}")]
    BandGap {
        index: usize,
        expected: u32,
        found: u32,
    },

    #[error("highest band ends at {top} but the maximum achievable score is {max_score}")]
    BandCoverage { max_score: u32, top: u32 },

    #[error("maximum achievable score does not fit in a u32")]
    ScoreOverflow,
}

//
// ─── QUESTIONS ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: OptionId,
    pub text: String,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub options: Vec<AnswerOption>,
}

impl Question {
    #[must_use]
    pub fn option(&self, id: OptionId) -> Option<&AnswerOption> {
        self.options.iter().find(|option| option.id == id)
    }

    /// Highest number of points any option of this question awards.
    #[must_use]
    pub fn max_points(&self) -> u32 {
        self.options.iter().map(|o| o.points).max().unwrap_or(0)
    }
}

//
// ─── RESULT BANDS ──────────────────────────────────────────────────────────────
//

/// Qualitative grouping of a band, derived from its color variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandTone {
    Risk,
    Developing,
    Ready,
}

/// Inclusive score range mapped to a status and a follow-up message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultBand {
    pub min: u32,
    pub max: u32,
    pub status: String,
    pub description: String,
    pub next_step: String,
    pub color_var: String,
    pub bg_var: String,
}

impl ResultBand {
    #[must_use]
    pub fn contains(&self, score: u32) -> bool {
        self.min <= score && score <= self.max
    }

    /// Unrecognized color variables are treated as `Ready`.
    #[must_use]
    pub fn tone(&self) -> BandTone {
        match self.color_var.as_str() {
            "--color-risk" => BandTone::Risk,
            "--color-dev" => BandTone::Developing,
            _ => BandTone::Ready,
        }
    }
}

/// Reminder/next-class button shown on the result screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallToAction {
    pub title: String,
    pub link: String,
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// Unvalidated quiz as read from configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDraft {
    pub id: QuizId,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub questions: Vec<Question>,
    pub results: Vec<ResultBand>,
    #[serde(default)]
    pub call_to_action: Option<CallToAction>,
    #[serde(default)]
    pub community_link: Option<CallToAction>,
}

impl QuizDraft {
    /// Validate the draft into an immutable quiz definition.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if questions are missing or malformed, or if the
    /// result bands do not partition `0..=max_score` without gaps.
    pub fn validate(self) -> Result<QuizDefinition, QuizError> {
        if self.title.trim().is_empty() {
            return Err(QuizError::EmptyTitle);
        }
        if self.questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }

        let mut seen = HashSet::with_capacity(self.questions.len());
        for question in &self.questions {
            if !seen.insert(question.id) {
                return Err(QuizError::DuplicateQuestionId(question.id));
            }
            let letters: Vec<OptionId> = question.options.iter().map(|o| o.id).collect();
            if letters != OptionId::ALL {
                return Err(QuizError::InvalidOptions {
                    question: question.id,
                });
            }
        }

        if self.results.is_empty() {
            return Err(QuizError::NoResultBands);
        }

        let mut expected = 0_u32;
        for (index, band) in self.results.iter().enumerate() {
            if band.min > band.max {
                return Err(QuizError::InvalidBandRange {
                    index,
                    min: band.min,
                    max: band.max,
                });
            }
            if band.min != expected {
                return Err(QuizError::BandGap {
                    index,
                    expected,
                    found: band.min,
                });
            }
            expected = band.max.saturating_add(1);
        }

        let max_score = total_points(self.questions.iter().map(Question::max_points))
            .ok_or(QuizError::ScoreOverflow)?;
        let top = self.results.last().map_or(0, |band| band.max);
        if top != max_score {
            return Err(QuizError::BandCoverage { max_score, top });
        }

        Ok(QuizDefinition {
            id: self.id,
            title: self.title,
            subtitle: self.subtitle,
            questions: self.questions,
            results: self.results,
            call_to_action: self.call_to_action,
            community_link: self.community_link,
            max_score,
        })
    }
}

/// A validated, immutable quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizDefinition {
    id: QuizId,
    title: String,
    subtitle: String,
    questions: Vec<Question>,
    results: Vec<ResultBand>,
    call_to_action: Option<CallToAction>,
    community_link: Option<CallToAction>,
    max_score: u32,
}

impl QuizDefinition {
    #[must_use]
    pub fn id(&self) -> &QuizId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn subtitle(&self) -> &str {
        &self.subtitle
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn question_by_id(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Index of the final question. Validation guarantees at least one.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.questions.len().saturating_sub(1)
    }

    #[must_use]
    pub fn results(&self) -> &[ResultBand] {
        &self.results
    }

    #[must_use]
    pub fn call_to_action(&self) -> Option<&CallToAction> {
        self.call_to_action.as_ref()
    }

    /// Group invite shown next to the call to action.
    #[must_use]
    pub fn community_link(&self) -> Option<&CallToAction> {
        self.community_link.as_ref()
    }

    /// Sum of the best option of every question.
    #[must_use]
    pub fn max_score(&self) -> u32 {
        self.max_score
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn question(id: u32) -> Question {
        Question {
            id: QuestionId::new(id),
            text: format!("Q{id}"),
            options: OptionId::ALL
                .iter()
                .zip(0..)
                .map(|(letter, points)| AnswerOption {
                    id: *letter,
                    text: format!("option {letter}"),
                    points,
                })
                .collect(),
        }
    }

    pub(crate) fn band(min: u32, max: u32, status: &str) -> ResultBand {
        ResultBand {
            min,
            max,
            status: status.to_string(),
            description: String::new(),
            next_step: String::new(),
            color_var: "--color-dev".to_string(),
            bg_var: "--color-dev-bg".to_string(),
        }
    }

    pub(crate) fn draft() -> QuizDraft {
        QuizDraft {
            id: QuizId::new("quiz-test").unwrap(),
            title: "Test".to_string(),
            subtitle: String::new(),
            questions: vec![question(1), question(2)],
            results: vec![band(0, 2, "low"), band(3, 6, "high")],
            call_to_action: None,
            community_link: None,
        }
    }

    #[test]
    fn valid_draft_computes_max_score() {
        let quiz = draft().validate().unwrap();
        assert_eq!(quiz.max_score(), 6);
        assert_eq!(quiz.last_index(), 1);
        assert_eq!(quiz.question_by_id(QuestionId::new(2)).unwrap().text, "Q2");
    }

    #[test]
    fn duplicate_question_ids_are_rejected() {
        let mut d = draft();
        d.questions[1].id = QuestionId::new(1);
        assert_eq!(
            d.validate().unwrap_err(),
            QuizError::DuplicateQuestionId(QuestionId::new(1))
        );
    }

    #[test]
    fn options_must_be_a_through_d() {
        let mut d = draft();
        d.questions[0].options.pop();
        assert!(matches!(
            d.validate().unwrap_err(),
            QuizError::InvalidOptions { .. }
        ));
    }

    #[test]
    fn gaps_between_bands_are_rejected() {
        let mut d = draft();
        d.results = vec![band(0, 2, "low"), band(4, 6, "high")];
        assert_eq!(
            d.validate().unwrap_err(),
            QuizError::BandGap {
                index: 1,
                expected: 3,
                found: 4
            }
        );
    }

    #[test]
    fn bands_must_reach_max_score() {
        let mut d = draft();
        d.results = vec![band(0, 2, "low"), band(3, 5, "high")];
        assert_eq!(
            d.validate().unwrap_err(),
            QuizError::BandCoverage {
                max_score: 6,
                top: 5
            }
        );
    }

    #[test]
    fn oversized_points_are_rejected() {
        let mut d = draft();
        for question in &mut d.questions {
            question.options[3].points = u32::MAX;
        }
        d.results = vec![band(0, u32::MAX, "all")];
        assert_eq!(d.validate().unwrap_err(), QuizError::ScoreOverflow);
    }

    #[test]
    fn tone_follows_color_variable() {
        let mut b = band(0, 1, "x");
        b.color_var = "--color-risk".into();
        assert_eq!(b.tone(), BandTone::Risk);
        b.color_var = "--color-ready".into();
        assert_eq!(b.tone(), BandTone::Ready);
    }
}
