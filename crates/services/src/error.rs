//! Shared error types for the services crate.

use thiserror::Error;

use funnel_core::model::{IdentityError, OptionId, QuestionId, QuizId};

use crate::sessions::QuizStep;

/// Errors emitted by `QuizSession` mutators.
///
/// Every error leaves the session state exactly as it was before the call.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no quiz has been initialized")]
    NoActiveQuiz,
    #[error("quiz {0} is not loaded")]
    QuizNotLoaded(QuizId),
    #[error("cannot {action} on the {step} step")]
    InvalidTransition { step: QuizStep, action: &'static str },
    #[error("question {0} is not part of the active quiz")]
    UnknownQuestion(QuestionId),
    #[error("option {0} is not offered by the current question")]
    UnknownOption(OptionId),
    #[error("{points} points for question {question} would overflow the score")]
    ScoreOverflow { question: QuestionId, points: u32 },
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// Errors from building or using the webhook client.
///
/// These never reach the session: failures after dispatch are logged only.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubmissionError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
