#![forbid(unsafe_code)]

pub mod error;
pub mod sessions;
pub mod submission;

pub use funnel_core::{BandFallback, Clock};
pub use sessions as session;

pub use error::{SessionError, SubmissionError};
pub use submission::{NoopSink, RecordingSink, SubmissionSink, WebhookSink};

pub use sessions::{
    QuestionProgress, QuizSession, QuizStep, ResultView, SessionSnapshot, SessionState,
};
