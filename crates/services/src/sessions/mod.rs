mod service;
mod state;
mod view;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use service::QuizSession;
pub use state::{QuizStep, SessionState};
pub use view::{QuestionProgress, ResultView, SessionSnapshot};
