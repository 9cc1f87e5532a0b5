use std::fmt;
use std::sync::Arc;

use funnel_core::model::{
    AttemptId, IdentityDraft, OptionId, Question, QuestionId, QuizDefinition, QuizId,
    QuizSubmission, ResultBand, UserIdentity,
};
use funnel_core::scoring::{self, BandFallback};
use funnel_core::{Clock, QuizCatalog};
use storage::repository::IdentityStore;
use tracing::{debug, info, warn};

use super::state::{QuizStep, SessionState};
use super::view::{QuestionProgress, ResultView, SessionSnapshot};
use crate::error::SessionError;
use crate::submission::SubmissionSink;

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One user's walk through a quiz: intro → menu → questions → result.
///
/// Entering `Result` dispatches exactly one submission to the sink. Calls that
/// do not fit the current step return `SessionError` and change nothing.
pub struct QuizSession {
    catalog: Arc<QuizCatalog>,
    identities: Arc<dyn IdentityStore>,
    sink: Arc<dyn SubmissionSink>,
    clock: Clock,
    fallback: BandFallback,
    attempt_id: AttemptId,
    state: SessionState,
}

impl QuizSession {
    /// Build a session around an identity that was already loaded.
    #[must_use]
    pub fn new(
        catalog: Arc<QuizCatalog>,
        identities: Arc<dyn IdentityStore>,
        sink: Arc<dyn SubmissionSink>,
        identity: Option<UserIdentity>,
    ) -> Self {
        Self {
            catalog,
            identities,
            sink,
            clock: Clock::system(),
            fallback: BandFallback::default(),
            attempt_id: AttemptId::generate(),
            state: SessionState::with_identity(identity),
        }
    }

    /// Build a session, reading the stored identity once.
    ///
    /// An unreadable identity record is logged and treated as absent.
    pub async fn start(
        catalog: Arc<QuizCatalog>,
        identities: Arc<dyn IdentityStore>,
        sink: Arc<dyn SubmissionSink>,
    ) -> Self {
        let identity = match identities.load().await {
            Ok(identity) => identity,
            Err(err) => {
                warn!(error = %err, "stored identity could not be read; starting without one");
                None
            }
        };
        Self::new(catalog, identities, sink, identity)
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: BandFallback) -> Self {
        self.fallback = fallback;
        self
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn step(&self) -> QuizStep {
        self.state.step
    }

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    #[must_use]
    pub fn identity(&self) -> Option<&UserIdentity> {
        self.state.identity.as_ref()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.state.score()
    }

    /// The active quiz, or `None` before `initialize` or for an unknown id.
    #[must_use]
    pub fn quiz(&self) -> Option<&QuizDefinition> {
        self.state
            .active_quiz_id
            .as_ref()
            .and_then(|id| self.catalog.lookup(id))
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.quiz().is_some()
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.state.step != QuizStep::Question {
            return None;
        }
        self.quiz()?.question(self.state.question_index)
    }

    /// Share of the maximum score, only meaningful once a quiz is loaded.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        self.quiz()
            .map_or(0, |quiz| scoring::percentage(self.score(), quiz.max_score()))
    }

    /// The resolved band while on the result step.
    ///
    /// `None` on any other step, or when the fallback policy rejects the score.
    #[must_use]
    pub fn result(&self) -> Option<&ResultBand> {
        if self.state.step != QuizStep::Result {
            return None;
        }
        scoring::resolve(self.quiz()?, self.score(), self.fallback).ok()
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    /// Activate `quiz_id`, discarding any progress on the previous quiz.
    ///
    /// Lands on `Menu` when an identity is already known, otherwise `Intro`.
    /// An id missing from the catalog leaves the session unloaded.
    pub fn initialize(&mut self, quiz_id: QuizId) -> QuizStep {
        self.attempt_id = AttemptId::generate();
        self.state.clear_progress();
        self.state.step = if self.state.identity.is_some() {
            QuizStep::Menu
        } else {
            QuizStep::Intro
        };

        if self.catalog.lookup(&quiz_id).is_some() {
            info!(attempt = %self.attempt_id, %quiz_id, step = %self.state.step, "quiz initialized");
        } else {
            warn!(attempt = %self.attempt_id, %quiz_id, "quiz not found in catalog");
        }
        self.state.active_quiz_id = Some(quiz_id);
        self.state.step
    }

    /// Capture the lead's identity on the intro step, persist it, and advance.
    ///
    /// A persistence failure is logged; the identity is still used for this session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Identity` for invalid input (the step stays on
    /// `Intro`), or a transition error when not on `Intro` with a loaded quiz.
    pub async fn submit_identity(&mut self, draft: IdentityDraft) -> Result<QuizStep, SessionError> {
        self.expect_step(QuizStep::Intro, "submit identity")?;
        self.loaded_quiz()?;
        let identity = draft.validate()?;

        if let Err(err) = self.identities.save(&identity).await {
            warn!(error = %err, "identity could not be persisted; keeping it for this session only");
        }
        self.state.identity = Some(identity);
        info!(attempt = %self.attempt_id, "identity captured");

        self.advance()
    }

    /// Move one step forward.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when no quiz is loaded or the session is already
    /// on `Result`.
    pub fn advance(&mut self) -> Result<QuizStep, SessionError> {
        let last_index = self.loaded_quiz()?.last_index();
        let from = self.state.step;

        match from {
            QuizStep::Intro => self.state.step = QuizStep::Menu,
            QuizStep::Menu => self.state.step = QuizStep::Question,
            QuizStep::Question if self.state.question_index < last_index => {
                self.state.question_index += 1;
            }
            QuizStep::Question => self.enter_result(),
            QuizStep::Result => {
                return Err(SessionError::InvalidTransition {
                    step: from,
                    action: "advance",
                });
            }
        }

        debug!(
            attempt = %self.attempt_id,
            %from,
            to = %self.state.step,
            index = self.state.question_index,
            "advanced"
        );
        Ok(self.state.step)
    }

    /// Store `points` for `question_id` (overwriting an earlier answer) and advance.
    ///
    /// `points` may exceed the question's best option; the band is then picked
    /// by the fallback policy.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when not on `Question`, when the question does
    /// not belong to the active quiz, or when the new total would overflow.
    pub fn record_answer(
        &mut self,
        question_id: QuestionId,
        points: u32,
    ) -> Result<QuizStep, SessionError> {
        self.expect_step(QuizStep::Question, "record an answer")?;
        if self.loaded_quiz()?.question_by_id(question_id).is_none() {
            return Err(SessionError::UnknownQuestion(question_id));
        }
        if self.state.score_with(question_id, points).is_none() {
            return Err(SessionError::ScoreOverflow {
                question: question_id,
                points,
            });
        }

        self.state.answers.insert(question_id, points);
        self.advance()
    }

    /// Answer the current question with one of its options.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when not on `Question` or the option is not offered.
    pub fn choose_option(&mut self, option: OptionId) -> Result<QuizStep, SessionError> {
        self.expect_step(QuizStep::Question, "choose an option")?;
        let quiz = self.loaded_quiz()?;
        let Some(question) = quiz.question(self.state.question_index) else {
            return Err(SessionError::InvalidTransition {
                step: self.state.step,
                action: "choose an option",
            });
        };
        let points = question
            .option(option)
            .map(|chosen| chosen.points)
            .ok_or(SessionError::UnknownOption(option))?;
        let question_id = question.id;

        self.record_answer(question_id, points)
    }

    /// Back to `Intro` with no answers. The identity and active quiz are kept.
    pub fn restart(&mut self) -> QuizStep {
        self.state.clear_progress();
        self.state.step = QuizStep::Intro;
        self.attempt_id = AttemptId::generate();
        info!(attempt = %self.attempt_id, "quiz restarted");
        self.state.step
    }

    /// Owned view of the session for rendering.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let quiz = self.quiz();
        let progress = match (quiz, self.state.step) {
            (Some(quiz), QuizStep::Question) => Some(QuestionProgress {
                number: self.state.question_index + 1,
                total: quiz.question_count(),
            }),
            _ => None,
        };
        let result = quiz.zip(self.result()).map(|(quiz, band)| ResultView {
            band: band.clone(),
            tone: band.tone(),
            score: self.score(),
            max_score: quiz.max_score(),
            percentage: self.percentage(),
            call_to_action: quiz.call_to_action().cloned(),
            community_link: quiz.community_link().cloned(),
        });
        let menu = if quiz.is_some() && self.state.step == QuizStep::Menu {
            self.catalog.menu().to_vec()
        } else {
            Vec::new()
        };

        SessionSnapshot {
            attempt_id: self.attempt_id,
            quiz_id: self.state.active_quiz_id.clone(),
            loaded: quiz.is_some(),
            title: quiz.map(|quiz| quiz.title().to_string()),
            subtitle: quiz.map(|quiz| quiz.subtitle().to_string()),
            step: self.state.step,
            identity_name: self.identity().map(|identity| identity.name().to_string()),
            menu,
            progress,
            question: self.current_question().cloned(),
            score: self.score(),
            result,
        }
    }

    //
    // ─── INTERNALS ─────────────────────────────────────────────────────────────
    //

    fn loaded_quiz(&self) -> Result<&QuizDefinition, SessionError> {
        let id = self
            .state
            .active_quiz_id
            .as_ref()
            .ok_or(SessionError::NoActiveQuiz)?;
        self.catalog
            .lookup(id)
            .ok_or_else(|| SessionError::QuizNotLoaded(id.clone()))
    }

    fn expect_step(&self, expected: QuizStep, action: &'static str) -> Result<(), SessionError> {
        if self.state.step == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                step: self.state.step,
                action,
            })
        }
    }

    /// Transition hook for `Question -> Result`; the only place a submission is made.
    fn enter_result(&mut self) {
        self.state.step = QuizStep::Result;

        let Ok(quiz) = self.loaded_quiz() else {
            return;
        };
        let score = self.state.score();
        let percentage = scoring::percentage(score, quiz.max_score());
        let status = match scoring::resolve(quiz, score, self.fallback) {
            Ok(band) => band.status.clone(),
            Err(err) => {
                warn!(attempt = %self.attempt_id, error = %err, "score has no result band");
                String::new()
            }
        };
        info!(
            attempt = %self.attempt_id,
            quiz_id = %quiz.id(),
            score,
            percentage,
            status = %status,
            "quiz completed"
        );

        let Some(identity) = self.state.identity.as_ref() else {
            warn!(attempt = %self.attempt_id, "no identity captured; skipping submission");
            return;
        };
        let submission = QuizSubmission::new(
            self.clock.now(),
            identity,
            quiz.id().clone(),
            self.state.answers.clone(),
            percentage,
            status,
        );
        self.sink.submit(submission);
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("attempt_id", &self.attempt_id)
            .field("quiz_id", &self.state.active_quiz_id)
            .field("step", &self.state.step)
            .field("question_index", &self.state.question_index)
            .field("answers_len", &self.state.answers.len())
            .field("has_identity", &self.state.identity.is_some())
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
