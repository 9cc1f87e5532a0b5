mod identity;
mod ids;
mod menu;
mod quiz;
mod submission;
mod webhook_settings;

pub use ids::{AttemptId, OptionId, ParseIdError, QuestionId, QuizId};

pub use menu::{MenuEntry, MenuLock};
pub use identity::{IdentityDraft, IdentityError, MIN_WHATSAPP_DIGITS, UserIdentity};
pub use quiz::{
    AnswerOption, BandTone, CallToAction, Question, QuizDefinition, QuizDraft, QuizError,
    ResultBand,
};
pub use submission::QuizSubmission;
pub use webhook_settings::{
    DEFAULT_WEBHOOK_TIMEOUT_SECS, DEFAULT_WEBHOOK_URL, WebhookSettings, WebhookSettingsDraft,
    WebhookSettingsError,
};

#[cfg(test)]
pub(crate) use quiz::tests as quiz_fixtures;
