use thiserror::Error;

use crate::catalog::CatalogError;
use crate::model::{IdentityError, QuizError, WebhookSettingsError};
use crate::scoring::ScoringError;

/// Umbrella error for callers that do not care which core check failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    WebhookSettings(#[from] WebhookSettingsError),
}
