use serde::{Deserialize, Serialize};

use crate::model::ids::QuizId;

/// One card of the lesson menu shown before the questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuEntry {
    /// 1-based position in the course.
    pub step: u32,
    pub quiz_id: QuizId,
    pub title: String,
    #[serde(default)]
    pub teaser: String,
    #[serde(default)]
    pub lock: Option<MenuLock>,
}

/// Why a menu entry cannot be opened yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuLock {
    /// Short availability note shown on the card.
    pub note: String,
    /// Shown when the user tries to open the entry anyway.
    pub message: String,
}

impl MenuEntry {
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }
}
