use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

use crate::model::ids::{QuestionId, QuizId};
use crate::model::identity::UserIdentity;
use crate::scoring::total_points;

/// Payload sent to the spreadsheet webhook when a quiz attempt completes.
///
/// Serializes as camelCase JSON; `answers` keys become the question ids as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSubmission {
    #[serde(serialize_with = "rfc3339_millis")]
    pub timestamp: DateTime<Utc>,
    pub name: String,
    pub whatsapp: String,
    pub quiz_id: QuizId,
    pub answers: BTreeMap<QuestionId, u32>,
    pub score: u32,
    pub percentage: u32,
    pub result_status: String,
}

impl QuizSubmission {
    #[must_use]
    pub fn new(
        timestamp: DateTime<Utc>,
        identity: &UserIdentity,
        quiz_id: QuizId,
        answers: BTreeMap<QuestionId, u32>,
        percentage: u32,
        result_status: impl Into<String>,
    ) -> Self {
        let score = total_points(answers.values().copied()).unwrap_or(u32::MAX);
        Self {
            timestamp,
            name: identity.name().to_string(),
            whatsapp: identity.whatsapp().to_string(),
            quiz_id,
            answers,
            score,
            percentage,
            result_status: result_status.into(),
        }
    }
}

fn rfc3339_millis<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::identity::IdentityDraft;
    use crate::time::fixed_now;

    #[test]
    fn serializes_in_webhook_shape() {
        let identity = IdentityDraft::new("Ana", "11999999999").validate().unwrap();
        let answers = BTreeMap::from([(QuestionId::new(1), 3), (QuestionId::new(2), 1)]);
        let submission = QuizSubmission::new(
            fixed_now(),
            &identity,
            QuizId::new("quiz-1").unwrap(),
            answers,
            22,
            "🔴 Zona de Risco",
        );

        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(json["timestamp"], "2023-11-14T22:13:20.000Z");
        assert_eq!(json["name"], "Ana");
        assert_eq!(json["quizId"], "quiz-1");
        assert_eq!(json["answers"]["1"], 3);
        assert_eq!(json["answers"]["2"], 1);
        assert_eq!(json["score"], 4);
        assert_eq!(json["percentage"], 22);
        assert_eq!(json["resultStatus"], "🔴 Zona de Risco");
    }

    #[test]
    fn score_saturates_instead_of_wrapping() {
        let identity = IdentityDraft::new("Ana", "11999999999").validate().unwrap();
        let answers = BTreeMap::from([(QuestionId::new(1), u32::MAX), (QuestionId::new(2), 5)]);
        let submission = QuizSubmission::new(
            fixed_now(),
            &identity,
            QuizId::new("quiz-1").unwrap(),
            answers,
            0,
            "",
        );
        assert_eq!(submission.score, u32::MAX);
    }
}
