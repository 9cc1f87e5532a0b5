use std::sync::{Arc, Mutex};
use std::time::Duration;

use funnel_core::model::{QuizSubmission, WebhookSettings};
use reqwest::{Client, Url};
use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::SubmissionError;

/// Receiver of completed quiz attempts.
///
/// `submit` hands the payload off and returns immediately. The caller cannot
/// learn whether delivery succeeded; it is not an acknowledgment channel.
pub trait SubmissionSink: Send + Sync {
    fn submit(&self, submission: QuizSubmission);
}

/// Posts submissions as JSON to the spreadsheet webhook.
///
/// Each submission runs on its own task. The response is never read, so only
/// network-level failures are visible, and those are logged and dropped.
pub struct WebhookSink {
    client: Client,
    endpoint: Url,
    in_flight: Mutex<JoinSet<()>>,
}

impl WebhookSink {
    /// # Errors
    ///
    /// Returns `SubmissionError::Http` if the HTTP client cannot be built.
    pub fn new(settings: &WebhookSettings) -> Result<Self, SubmissionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(settings.timeout_secs())))
            .build()?;
        Ok(Self {
            client,
            endpoint: settings.endpoint().clone(),
            in_flight: Mutex::new(JoinSet::new()),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// POST one submission and wait for the network round trip.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError::Http` on connection or timeout failures.
    /// HTTP status codes are deliberately ignored.
    pub async fn send(&self, submission: &QuizSubmission) -> Result<(), SubmissionError> {
        post(self.client.clone(), self.endpoint.clone(), submission).await
    }

    /// Wait up to `timeout` for dispatched submissions to finish.
    ///
    /// Returns `true` if everything completed. Tasks still running at the
    /// deadline are aborted.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let mut pending = match self.in_flight.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => return false,
        };
        if pending.is_empty() {
            return true;
        }

        let count = pending.len();
        let finished = tokio::time::timeout(timeout, async {
            while pending.join_next().await.is_some() {}
        })
        .await
        .is_ok();
        if !finished {
            warn!(pending = count, "gave up waiting for quiz submissions");
        }
        finished
    }
}

impl SubmissionSink for WebhookSink {
    fn submit(&self, submission: QuizSubmission) {
        let Ok(handle) = Handle::try_current() else {
            warn!(quiz_id = %submission.quiz_id, "no async runtime; quiz submission dropped");
            return;
        };

        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let task = async move {
            let quiz_id = submission.quiz_id.clone();
            match post(client, endpoint, &submission).await {
                Ok(()) => debug!(%quiz_id, score = submission.score, "quiz submission sent"),
                Err(err) => warn!(%quiz_id, error = %err, "error saving quiz submission"),
            }
        };

        match self.in_flight.lock() {
            Ok(mut set) => {
                while set.try_join_next().is_some() {}
                set.spawn_on(task, &handle);
            }
            Err(_) => {
                handle.spawn(task);
            }
        }
    }
}

async fn post(
    client: Client,
    endpoint: Url,
    submission: &QuizSubmission,
) -> Result<(), SubmissionError> {
    // The body is opaque to us; a 4xx/5xx still counts as delivered.
    let _response = client.post(endpoint).json(submission).send().await?;
    Ok(())
}

/// Discards submissions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl SubmissionSink for NoopSink {
    fn submit(&self, submission: QuizSubmission) {
        debug!(quiz_id = %submission.quiz_id, "quiz submission discarded");
    }
}

/// Keeps submissions in memory, for tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    submissions: Arc<Mutex<Vec<QuizSubmission>>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything submitted so far, oldest first.
    #[must_use]
    pub fn submissions(&self) -> Vec<QuizSubmission> {
        self.submissions
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl SubmissionSink for RecordingSink {
    fn submit(&self, submission: QuizSubmission) {
        if let Ok(mut guard) = self.submissions.lock() {
            guard.push(submission);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use funnel_core::model::{IdentityDraft, QuizId, WebhookSettingsDraft};
    use funnel_core::time::fixed_now;
    use std::collections::BTreeMap;

    fn submission() -> QuizSubmission {
        let identity = IdentityDraft::new("Ana", "11999999999").validate().unwrap();
        QuizSubmission::new(
            fixed_now(),
            &identity,
            QuizId::new("quiz-1").unwrap(),
            BTreeMap::new(),
            0,
            "🔴 Zona de Risco",
        )
    }

    fn unreachable_sink() -> WebhookSink {
        // Port 9 (discard) is closed on test hosts, so connects fail fast.
        let settings = WebhookSettingsDraft {
            endpoint: Some("http://127.0.0.1:9/exec".into()),
            timeout_secs: Some(2),
        }
        .validate()
        .unwrap();
        WebhookSink::new(&settings).unwrap()
    }

    #[test]
    fn submit_without_runtime_is_dropped_quietly() {
        let sink = unreachable_sink();
        sink.submit(submission());
        assert!(sink.in_flight.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_delivery_is_swallowed() {
        let sink = unreachable_sink();
        sink.submit(submission());
        assert!(sink.drain(Duration::from_secs(10)).await);
    }

    #[tokio::test]
    async fn send_reports_network_errors() {
        let sink = unreachable_sink();
        assert!(sink.send(&submission()).await.is_err());
    }

    #[tokio::test]
    async fn drain_with_nothing_pending_is_immediate() {
        let sink = unreachable_sink();
        assert!(sink.drain(Duration::from_millis(1)).await);
    }

    #[test]
    fn sink_keeps_configured_endpoint() {
        let sink = unreachable_sink();
        assert_eq!(sink.endpoint().as_str(), "http://127.0.0.1:9/exec");
    }

    #[test]
    fn noop_sink_accepts_without_runtime() {
        let sink: Arc<dyn SubmissionSink> = Arc::new(NoopSink);
        sink.submit(submission());
        sink.submit(submission());
    }

    #[test]
    fn recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        let mut second = submission();
        second.score = 7;
        sink.submit(submission());
        sink.submit(second);

        let recorded = sink.submissions();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[1].score, 7);
    }
}
