use thiserror::Error;
use url::Url;

/// Spreadsheet script that collects quiz submissions.
pub const DEFAULT_WEBHOOK_URL: &str = "https://script.google.com/macros/s/AKfycbyC_WPh6rY9yRH_06M3a94WCMZRqMMmo4iVgnh6gTf4OQKxDyj3pOAu1UK9XOf7xzN_/exec";

pub const DEFAULT_WEBHOOK_TIMEOUT_SECS: u32 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebhookSettings {
    endpoint: Url,
    timeout_secs: u32,
}

#[derive(Clone, Debug, Default)]
pub struct WebhookSettingsDraft {
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u32>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WebhookSettingsError {
    #[error("invalid webhook URL: {0}")]
    InvalidEndpoint(String),

    #[error("webhook endpoint must use http or https")]
    UnsupportedScheme,

    #[error("webhook timeout must be > 0")]
    InvalidTimeout,
}

impl WebhookSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft, filling unset fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns `WebhookSettingsError` if the URL does not parse, is not
    /// http(s), or the timeout is zero.
    pub fn validate(self) -> Result<WebhookSettings, WebhookSettingsError> {
        let raw = normalize_optional(self.endpoint).unwrap_or_else(|| DEFAULT_WEBHOOK_URL.into());
        let endpoint =
            Url::parse(&raw).map_err(|err| WebhookSettingsError::InvalidEndpoint(err.to_string()))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(WebhookSettingsError::UnsupportedScheme);
        }

        let timeout_secs = self.timeout_secs.unwrap_or(DEFAULT_WEBHOOK_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(WebhookSettingsError::InvalidTimeout);
        }

        Ok(WebhookSettings {
            endpoint,
            timeout_secs,
        })
    }
}

impl WebhookSettings {
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[must_use]
    pub fn timeout_secs(&self) -> u32 {
        self.timeout_secs
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_draft_uses_defaults() {
        let settings = WebhookSettingsDraft::new().validate().unwrap();
        assert_eq!(settings.endpoint().as_str(), DEFAULT_WEBHOOK_URL);
        assert_eq!(settings.timeout_secs(), DEFAULT_WEBHOOK_TIMEOUT_SECS);
    }

    #[test]
    fn blank_endpoint_falls_back_to_default() {
        let draft = WebhookSettingsDraft {
            endpoint: Some("   ".into()),
            timeout_secs: None,
        };
        assert_eq!(draft.validate().unwrap().endpoint().as_str(), DEFAULT_WEBHOOK_URL);
    }

    #[test]
    fn rejects_bad_urls_and_schemes() {
        let bad = WebhookSettingsDraft {
            endpoint: Some("not a url".into()),
            timeout_secs: None,
        };
        assert!(matches!(
            bad.validate(),
            Err(WebhookSettingsError::InvalidEndpoint(_))
        ));

        let ftp = WebhookSettingsDraft {
            endpoint: Some("ftp://example.com/upload".into()),
            timeout_secs: None,
        };
        assert_eq!(ftp.validate(), Err(WebhookSettingsError::UnsupportedScheme));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let draft = WebhookSettingsDraft {
            endpoint: None,
            timeout_secs: Some(0),
        };
        assert_eq!(draft.validate(), Err(WebhookSettingsError::InvalidTimeout));
    }
}
