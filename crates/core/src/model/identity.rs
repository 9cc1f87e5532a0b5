use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum number of digits accepted for a `WhatsApp` number (area code + line).
pub const MIN_WHATSAPP_DIGITS: usize = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IdentityError {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("whatsapp number needs at least {MIN_WHATSAPP_DIGITS} digits, got {digits}")]
    WhatsappTooShort { digits: usize },
}

/// The lead's captured name and contact number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserIdentity {
    name: String,
    whatsapp: String,
}

/// Raw form input for an identity.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct IdentityDraft {
    pub name: String,
    pub whatsapp: String,
}

impl IdentityDraft {
    #[must_use]
    pub fn new(name: impl Into<String>, whatsapp: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            whatsapp: whatsapp.into(),
        }
    }

    /// Validate and normalize the draft.
    ///
    /// The name is trimmed and every non-digit character is stripped from the
    /// number before its length is checked.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError` if the name is blank or the number is too short.
    pub fn validate(self) -> Result<UserIdentity, IdentityError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(IdentityError::EmptyName);
        }

        let whatsapp: String = self
            .whatsapp
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        if whatsapp.len() < MIN_WHATSAPP_DIGITS {
            return Err(IdentityError::WhatsappTooShort {
                digits: whatsapp.len(),
            });
        }

        Ok(UserIdentity { name, whatsapp })
    }
}

impl UserIdentity {
    /// Rehydrate an identity from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError` if the stored record no longer validates.
    pub fn from_persisted(name: String, whatsapp: String) -> Result<Self, IdentityError> {
        IdentityDraft { name, whatsapp }.validate()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn whatsapp(&self) -> &str {
        &self.whatsapp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_formatting_from_number() {
        let identity = IdentityDraft::new("  Dr. João ", "(11) 99999-9999")
            .validate()
            .unwrap();
        assert_eq!(identity.name(), "Dr. João");
        assert_eq!(identity.whatsapp(), "11999999999");
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = IdentityDraft::new("   ", "11999999999").validate().unwrap_err();
        assert_eq!(err, IdentityError::EmptyName);
    }

    #[test]
    fn short_number_is_rejected() {
        let err = IdentityDraft::new("Ana", "11 9999-999").validate().unwrap_err();
        assert_eq!(err, IdentityError::WhatsappTooShort { digits: 9 });
    }
}
