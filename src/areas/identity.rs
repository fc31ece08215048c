//! Author identity for new commits

use crate::areas::config::UserSettings;
use crate::artifacts::objects::commit::Author;
use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};

pub const AUTHOR_NAME_VAR: &str = "GIT_AUTHOR_NAME";
pub const AUTHOR_EMAIL_VAR: &str = "GIT_AUTHOR_EMAIL";
pub const AUTHOR_DATE_VAR: &str = "GIT_AUTHOR_DATE";

/// Supplies the author of the next commit
pub trait IdentityProvider {
    fn author(&self) -> Result<Author>;
}

/// Reads `GIT_AUTHOR_NAME`, `GIT_AUTHOR_EMAIL` and optionally `GIT_AUTHOR_DATE`,
/// falling back to the `[user]` settings for name and email
#[derive(Debug, Clone, Default)]
pub struct EnvIdentity {
    fallback: Option<UserSettings>,
}

impl EnvIdentity {
    pub fn new(fallback: Option<UserSettings>) -> Self {
        EnvIdentity { fallback }
    }

    fn parse_date(date: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(date)
            .or_else(|_| DateTime::parse_from_rfc2822(date))
            .or_else(|_| DateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S %z"))
            .map(|date| date.with_timezone(&Utc))
            .ok()
    }
}

impl IdentityProvider for EnvIdentity {
    fn author(&self) -> Result<Author> {
        let fallback = self.fallback.as_ref();

        let name = std::env::var(AUTHOR_NAME_VAR)
            .ok()
            .or_else(|| fallback.map(|user| user.name.clone()))
            .ok_or_else(|| {
                Error::InvalidState(format!(
                    "author unknown: set {AUTHOR_NAME_VAR} or [user] name in the settings"
                ))
            })?;
        let email = std::env::var(AUTHOR_EMAIL_VAR)
            .ok()
            .or_else(|| fallback.map(|user| user.email.clone()))
            .ok_or_else(|| {
                Error::InvalidState(format!(
                    "author unknown: set {AUTHOR_EMAIL_VAR} or [user] email in the settings"
                ))
            })?;

        match std::env::var(AUTHOR_DATE_VAR)
            .ok()
            .and_then(|date| Self::parse_date(&date))
        {
            Some(timestamp) => Ok(Author::new_with_timestamp(name, email, timestamp)),
            None => Ok(Author::new(name, email)),
        }
    }
}

/// A fixed identity, stamped with the current time on every call
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    name: String,
    email: String,
}

impl StaticIdentity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        StaticIdentity {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn author(&self) -> Result<Author> {
        Ok(Author::new(self.name.clone(), self.email.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case("2025-06-04T12:00:00Z")]
    #[case("Wed, 4 Jun 2025 12:00:00 +0000")]
    #[case("2025-06-04 14:00:00 +0200")]
    fn accepts_common_date_formats(#[case] date: &str) {
        assert_eq!(
            EnvIdentity::parse_date(date),
            Some(Utc.with_ymd_and_hms(2025, 6, 4, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn static_identity_never_fails() {
        let author = StaticIdentity::new("Jane", "jane@example.com").author().unwrap();

        assert_eq!(author.display_name(), "Jane <jane@example.com>");
    }
}
