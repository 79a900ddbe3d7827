//! Discord authorization token.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Token sent as the `Authorization` header on REST calls.
///
/// Never printed in full; the buffer is wiped on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct AuthToken {
    value: String,
}

impl AuthToken {
    /// Wraps a token after trimming surrounding whitespace. A `Bot ` prefix
    /// is kept as given. Returns `None` for an empty token or one containing
    /// inner whitespace.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let mut raw = value.into();
        let trimmed = raw.trim();
        let body = trimmed.strip_prefix("Bot ").unwrap_or(trimmed);

        let valid = !body.is_empty() && !body.chars().any(char::is_whitespace);
        let token = valid.then(|| Self {
            value: trimmed.to_string(),
        });
        raw.zeroize();
        token
    }

    /// Raw token, for the `Authorization` header.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns masked token for display.
    #[must_use]
    pub fn masked(&self) -> String {
        let len = self.value.chars().count();
        if len <= 10 {
            return "*".repeat(len);
        }

        let prefix: String = self.value.chars().take(4).collect();
        let suffix: String = self.value.chars().skip(len - 4).collect();
        format!("{prefix}...{suffix}")
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("value", &self.masked())
            .finish()
    }
}

impl fmt::Display for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "MTIzNDU2Nzg5MDEyMzQ1Njc4OQ.XXXXXX.YYYYYYYYYYYYYYYYYYYYYYYYYYYY";

    #[test]
    fn test_trims_whitespace() {
        let token = AuthToken::new(format!("  {TOKEN}\n")).unwrap();
        assert_eq!(token.as_str(), TOKEN);
    }

    #[test]
    fn test_bot_prefix_kept() {
        let token = AuthToken::new(format!("Bot {TOKEN}")).unwrap();
        assert!(token.as_str().starts_with("Bot "));
    }

    #[test]
    fn test_rejects_empty_and_spaced() {
        assert!(AuthToken::new("   ").is_none());
        assert!(AuthToken::new("abc def").is_none());
    }

    #[test]
    fn test_debug_does_not_leak_token() {
        let token = AuthToken::new(TOKEN).unwrap();
        let debug_output = format!("{token:?}");

        assert!(debug_output.contains("..."));
        assert!(!debug_output.contains(TOKEN));
    }
}
