//! Access tokens and their untrusted stored shape.

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Authorization scheme label put in front of the access token.
pub const SCHEME: &str = "Bearer";

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid expiry timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

/// Current wall clock time in epoch seconds.
pub fn now() -> i64 {
    Utc::now().timestamp()
}

/// An access token together with the instant it stops being usable.
///
/// Tokens are never mutated; a refresh replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    /// Absolute expiry, in epoch seconds.
    pub expires_at: i64,
}

impl Token {
    pub fn new(access_token: impl Into<String>, expires_at: i64) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    /// Build a token whose expiry is given as an ISO 8601 timestamp.
    ///
    /// RFC 3339 timestamps keep their offset; timestamps without an offset
    /// are read as UTC.
    pub fn from_rfc3339(
        access_token: impl Into<String>,
        timestamp: &str,
    ) -> Result<Self, TokenError> {
        let expires_at = match DateTime::parse_from_rfc3339(timestamp) {
            Ok(expires_at) => expires_at.timestamp(),
            Err(_) => NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f")?
                .and_utc()
                .timestamp(),
        };
        Ok(Self::new(access_token, expires_at))
    }

    /// Build a token that stays valid for `lifetime` after `now`.
    pub fn expires_in(access_token: impl Into<String>, lifetime: Duration, now: i64) -> Self {
        let lifetime = i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX);
        Self::new(access_token, now.saturating_add(lifetime))
    }

    /// A token is unusable from the very second it expires.
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired_now(&self) -> bool {
        self.is_expired(now())
    }

    /// Value of the `Authorization` header carrying this token.
    pub fn as_header(&self) -> String {
        format!("{} {}", SCHEME, self.access_token)
    }
}

/// Token as read from a source that has not been validated yet, such as
/// deserialized storage.
///
/// Deserialization goes through [`RawToken::from_value`], so it accepts any
/// JSON shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct RawToken {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl RawToken {
    /// Read a raw token out of an arbitrary JSON value.
    ///
    /// Fields of the wrong type read as missing. Fractional expiries are
    /// rounded up, which keeps comparisons against whole-second clocks exact.
    pub fn from_value(value: &Value) -> Self {
        let access_token = value
            .get("access_token")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let expires_at = value.get("expires_at").and_then(|expires_at| {
            expires_at
                .as_i64()
                .or_else(|| expires_at.as_f64().map(|secs| secs.ceil() as i64))
        });
        Self {
            access_token,
            expires_at,
        }
    }

    /// Turn this into a [`Token`] if it has a non-empty access token and a
    /// positive expiry.
    ///
    /// The expiry is not checked against the current time.
    pub fn promote(&self) -> Option<Token> {
        let access_token = self.access_token.as_deref().unwrap_or_default();
        let expires_at = self.expires_at.unwrap_or(0);
        if access_token.is_empty() || expires_at <= 0 {
            return None;
        }
        Some(Token::new(access_token, expires_at))
    }
}

impl From<Value> for RawToken {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn expiry_boundary_counts_as_expired() {
        let token = Token::new("ok", 1_000);
        assert!(!token.is_expired(999));
        assert!(token.is_expired(1_000));
        assert!(token.is_expired(1_001));
    }

    #[test]
    fn expiry_is_evaluated_at_call_time() {
        let token = Token::new("ok", now() + 3600);
        assert!(!token.is_expired_now());
        assert!(token.is_expired(now() + 3600));
    }

    #[test]
    fn header_is_verbatim() {
        assert_eq!(Token::new("abc", 1).as_header(), "Bearer abc");
        assert_eq!(Token::new(" padded ", 1).as_header(), "Bearer  padded ");
        assert_eq!(Token::new("", 1).as_header(), "Bearer ");
    }

    #[test]
    fn from_rfc3339() {
        let token = Token::from_rfc3339("ok", "2099-01-01T00:00:00Z").unwrap();
        assert_eq!(token.access_token, "ok");
        assert_eq!(token.expires_at, 4_070_908_800);
        assert!(!token.is_expired_now());

        let token = Token::from_rfc3339("ok", "2030-06-01T14:00:00+02:00").unwrap();
        assert_eq!(token.expires_at, 1_906_545_600);

        let token = Token::from_rfc3339("ok", "2030-06-01T12:00:00").unwrap();
        assert_eq!(token.expires_at, 1_906_545_600);

        assert!(Token::from_rfc3339("ok", "next tuesday").is_err());
    }

    #[test]
    fn expires_in() {
        let token = Token::expires_in("ok", Duration::from_secs(3600), 1_000);
        assert_eq!(token.expires_at, 4_600);

        let token = Token::expires_in("ok", Duration::from_secs(u64::MAX), 1_000);
        assert_eq!(token.expires_at, i64::MAX);
    }

    #[test]
    fn raw_from_value() {
        let raw = RawToken::from_value(&json!({"access_token": "a", "expires_at": 10}));
        assert_eq!(raw.access_token.as_deref(), Some("a"));
        assert_eq!(raw.expires_at, Some(10));

        let raw = RawToken::from_value(&json!({"access_token": 5, "expires_at": "soon"}));
        assert_eq!(raw, RawToken::default());

        let raw = RawToken::from_value(&json!({"expires_at": 0.5}));
        assert_eq!(raw.expires_at, Some(1));

        let raw = RawToken::from_value(&json!({"expires_at": -0.5}));
        assert_eq!(raw.expires_at, Some(0));

        assert_eq!(RawToken::from_value(&json!("token")), RawToken::default());
    }

    #[test]
    fn raw_deserializes_with_missing_keys() {
        let raw: RawToken = serde_json::from_str(r#"{"access_token": "no-expiry"}"#).unwrap();
        assert_eq!(raw.access_token.as_deref(), Some("no-expiry"));
        assert_eq!(raw.expires_at, None);
    }

    #[test]
    fn raw_deserializes_leniently() {
        let raw: RawToken =
            serde_json::from_str(r#"{"access_token": "valid", "expires_at": 4102444800.5}"#)
                .unwrap();
        assert_eq!(raw.access_token.as_deref(), Some("valid"));
        assert_eq!(raw.expires_at, Some(4_102_444_801));

        let raw: RawToken =
            serde_json::from_str(r#"{"access_token": "valid", "expires_at": "soon"}"#).unwrap();
        assert_eq!(raw.expires_at, None);
        assert_eq!(raw.promote(), None);

        let raw: RawToken = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(raw, RawToken::default());
    }

    #[test]
    fn raw_serializes_present_fields_only() {
        let raw = RawToken {
            access_token: Some("a".into()),
            expires_at: None,
        };
        assert_eq!(serde_json::to_value(&raw).unwrap(), json!({"access_token": "a"}));
    }

    #[test]
    fn promote() {
        let raw = RawToken {
            access_token: Some("valid".into()),
            expires_at: Some(42),
        };
        assert_eq!(raw.promote(), Some(Token::new("valid", 42)));

        let unusable = [
            RawToken::default(),
            RawToken {
                access_token: Some("stale".into()),
                expires_at: Some(0),
            },
            RawToken {
                access_token: Some("negative".into()),
                expires_at: Some(-5),
            },
            RawToken {
                access_token: Some("no-expiry".into()),
                expires_at: None,
            },
            RawToken {
                access_token: Some(String::new()),
                expires_at: Some(42),
            },
            RawToken {
                access_token: None,
                expires_at: Some(42),
            },
        ];
        for raw in unusable {
            assert_eq!(raw.promote(), None, "{:?}", raw);
        }
    }
}
