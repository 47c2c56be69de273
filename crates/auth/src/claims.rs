use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use inkwell_core::UserId;

/// Tolerated clock skew for tokens issued "in the future".
pub const ISSUED_AT_LEEWAY_SECS: i64 = 60;

/// Bearer token claims (transport-agnostic).
///
/// Every field is optional on the wire: tokens minted before expiry was
/// introduced carry no `iat`/`exp` and name their user in `id` rather than
/// `sub`. A token with neither still verifies but does not identify anyone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthClaims {
    /// Subject: the user id as a decimal string (numbers accepted on decode).
    #[serde(
        default,
        deserialize_with = "lenient_user_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub sub: Option<String>,

    /// Subject as carried by legacy tokens. Never written by [`AuthClaims::issue`].
    #[serde(
        default,
        deserialize_with = "lenient_user_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,

    /// Issued-at (unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration (unix seconds). Absent means the token never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl AuthClaims {
    /// Claims for `subject` issued at `now`, expiring after `ttl` when given.
    pub fn issue(
        subject: UserId,
        now: DateTime<Utc>,
        ttl: Option<Duration>,
    ) -> Result<Self, TokenValidationError> {
        let exp = match ttl {
            Some(ttl) => Some(
                now.checked_add_signed(ttl)
                    .ok_or(TokenValidationError::ExpiryOutOfRange)?
                    .timestamp(),
            ),
            None => None,
        };
        Ok(Self {
            sub: Some(subject.to_string()),
            id: None,
            iat: Some(now.timestamp()),
            exp,
        })
    }

    /// The subject as a user id, if present and well-formed. `sub` wins over
    /// the legacy `id` when both are set.
    pub fn subject(&self) -> Option<UserId> {
        self.sub.as_deref().or(self.id.as_deref())?.parse().ok()
    }
}

/// Accepts a user id written either as a JSON string or as a JSON integer.
fn lenient_user_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("token expiry is out of range")]
    ExpiryOutOfRange,
}

/// Deterministically validate the time window of decoded claims.
///
/// Note: this validates the *claims* only. Signature verification happens in
/// [`crate::token`] before this is called.
pub fn validate_claims(claims: &AuthClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let now = now.timestamp();

    if let (Some(iat), Some(exp)) = (claims.iat, claims.exp) {
        if exp <= iat {
            return Err(TokenValidationError::InvalidTimeWindow);
        }
    }
    if let Some(iat) = claims.iat {
        if iat > now + ISSUED_AT_LEEWAY_SECS {
            return Err(TokenValidationError::NotYetValid);
        }
    }
    if let Some(exp) = claims.exp {
        if now >= exp {
            return Err(TokenValidationError::Expired);
        }
    }
    Ok(())
}
