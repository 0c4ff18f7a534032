use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Company,
    Customer,
}

impl TryFrom<u8> for Role {
    type Error = SessionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Role::Admin),
            2 => Ok(Role::Company),
            3 => Ok(Role::Customer),
            other => Err(SessionError::UnknownRole(other)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Option<serde_json::Value>,
    role: u8,
    #[serde(default)]
    exp: Option<i64>,
}

/// The signed-in user as seen by this application.
///
/// Built from the backend-issued token. The signature is not checked here;
/// the backend verifies it on every call it receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthSession {
    pub subject: String,
    pub role: Role,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthSession {
    pub fn from_token(token: &str, now: DateTime<Utc>) -> Result<Self, SessionError> {
        let malformed = |reason: &str| SessionError::MalformedToken(reason.to_string());

        let mut parts = token.trim().split('.');
        let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(_), Some(payload), Some(_), None) => payload,
            _ => return Err(malformed("expected three segments")),
        };
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|_| malformed("payload is not base64url"))?;
        let claims: Claims = serde_json::from_slice(&bytes).map_err(|_| malformed("payload is not a claims object"))?;

        let role = Role::try_from(claims.role)?;
        let expires_at = match claims.exp {
            Some(exp) => Some(DateTime::<Utc>::from_timestamp(exp, 0).ok_or_else(|| malformed("exp out of range"))?),
            None => None,
        };
        let subject = match claims.sub {
            Some(serde_json::Value::String(sub)) => sub,
            Some(other) => other.to_string(),
            None => String::new(),
        };

        let session = Self {
            subject,
            role,
            expires_at,
        };
        if session.is_expired(now) {
            return Err(SessionError::Expired);
        }
        Ok(session)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }

    /// Companies and admins maintain opening hours and tariffs
    pub fn can_manage_schedules(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Company)
    }

    pub fn can_book(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Customer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(claims: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{}.{}.signature", header, payload)
    }

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn decodes_role_and_subject() {
        let session = AuthSession::from_token(
            &token(serde_json::json!({"sub": 42, "role": 2, "exp": 1_800_000_000})),
            now(),
        )
        .unwrap();

        assert_eq!(session.subject, "42");
        assert_eq!(session.role, Role::Company);
        assert!(session.can_manage_schedules());
        assert!(!session.can_book());
    }

    #[test]
    fn customers_cannot_manage_schedules() {
        let session = AuthSession::from_token(&token(serde_json::json!({"sub": "c-1", "role": 3})), now()).unwrap();
        assert!(!session.can_manage_schedules());
        assert!(session.can_book());
    }

    #[test]
    fn rejects_expired_unknown_and_garbage_tokens() {
        let expired = token(serde_json::json!({"role": 1, "exp": 1_600_000_000}));
        assert_eq!(AuthSession::from_token(&expired, now()), Err(SessionError::Expired));

        let unknown = token(serde_json::json!({"role": 9}));
        assert_eq!(AuthSession::from_token(&unknown, now()), Err(SessionError::UnknownRole(9)));

        assert!(matches!(
            AuthSession::from_token("not-a-token", now()),
            Err(SessionError::MalformedToken(_))
        ));
        assert!(matches!(
            AuthSession::from_token("a.!!!.c", now()),
            Err(SessionError::MalformedToken(_))
        ));
    }
}
