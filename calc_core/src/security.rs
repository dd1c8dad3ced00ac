//! Internal-key authentication for calculator requests.
//!
//! Callers present the shared key either as `X-PTP-Internal-Key: <key>` or
//! as `Authorization: Bearer <key>`. The dedicated header wins when both are
//! present.

use tracing::warn;

/// Header carrying the key directly
pub const INTERNAL_KEY_HEADER: &str = "X-PTP-Internal-Key";

/// Credentials as presented by the caller (raw header values)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub internal_key: Option<String>,
    pub authorization: Option<String>,
}

impl Credentials {
    /// Credentials carrying the key in the internal-key header
    pub fn internal_key(key: impl Into<String>) -> Self {
        Credentials {
            internal_key: Some(key.into()),
            authorization: None,
        }
    }

    /// Credentials carrying the key as a bearer token
    pub fn bearer(token: impl AsRef<str>) -> Self {
        Credentials {
            internal_key: None,
            authorization: Some(format!("Bearer {}", token.as_ref())),
        }
    }

    /// Token to check, if any was presented in a usable form
    pub fn token(&self) -> Option<&str> {
        if let Some(key) = self.internal_key.as_deref().filter(|k| !k.is_empty()) {
            return Some(key);
        }
        let (scheme, token) = self.authorization.as_deref()?.split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
            return None;
        }
        Some(token)
    }
}

/// Why a request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// No key configured on the server side
    Misconfigured,
    Missing,
    Invalid,
}

impl AuthFailure {
    pub fn status(&self) -> u16 {
        match self {
            AuthFailure::Misconfigured => 500,
            AuthFailure::Missing | AuthFailure::Invalid => 401,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthFailure::Misconfigured => "server_error",
            AuthFailure::Missing | AuthFailure::Invalid => "unauthorized",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AuthFailure::Misconfigured => "Internal auth misconfigured.",
            AuthFailure::Missing => "Missing internal authentication header.",
            AuthFailure::Invalid => "Invalid internal authentication header.",
        }
    }
}

/// Check presented credentials against the expected key
pub fn authorize(expected: Option<&str>, credentials: &Credentials) -> Result<(), AuthFailure> {
    let Some(expected) = expected.filter(|k| !k.is_empty()) else {
        warn!("internal key not configured; refusing request");
        return Err(AuthFailure::Misconfigured);
    };
    let Some(token) = credentials.token() else {
        warn!("request without internal authentication header");
        return Err(AuthFailure::Missing);
    };
    if token != expected {
        warn!("request with invalid internal key");
        return Err(AuthFailure::Invalid);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_custom_header() {
        assert_eq!(authorize(Some("secret"), &Credentials::internal_key("secret")), Ok(()));
    }

    #[test]
    fn test_accepts_bearer_header() {
        assert_eq!(authorize(Some("secret"), &Credentials::bearer("secret")), Ok(()));
        let lowercase = Credentials {
            internal_key: None,
            authorization: Some("bearer secret".to_string()),
        };
        assert_eq!(authorize(Some("secret"), &lowercase), Ok(()));
    }

    #[test]
    fn test_missing_headers() {
        let err = authorize(Some("secret"), &Credentials::default()).unwrap_err();
        assert_eq!(err, AuthFailure::Missing);
        assert_eq!(err.status(), 401);
        assert_eq!(err.error_code(), "unauthorized");
    }

    #[test]
    fn test_rejects_invalid_token() {
        let err = authorize(Some("secret"), &Credentials::internal_key("wrong")).unwrap_err();
        assert_eq!(err, AuthFailure::Invalid);
        assert_eq!(err.status(), 401);
    }

    #[test]
    fn test_unusable_authorization_header() {
        for header in ["Basic secret", "Bearer", "Bearer ", "secret"] {
            let credentials = Credentials {
                internal_key: None,
                authorization: Some(header.to_string()),
            };
            assert_eq!(credentials.token(), None, "{header}");
        }
    }

    #[test]
    fn test_custom_header_wins() {
        let credentials = Credentials {
            internal_key: Some("secret".to_string()),
            authorization: Some("Bearer wrong".to_string()),
        };
        assert_eq!(authorize(Some("secret"), &credentials), Ok(()));
    }

    #[test]
    fn test_unconfigured_key() {
        let err = authorize(None, &Credentials::internal_key("secret")).unwrap_err();
        assert_eq!(err.status(), 500);
        assert_eq!(err.error_code(), "server_error");
        assert_eq!(err.message(), "Internal auth misconfigured.");
    }
}
