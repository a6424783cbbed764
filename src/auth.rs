//! Bearer-token authentication.
//!
//! Tokens are HS256 JWTs minted by the identity provider with a secret
//! shared through `JWT_SECRET`. The same [`TokenVerifier`] guards the REST
//! API (through the [`AuthUser`] extractor) and the relay's `auth` frame.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;
use crate::domain::{UpsertUser, UserId, UserRole};
use crate::error::HubError;

/// JWT claims carried by marketplace tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: String,
    /// Expiration time (seconds since epoch).
    pub exp: usize,
    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Given name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Profile picture URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    /// Account role; absent means [`UserRole::User`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

impl Claims {
    /// Claims for `sub` that expire after `ttl`.
    #[must_use]
    pub fn new(sub: impl Into<String>, ttl: Duration) -> Self {
        let exp = (Utc::now() + ttl).timestamp();
        Self {
            sub: sub.into(),
            exp: usize::try_from(exp).unwrap_or(0),
            email: None,
            first_name: None,
            last_name: None,
            profile_image_url: None,
            role: None,
        }
    }

    /// Sets the role claim.
    #[must_use]
    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = Some(role);
        self
    }

    /// Sets the email claim.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Profile fields to synchronize into the users table.
    #[must_use]
    pub fn to_upsert(&self) -> UpsertUser {
        UpsertUser {
            id: UserId::new(self.sub.clone()),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            profile_image_url: self.profile_image_url.clone(),
            role: self.role.unwrap_or_default(),
        }
    }
}

/// Signs and verifies HS256 tokens.
#[derive(Clone)]
pub struct TokenVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier").finish_non_exhaustive()
    }
}

impl TokenVerifier {
    /// Creates a verifier for the shared `secret`.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Signs `claims`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Internal`] if encoding fails.
    pub fn issue(&self, claims: &Claims) -> Result<String, HubError> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| HubError::Internal(format!("failed to sign token: {e}")))
    }

    /// Verifies signature and expiry and returns the claims.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Unauthorized`] for malformed, forged or expired
    /// tokens.
    pub fn verify(&self, token: &str) -> Result<Claims, HubError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| HubError::Unauthorized(format!("invalid or expired token: {e}")))
    }
}

/// The authenticated caller of a request.
///
/// Extracting it rejects the request with 401 unless a valid
/// `Authorization: Bearer <token>` header is present.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Caller's user id.
    pub id: UserId,
    /// Verified claims.
    pub claims: Claims,
}

impl AuthUser {
    /// Builds the caller identity from verified claims.
    #[must_use]
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            id: UserId::new(claims.sub.clone()),
            claims,
        }
    }

    /// Returns `true` if the token carries the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.claims.role == Some(UserRole::Admin)
    }
}

/// Extracts the token from an `Authorization: Bearer …` header value.
fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = HubError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| HubError::Unauthorized("missing Authorization header".to_string()))?;

        let token = bearer_token(header_value)
            .ok_or_else(|| HubError::Unauthorized("invalid token format".to_string()))?;

        state.tokens.verify(token).map(Self::from_claims)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn issue_then_verify() {
        let verifier = TokenVerifier::new("secret");
        let claims = Claims::new("u-1", Duration::hours(1)).with_role(UserRole::Seller);
        let Ok(token) = verifier.issue(&claims) else {
            panic!("issue failed");
        };
        let Ok(decoded) = verifier.verify(&token) else {
            panic!("verify failed");
        };
        assert_eq!(decoded, claims);
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let Ok(token) = TokenVerifier::new("a").issue(&Claims::new("u", Duration::hours(1)))
        else {
            panic!("issue failed");
        };
        assert!(matches!(
            TokenVerifier::new("b").verify(&token),
            Err(HubError::Unauthorized(_))
        ));
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let verifier = TokenVerifier::new("s");
        let Ok(token) = verifier.issue(&Claims::new("u", Duration::hours(-2))) else {
            panic!("issue failed");
        };
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
    }

    #[test]
    fn upsert_defaults_role_to_user() {
        let upsert = Claims::new("u", Duration::hours(1)).to_upsert();
        assert_eq!(upsert.role, UserRole::User);
        assert_eq!(upsert.id, UserId::new("u"));
    }
}
