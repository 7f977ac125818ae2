//! # Session Tokens & Caller Identity
//!
//! Stateless JWT session gate. [`TokenService`] issues HS256 tokens
//! carrying the caller's identity and role claims; the auth middleware
//! verifies the bearer token on every request and injects a
//! [`CallerIdentity`] into the request extensions.
//!
//! Verification failures do not reject the request at the middleware: the
//! request proceeds unauthenticated and the route's role requirement makes
//! the final call. A handler extracting [`CallerIdentity`] with no identity
//! present gets a 401; an identity with the wrong role gets a 403 from
//! [`CallerIdentity::require_role`].

use axum::extract::Request;
use axum::http::header;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use dispatch_core::AccountId;
use dispatch_state::{Account, Role};

use crate::error::AppError;

/// Issuer embedded in and required of every token.
pub const TOKEN_ISSUER: &str = "dispatch-api";

/// The claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Token issuer; always [`TOKEN_ISSUER`].
    pub iss: String,
    /// Subject: the account login.
    pub sub: String,
    /// The account identifier.
    pub account_id: AccountId,
    /// The account role.
    pub role: Role,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Issues and verifies session tokens.
///
/// Custom `Debug` keeps the signing key out of logs.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("key", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenService {
    /// Create a token service from a shared secret and a token lifetime
    /// in seconds.
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_secs as i64),
        }
    }

    /// Issue a signed token for an authenticated account.
    pub fn issue(
        &self,
        account: &Account,
        now: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            iss: TOKEN_ISSUER.to_string(),
            sub: account.login.clone(),
            account_id: account.id,
            role: account.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Verify a token's signature, issuer, and expiry. Returns the claims
    /// on success, `None` on any failure.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);

        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => Some(data.claims),
            Err(err) => {
                tracing::debug!(reason = %err, "token verification failed");
                None
            }
        }
    }
}

/// Identity of the authenticated caller, resolved by the auth middleware
/// and available to handlers via Axum's `FromRequestParts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// The caller's account identifier.
    pub account_id: AccountId,
    /// The caller's login.
    pub login: String,
    /// The caller's role.
    pub role: Role,
}

impl CallerIdentity {
    /// Require an exact role. There is no role hierarchy in this system:
    /// admin routes are for admins, transporter routes for transporters.
    pub fn require_role(&self, required: Role) -> Result<(), AppError> {
        if self.role == required {
            Ok(())
        } else {
            tracing::warn!(
                login = %self.login,
                role = %self.role,
                required = %required,
                "access denied: insufficient role"
            );
            Err(AppError::Forbidden(format!(
                "role {} required",
                required.as_str()
            )))
        }
    }
}

impl From<Claims> for CallerIdentity {
    fn from(claims: Claims) -> Self {
        Self {
            account_id: claims.account_id,
            login: claims.sub,
            role: claims.role,
        }
    }
}

/// Extract the identity the auth middleware injected. Returns 401 when the
/// request carried no valid token.
#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("authentication required".into()))
    }
}

/// Resolve the bearer token, if any, into a [`CallerIdentity`].
///
/// Never rejects: a missing, malformed, expired, or forged token simply
/// leaves the request unauthenticated. Route-level role requirements are
/// the authorization decision point.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let tokens = request.extensions().get::<TokenService>().cloned();

    if let Some(tokens) = tokens {
        let bearer = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        if let Some(token) = bearer {
            if let Some(claims) = tokens.verify(token) {
                request
                    .extensions_mut()
                    .insert(CallerIdentity::from(claims));
            }
        }
    }

    next.run(request).await
}
