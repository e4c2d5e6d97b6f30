use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    http::{StatusCode, header, request::Parts},
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use uuid::Uuid;

use crate::{
    access::{self, UserAccess},
    config::{AppConfig, Env},
    directory::DirectoryState,
    models::{SessionProfile, UserRecord},
};

/// Claims
///
/// Payload expected inside a session token. Grants are not part of the token;
/// they are read from the directory on every request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the directory id of the user.
    pub sub: Uuid,
    /// Expiration time (seconds since epoch).
    pub exp: usize,
    /// Issued at (seconds since epoch).
    pub iat: usize,
}

/// Session
///
/// The explicit, per-request session context. Everything downstream of the
/// authentication boundary (handlers, access checks) receives this value
/// instead of consulting ambient token storage.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub email: String,
    /// Validated grants, built once from the directory record.
    pub access: UserAccess,
    /// Token expiry; `None` for the local header bypass.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn from_record(record: &UserRecord, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            id: record.id,
            email: record.email.clone(),
            access: UserAccess::from_record(record),
            expires_at,
        }
    }

    pub fn is_admin(&self) -> bool {
        access::is_admin_user(Some(&self.access))
    }

    pub fn allows(&self, path: &str) -> bool {
        access::is_path_allowed(path, Some(&self.access))
    }

    pub fn landing_path(&self) -> String {
        access::default_allowed_path(Some(&self.access))
    }

    pub fn profile(&self) -> SessionProfile {
        SessionProfile {
            id: self.id,
            email: self.email.clone(),
            role: self.access.role,
            role_label: self.access.role_label.clone(),
            systems: self.access.systems.iter().cloned().collect(),
            pages: self
                .access
                .pages
                .iter()
                .map(|grant| grant.route.clone())
                .collect(),
            landing_path: self.landing_path(),
            expires_at: self.expires_at,
        }
    }
}

/// Session Extractor Implementation
///
/// Makes `Session` usable as a handler argument. Resolution order:
/// 1. Local bypass: in `Env::Local`, an `x-user-id` header naming a directory user.
/// 2. Bearer token: decoded and validated against the configured secret.
/// 3. Directory lookup: the user must still exist; its current grants are used.
///
/// Rejection: `StatusCode::UNAUTHORIZED` on any failure.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    DirectoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let directory = DirectoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        // 1. Local Development Bypass
        if config.env == Env::Local {
            if let Some(user_id) = parts
                .headers
                .get("x-user-id")
                .and_then(|value| value.to_str().ok())
                .and_then(|id| Uuid::parse_str(id).ok())
            {
                if let Some(record) = directory.get_user(user_id).await {
                    return Ok(Session::from_record(&record, None));
                }
            }
        }

        // 2. Token Extraction
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("Rejected expired session token"),
                other => tracing::debug!(reason = ?other, "Rejected invalid session token"),
            }
            StatusCode::UNAUTHORIZED
        })?;

        // 3. Directory Lookup
        let claims = token_data.claims;
        let record = directory.get_user(claims.sub).await.ok_or_else(|| {
            tracing::debug!(user_id = %claims.sub, "Token subject not found in user directory");
            StatusCode::UNAUTHORIZED
        })?;

        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp as i64, 0);
        Ok(Session::from_record(&record, expires_at))
    }
}

/// Optional Session Extractor
///
/// For public routes that behave differently for anonymous visitors (e.g. the
/// landing route). Any authentication failure simply yields `None`.
impl<S> OptionalFromRequestParts<S> for Session
where
    S: Send + Sync,
    DirectoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(<Session as FromRequestParts<S>>::from_request_parts(parts, state)
            .await
            .ok())
    }
}
