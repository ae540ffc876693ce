//! # Admin Identity
//!
//! Admin-only routes take an [`AdminIdentity`] argument. Tokens are issued by
//! the login service and arrive as `Authorization: Bearer <token>`.
//!
//! ## Token
//!
//! `<admin_id>.<role>.<expires_unix>.<signature>`
//!
//! - Signature is hex HMAC-SHA256 of `<admin_id>.<role>.<expires_unix>` under `ADMIN_TOKEN_SECRET`
//! - `admin_id` and `role` must not contain `.`
//! - Expired, malformed or forged tokens are all plain `Unauthorized`
use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use crate::{error::AppError, state::State};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminIdentity {
    pub admin_id: String,
    pub role: String,
}

fn mac(secret: &str, payload: &str) -> Option<Hmac<Sha256>> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(payload.as_bytes());
    Some(mac)
}

pub fn sign_token(secret: &str, admin_id: &str, role: &str, expires_unix: i64) -> Option<String> {
    if admin_id.contains('.') || role.contains('.') {
        return None;
    }

    let payload = format!("{admin_id}.{role}.{expires_unix}");
    let signature = hex::encode(mac(secret, &payload)?.finalize().into_bytes());

    Some(format!("{payload}.{signature}"))
}

pub fn verify_token(secret: &str, token: &str, now_unix: i64) -> Option<AdminIdentity> {
    let (payload, signature) = token.rsplit_once('.')?;
    let signature = hex::decode(signature).ok()?;

    mac(secret, payload)?.verify_slice(&signature).ok()?;

    let mut parts = payload.splitn(3, '.');
    let admin_id = parts.next()?;
    let role = parts.next()?;
    let expires_unix: i64 = parts.next()?.parse().ok()?;

    if expires_unix <= now_unix {
        return None;
    }

    Some(AdminIdentity {
        admin_id: admin_id.to_string(),
        role: role.to_string(),
    })
}

impl FromRequestParts<Arc<State>> for AdminIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<State>) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?;

        verify_token(&state.config.admin_token_secret, token.trim(), Utc::now().timestamp())
            .ok_or_else(|| {
                debug!("Rejected admin token");
                AppError::Unauthorized
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn signed_token_verifies() {
        let token = sign_token(SECRET, "admin1", "super_admin", 2_000).unwrap();

        assert_eq!(
            verify_token(SECRET, &token, 1_000),
            Some(AdminIdentity {
                admin_id: "admin1".to_string(),
                role: "super_admin".to_string(),
            })
        );
    }

    #[test]
    fn expired_token_fails() {
        let token = sign_token(SECRET, "admin1", "admin", 1_000).unwrap();
        assert_eq!(verify_token(SECRET, &token, 1_000), None);
    }

    #[test]
    fn tampered_token_fails() {
        let token = sign_token(SECRET, "admin1", "admin", 2_000).unwrap();
        let forged = token.replacen("admin1", "admin2", 1);

        assert_eq!(verify_token(SECRET, &forged, 1_000), None);
        assert_eq!(verify_token("other-secret", &token, 1_000), None);
        assert_eq!(verify_token(SECRET, "garbage", 1_000), None);
    }

    #[test]
    fn dotted_ids_are_refused() {
        assert_eq!(sign_token(SECRET, "a.b", "admin", 2_000), None);
    }
}
