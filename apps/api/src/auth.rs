//! Bearer-token authentication. Produces the owner id every roast operation
//! runs under; nothing past this middleware looks at tokens.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::Config;
use crate::errors::AppError;
use crate::state::AppState;

const DEFAULT_DEV_USER: &str = "test-user-123";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| {
            AppError::Unauthorized("Missing or invalid authorization header".to_string())
        })?;

    let user = authenticate(token, &state.config)?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

pub fn authenticate(token: &str, config: &Config) -> Result<AuthUser, AppError> {
    if config.dev_auth_active() {
        if let Some(user) = dev_user(token) {
            warn!("Using development authentication bypass for {}", user.id);
            return Ok(user);
        }
    }

    let secret = config
        .jwt_secret
        .as_deref()
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))?;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

    if data.claims.sub.is_empty() {
        return Err(AppError::Unauthorized("Token has no subject".to_string()));
    }
    Ok(AuthUser {
        id: data.claims.sub,
    })
}

/// `dev-<uid>` authenticates as `<uid>`; `dev-token-123` and a bare `dev-`
/// map to the default dev user.
fn dev_user(token: &str) -> Option<AuthUser> {
    let uid = token.strip_prefix("dev-")?;
    let id = match uid {
        "" | "token-123" => DEFAULT_DEV_USER,
        other => other,
    };
    Some(AuthUser { id: id.to_string() })
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{encode, EncodingKey, Header};

    use super::*;
    use crate::config::StorageKind;
    use crate::roasts::calendar::CalendarZone;

    fn config(app_env: &str, enable_dev_auth: bool, jwt_secret: Option<&str>) -> Config {
        Config {
            port: 0,
            rust_log: "info".to_string(),
            app_env: app_env.to_string(),
            storage: StorageKind::Memory,
            database_url: None,
            enable_dev_auth,
            jwt_secret: jwt_secret.map(str::to_string),
            allowed_origins: vec![],
            calendar_zone: CalendarZone::utc(),
        }
    }

    fn sign(sub: &str, secret: &str, exp: usize) -> String {
        encode(
            &Header::default(),
            &Claims {
                sub: sub.to_string(),
                exp,
            },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn in_an_hour() -> usize {
        (chrono::Utc::now().timestamp() + 3600) as usize
    }

    #[test]
    fn test_dev_tokens_map_to_users() {
        let cfg = config("development", true, None);
        assert_eq!(authenticate("dev-alice", &cfg).unwrap().id, "alice");
        assert_eq!(authenticate("dev-token-123", &cfg).unwrap().id, DEFAULT_DEV_USER);
        assert_eq!(authenticate("dev-", &cfg).unwrap().id, DEFAULT_DEV_USER);
    }

    #[test]
    fn test_dev_tokens_ignored_outside_development() {
        let cfg = config("production", true, None);
        assert!(matches!(
            authenticate("dev-alice", &cfg),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_dev_tokens_ignored_when_disabled() {
        let cfg = config("development", false, None);
        assert!(authenticate("dev-alice", &cfg).is_err());
    }

    #[test]
    fn test_signed_token_yields_subject() {
        let cfg = config("production", false, Some("s3cret"));
        let token = sign("owner-42", "s3cret", in_an_hour());
        assert_eq!(authenticate(&token, &cfg).unwrap().id, "owner-42");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let cfg = config("production", false, Some("s3cret"));
        let token = sign("owner-42", "other", in_an_hour());
        assert!(authenticate(&token, &cfg).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let cfg = config("production", false, Some("s3cret"));
        let token = sign("owner-42", "s3cret", 1_000);
        assert!(authenticate(&token, &cfg).is_err());
    }

    #[test]
    fn test_empty_subject_rejected() {
        let cfg = config("production", false, Some("s3cret"));
        let token = sign("", "s3cret", in_an_hour());
        assert!(authenticate(&token, &cfg).is_err());
    }
}
