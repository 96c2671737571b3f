use axum::http::{header, HeaderMap};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::models::{RegisterParams, User, UserRole};
use crate::db::DbClient;
use crate::{Result, CONFIG};

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Role at issue time; re-checked against routes, not the database
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(Into::into)
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    bcrypt::verify(password, password_hash).map_err(Into::into)
}

/// Signs claims with the given secret (HS256)
pub fn sign_claims(claims: &Claims, secret: &str) -> Result<String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(Into::into)
}

/// Verifies signature and expiry, returning the claims
pub fn verify_token(token: &str, secret: &str) -> Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Issues an access token for a user with the configured secret and TTL
pub fn issue_token(user: &User) -> Result<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user.id.clone(),
        role: user.role.clone(),
        iat: now,
        exp: now + CONFIG.jwt_ttl_seconds,
    };
    sign_claims(&claims, &CONFIG.jwt_secret)
}

pub fn decode_request_token(token: &str) -> Result<Claims> {
    verify_token(token, &CONFIG.jwt_secret)
}

/// Pulls a token from `Authorization: Bearer <token>` or a `token=` cookie
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(token.trim().to_string());
        }
    }

    let cookies = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())?;
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix("token=").map(str::to_string))
}

/// Creates or promotes the configured admin account at startup
pub async fn bootstrap_admin(db: &DbClient) -> Result<()> {
    let (Some(admin_email), Some(admin_password)) = (
        CONFIG.bootstrap_admin_email.as_ref(),
        CONFIG.bootstrap_admin_password.as_ref(),
    ) else {
        return Ok(());
    };

    match db.get_user_by_email(admin_email).await {
        Ok(existing) => {
            if UserRole::from(existing.role.clone()) != UserRole::Admin {
                db.update_user_role(&existing.id, UserRole::Admin.into())
                    .await?;
                info!("Promoted existing user {} to admin", admin_email);
            }
            Ok(())
        }
        Err(err) if err.is_not_found() => {
            let params = RegisterParams {
                username: "admin".to_string(),
                email: admin_email.clone(),
                password: admin_password.clone(),
            };
            let password_hash = hash_password(admin_password)?;
            let mut user = User::from_params(&params, password_hash);
            user.role = UserRole::Admin.into();
            db.insert_user(&user).await?;
            info!("Created bootstrap admin account {}", admin_email);
            Ok(())
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const TEST_SECRET: &str = "test-secret";

    fn test_claims(exp_offset: i64) -> Claims {
        let now = Utc::now().timestamp();
        Claims {
            sub: "user-1".to_string(),
            role: "student".to_string(),
            iat: now,
            exp: now + exp_offset,
        }
    }

    #[test]
    fn test_password_hash_round_trip() {
        // Low cost keeps the test fast; verification is cost-agnostic
        let hash = bcrypt::hash("correct horse", 4).unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_token_round_trip() {
        let claims = test_claims(3600);
        let token = sign_claims(&claims, TEST_SECRET).unwrap();
        let decoded = verify_token(&token, TEST_SECRET).unwrap();
        assert_eq!(decoded.sub, "user-1");
        assert_eq!(decoded.role, "student");
    }

    #[test]
    fn test_token_rejects_wrong_secret() {
        let token = sign_claims(&test_claims(3600), TEST_SECRET).unwrap();
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_token_rejects_expired() {
        // Past the default validation leeway
        let token = sign_claims(&test_claims(-3600), TEST_SECRET).unwrap();
        assert!(verify_token(&token, TEST_SECRET).is_err());
    }

    #[test]
    fn test_extract_token_from_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(extract_token(&headers), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn test_extract_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; token=abc.def.ghi; lang=en"),
        );
        assert_eq!(extract_token(&headers), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn test_extract_token_prefers_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("token=from-cookie"),
        );
        assert_eq!(extract_token(&headers), Some("from-header".to_string()));
    }

    #[test]
    fn test_extract_token_missing() {
        let headers = HeaderMap::new();
        assert_eq!(extract_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );
        assert_eq!(extract_token(&headers), None);
    }
}
