use axum::Json;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::result::ApiResponse;

/// 会话令牌中的声明
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // 用户ID
    pub exp: i64,    // 过期时间
    pub iat: i64,    // 签发时间
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl Claims {
    pub fn can(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }
}

/// 签发会话令牌
///
/// 服务本身只校验令牌，签发由宿主登录流程或测试调用。
pub fn generate_session_token(
    user_id: &str,
    capabilities: &[&str],
    config: &Config,
) -> Result<(String, i64), jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let expiration = (now + Duration::seconds(config.session_expiration().as_secs() as i64))
        .timestamp();

    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiration,
        iat: now.timestamp(),
        capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.auth_secret.as_bytes()),
    )?;

    tracing::debug!("Issued session token for user: {}", user_id);
    Ok((token, expiration))
}

pub fn verify_session_token(
    token: &str,
    config: &Config,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.auth_secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

pub fn success_to_api_response<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code: error_codes::SUCCESS,
        msg: "success".into(),
        resp_data: Some(data),
    })
}

pub fn error_to_api_response<T>(code: i32, msg: String) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code,
        msg,
        resp_data: None,
    })
}

pub mod error_codes {
    pub const SUCCESS: i32 = 0;
    pub const VALIDATION_ERROR: i32 = 1000;
    pub const INVALID_NONCE: i32 = 1002;
    pub const PERMISSION_DENIED: i32 = 1003;
    pub const METHOD_NOT_ALLOWED: i32 = 1004;
    pub const RATE_LIMIT: i32 = 1005;
    pub const INTERNAL_ERROR: i32 = 5000;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_roundtrip_keeps_capabilities() {
        let config = Config::default();
        let (token, exp) = generate_session_token("1", &["manage_options"], &config).unwrap();
        let claims = verify_session_token(&token, &config).unwrap();

        assert_eq!(claims.sub, "1");
        assert_eq!(claims.exp, exp);
        assert!(claims.can("manage_options"));
        assert!(!claims.can("edit_posts"));
    }

    #[test]
    fn test_session_token_rejects_other_secret() {
        let config = Config::default();
        let (token, _) = generate_session_token("1", &[], &config).unwrap();

        let other = Config {
            auth_secret: "another-secret".to_string(),
            ..Config::default()
        };
        assert!(verify_session_token(&token, &other).is_err());
    }
}
