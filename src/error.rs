use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::utils::{error_codes, error_to_api_response};

/// 校验失败的类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    // 请求守卫
    RateLimitExceeded,
    InsufficientPermissions,
    InvalidRequestMethod,
    InvalidNonce,
    // 字段校验
    InvalidUsername,
    InvalidUsernameLength,
    InvalidUsernameFormat,
    InvalidUsernameCase,
    InvalidDateFormat,
    InvalidDate,
    FutureDate,
    InvalidImportLimit,
    InvalidEmail,
    InvalidUrl,
    // 请求体与基础设施
    InvalidPayload,
    Internal,
}

impl ErrorKind {
    /// 面向用户的默认文案
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::RateLimitExceeded => "Too many requests. Please try again later.",
            ErrorKind::InsufficientPermissions => {
                "You do not have sufficient permissions to perform this action."
            }
            ErrorKind::InvalidRequestMethod => "Invalid request method.",
            ErrorKind::InvalidNonce => "Security check failed. Please refresh the page and try again.",
            ErrorKind::InvalidUsername => "Username cannot be empty.",
            ErrorKind::InvalidUsernameLength => "Username must be between 2 and 15 characters.",
            ErrorKind::InvalidUsernameFormat => {
                "Username may only contain letters, numbers and single hyphens between characters."
            }
            ErrorKind::InvalidUsernameCase => "Username must be lowercase.",
            ErrorKind::InvalidDateFormat => "Date must be in YYYY-MM-DD format.",
            ErrorKind::InvalidDate => "Date is not a valid calendar date.",
            ErrorKind::FutureDate => "Date cannot be in the future.",
            ErrorKind::InvalidImportLimit => "Import limit must be between 1 and 100.",
            ErrorKind::InvalidEmail => "Email address is not valid.",
            ErrorKind::InvalidUrl => "URL is not valid.",
            ErrorKind::InvalidPayload => "Request body must be a JSON object.",
            ErrorKind::Internal => "Something went wrong. Please try again later.",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ErrorKind::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::InsufficientPermissions | ErrorKind::InvalidNonce => StatusCode::FORBIDDEN,
            ErrorKind::InvalidRequestMethod => StatusCode::METHOD_NOT_ALLOWED,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            ErrorKind::RateLimitExceeded => error_codes::RATE_LIMIT,
            ErrorKind::InsufficientPermissions => error_codes::PERMISSION_DENIED,
            ErrorKind::InvalidRequestMethod => error_codes::METHOD_NOT_ALLOWED,
            ErrorKind::InvalidNonce => error_codes::INVALID_NONCE,
            ErrorKind::Internal => error_codes::INTERNAL_ERROR,
            _ => error_codes::VALIDATION_ERROR,
        }
    }
}

/// 带类别和文案的校验错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ValidationError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.message().to_string(),
        }
    }

    pub fn with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<ErrorKind> for ValidationError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// 所有校验规则与请求守卫的统一返回类型
pub type ValidationResult = Result<(), ValidationError>;

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        let status = self.kind.status();
        (
            status,
            error_to_api_response::<()>(self.kind.code(), self.message),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_carries_default_message() {
        let err = ValidationError::new(ErrorKind::InvalidNonce);
        assert_eq!(err.kind, ErrorKind::InvalidNonce);
        assert_eq!(err.message, ErrorKind::InvalidNonce.message());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ErrorKind::RateLimitExceeded.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ErrorKind::InsufficientPermissions.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ErrorKind::InvalidRequestMethod.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(ErrorKind::FutureDate.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorKind::Internal.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_message_hides_details() {
        let err = ValidationError::new(ErrorKind::Internal);
        assert!(!err.message.to_lowercase().contains("redis"));
    }
}
