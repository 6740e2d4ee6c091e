use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use sea_orm::{DbErr, SqlErr};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// 手机验证码流程的业务错误，均可由客户端重新获取验证码来纠正
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationError {
    #[error("No verification code found for this phone number")]
    NotFound,

    #[error("Verification code has expired")]
    Expired,

    #[error("Invalid verification code")]
    Mismatch,

    #[error("Phone number must be verified with a code before this action")]
    NotVerified,
}

impl VerificationError {
    pub fn code(&self) -> &'static str {
        match self {
            VerificationError::NotFound => "OTP_NOT_FOUND",
            VerificationError::Expired => "OTP_EXPIRED",
            VerificationError::Mismatch => "OTP_MISMATCH",
            VerificationError::NotVerified => "PHONE_NOT_VERIFIED",
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(DbErr),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        // 连接层失败与业务失败区分开
        if matches!(err, DbErr::Conn(_) | DbErr::ConnectionAcquire(..)) {
            return AppError::Unavailable(err.to_string());
        }
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => AppError::Conflict(detail),
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                AppError::ValidationError("Referenced record does not exist".to_string())
            }
            _ => AppError::DatabaseError(err),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Verification(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ExternalApiError(_) | AppError::ReqwestError(_) => StatusCode::BAD_GATEWAY,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, message) = match self {
            AppError::Verification(err) => {
                log::warn!("Verification rejected: {err}");
                (err.code(), err.to_string())
            }
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                ("VALIDATION_ERROR", msg.clone())
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                ("AUTH_ERROR", msg.clone())
            }
            AppError::JwtError(err) => {
                log::warn!("Token rejected: {err}");
                ("AUTH_ERROR", "Invalid access token".to_string())
            }
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone()),
            AppError::Conflict(msg) => {
                log::warn!("Conflict: {msg}");
                ("CONFLICT", "Record already exists".to_string())
            }
            AppError::ExternalApiError(msg) => {
                log::error!("External API error: {msg}");
                ("EXTERNAL_API_ERROR", msg.clone())
            }
            AppError::ReqwestError(err) => {
                log::error!("External request failed: {err}");
                ("EXTERNAL_API_ERROR", "External service request failed".to_string())
            }
            AppError::Unavailable(msg) => {
                log::error!("Storage unavailable: {msg}");
                (
                    "SERVICE_UNAVAILABLE",
                    "Service temporarily unavailable".to_string(),
                )
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                ("DATABASE_ERROR", "Database error".to_string())
            }
            _ => {
                log::error!("Internal error: {self}");
                ("INTERNAL_ERROR", "Internal server error".to_string())
            }
        };

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::RuntimeErr;

    #[test]
    fn test_verification_errors_are_client_errors() {
        for err in [
            VerificationError::NotFound,
            VerificationError::Expired,
            VerificationError::Mismatch,
            VerificationError::NotVerified,
        ] {
            assert_eq!(AppError::from(err).status_code(), StatusCode::BAD_REQUEST);
        }
        assert_eq!(VerificationError::NotVerified.code(), "PHONE_NOT_VERIFIED");
    }

    #[test]
    fn test_connection_failure_is_unavailable() {
        let err = AppError::from(DbErr::Conn(RuntimeErr::Internal("refused".into())));
        assert!(matches!(err, AppError::Unavailable(_)));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_other_db_errors_stay_internal() {
        let err = AppError::from(DbErr::Custom("boom".into()));
        assert!(matches!(err, AppError::DatabaseError(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
