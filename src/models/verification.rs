use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendCodeRequest {
    #[schema(example = "+15551234567")]
    pub phone: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendCodeResponse {
    pub phone: String,
    pub expires_at: DateTime<Utc>,
    pub expires_in: i64,
    /// 仅在 otp.echo_code 打开时返回 (开发环境)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyCodeRequest {
    #[schema(example = "+15551234567")]
    pub phone: String,
    #[schema(example = "482913")]
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyCodeResponse {
    pub phone: String,
    pub verified: bool,
    pub expires_at: DateTime<Utc>,
}

/// 发出的验证码
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedChallenge {
    pub phone: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}
