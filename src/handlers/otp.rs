use actix_web::{HttpResponse, ResponseError, Result, web};

use crate::models::*;
use crate::services::{CHALLENGE_TTL_SECONDS, VerificationService};

#[utoipa::path(
    post,
    path = "/api/v1/otp/send",
    tag = "otp",
    request_body = SendCodeRequest,
    responses(
        (status = 200, description = "验证码已发送", body = SendCodeResponse),
        (status = 400, description = "手机号格式错误"),
        (status = 502, description = "短信发送失败")
    )
)]
pub async fn send_code(
    verification_service: web::Data<VerificationService>,
    request: web::Json<SendCodeRequest>,
) -> Result<HttpResponse> {
    match verification_service.issue_challenge(&request.phone).await {
        Ok(issued) => {
            let response = SendCodeResponse {
                phone: issued.phone,
                expires_at: issued.expires_at,
                expires_in: CHALLENGE_TTL_SECONDS,
                code: verification_service.echo_code().then_some(issued.code),
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
                response,
                "Verification code sent",
            )))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/otp/verify",
    tag = "otp",
    request_body = VerifyCodeRequest,
    responses(
        (status = 200, description = "验证成功", body = VerifyCodeResponse),
        (status = 400, description = "OTP_NOT_FOUND / OTP_EXPIRED / OTP_MISMATCH")
    )
)]
pub async fn verify_code(
    verification_service: web::Data<VerificationService>,
    request: web::Json<VerifyCodeRequest>,
) -> Result<HttpResponse> {
    match verification_service
        .submit_code(&request.phone, &request.code)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            response,
            "Phone number verified",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn otp_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/otp")
            .route("/send", web::post().to(send_code))
            .route("/verify", web::post().to(verify_code)),
    );
}
