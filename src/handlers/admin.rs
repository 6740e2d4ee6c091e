use actix_web::{HttpResponse, ResponseError, Result, web};

use crate::models::*;
use crate::services::AdminService;

#[utoipa::path(
    post,
    path = "/api/v1/admin/login",
    tag = "admin",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "登录成功", body = AdminLoginResponse),
        (status = 401, description = "用户名或密码错误")
    )
)]
pub async fn login(
    admin_service: web::Data<AdminService>,
    request: web::Json<AdminLoginRequest>,
) -> Result<HttpResponse> {
    match admin_service.login(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/admin/login", web::post().to(login));
}
