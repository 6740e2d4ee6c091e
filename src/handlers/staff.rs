use actix_web::{HttpResponse, ResponseError, Result, web};
use uuid::Uuid;

use crate::models::*;
use crate::services::StaffService;

#[utoipa::path(
    get,
    path = "/api/v1/admin/employees",
    tag = "admin-staff",
    security(("bearer_auth" = [])),
    params(
        ("role" = Option<crate::entities::EmployeeRole>, Query, description = "岗位"),
        ("active" = Option<bool>, Query, description = "是否在职")
    ),
    responses((status = 200, description = "员工列表", body = [EmployeeResponse]))
)]
pub async fn list_employees(
    staff_service: web::Data<StaffService>,
    query: web::Query<EmployeeQuery>,
) -> Result<HttpResponse> {
    match staff_service.list_employees(&query).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/employees",
    tag = "admin-staff",
    security(("bearer_auth" = [])),
    request_body = CreateEmployeeRequest,
    responses(
        (status = 200, description = "员工已创建", body = EmployeeResponse),
        (status = 400, description = "参数错误")
    )
)]
pub async fn create_employee(
    staff_service: web::Data<StaffService>,
    request: web::Json<CreateEmployeeRequest>,
) -> Result<HttpResponse> {
    match staff_service.create_employee(request.into_inner()).await {
        Ok(employee) => Ok(HttpResponse::Ok().json(ApiResponse::success(employee))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/employees/{id}",
    tag = "admin-staff",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "员工ID")),
    request_body = UpdateEmployeeRequest,
    responses(
        (status = 200, description = "员工已更新", body = EmployeeResponse),
        (status = 404, description = "员工不存在")
    )
)]
pub async fn update_employee(
    staff_service: web::Data<StaffService>,
    path: web::Path<Uuid>,
    request: web::Json<UpdateEmployeeRequest>,
) -> Result<HttpResponse> {
    match staff_service
        .update_employee(path.into_inner(), request.into_inner())
        .await
    {
        Ok(employee) => Ok(HttpResponse::Ok().json(ApiResponse::success(employee))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/employees/{id}",
    tag = "admin-staff",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "员工ID")),
    responses(
        (status = 200, description = "员工已删除"),
        (status = 404, description = "员工不存在")
    )
)]
pub async fn delete_employee(
    staff_service: web::Data<StaffService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match staff_service.delete_employee(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Employee deleted"))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/attendance/check-in",
    tag = "admin-staff",
    security(("bearer_auth" = [])),
    request_body = AttendanceRequest,
    responses(
        (status = 200, description = "签到成功", body = AttendanceResponse),
        (status = 400, description = "员工已停用"),
        (status = 409, description = "今天已签到")
    )
)]
pub async fn check_in(
    staff_service: web::Data<StaffService>,
    request: web::Json<AttendanceRequest>,
) -> Result<HttpResponse> {
    match staff_service.check_in(request.into_inner()).await {
        Ok(record) => Ok(HttpResponse::Ok().json(ApiResponse::success(record))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/attendance/check-out",
    tag = "admin-staff",
    security(("bearer_auth" = [])),
    request_body = AttendanceRequest,
    responses(
        (status = 200, description = "签退成功", body = AttendanceResponse),
        (status = 400, description = "今天没有签到记录"),
        (status = 409, description = "今天已签退")
    )
)]
pub async fn check_out(
    staff_service: web::Data<StaffService>,
    request: web::Json<AttendanceRequest>,
) -> Result<HttpResponse> {
    match staff_service.check_out(request.into_inner()).await {
        Ok(record) => Ok(HttpResponse::Ok().json(ApiResponse::success(record))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/attendance",
    tag = "admin-staff",
    security(("bearer_auth" = [])),
    params(
        ("employee_id" = Option<Uuid>, Query, description = "员工ID"),
        ("date" = Option<chrono::NaiveDate>, Query, description = "日期 (YYYY-MM-DD)")
    ),
    responses((status = 200, description = "考勤记录", body = [AttendanceResponse]))
)]
pub async fn list_attendance(
    staff_service: web::Data<StaffService>,
    query: web::Query<AttendanceQuery>,
) -> Result<HttpResponse> {
    match staff_service.list_attendance(&query).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn staff_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/admin/employees")
            .route(web::get().to(list_employees))
            .route(web::post().to(create_employee)),
    )
    .service(
        web::resource("/admin/employees/{id}")
            .route(web::put().to(update_employee))
            .route(web::delete().to(delete_employee)),
    )
    .route("/admin/attendance", web::get().to(list_attendance))
    .route("/admin/attendance/check-in", web::post().to(check_in))
    .route("/admin/attendance/check-out", web::post().to(check_out));
}
