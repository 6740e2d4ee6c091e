use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use uuid::Uuid;

use crate::middlewares::current_admin;
use crate::models::*;
use crate::services::BookingService;

#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 200, description = "预约创建成功", body = BookingResponse),
        (status = 400, description = "参数错误 / PHONE_NOT_VERIFIED / OTP_EXPIRED")
    )
)]
pub async fn create_booking(
    booking_service: web::Data<BookingService>,
    request: web::Json<CreateBookingRequest>,
) -> Result<HttpResponse> {
    match booking_service.create_booking(request.into_inner()).await {
        Ok(booking) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            booking,
            "Booking created",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}",
    tag = "bookings",
    params(("id" = Uuid, Path, description = "预约ID")),
    responses(
        (status = 200, description = "预约详情", body = BookingResponse),
        (status = 404, description = "预约不存在")
    )
)]
pub async fn get_booking(
    booking_service: web::Data<BookingService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match booking_service.get_booking(path.into_inner()).await {
        Ok(booking) => Ok(HttpResponse::Ok().json(ApiResponse::success(booking))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/bookings",
    tag = "admin-bookings",
    security(("bearer_auth" = [])),
    params(
        ("status" = Option<crate::entities::BookingStatus>, Query, description = "按状态筛选"),
        ("page" = Option<u32>, Query, description = "页码"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (最大 100)")
    ),
    responses(
        (status = 200, description = "预约分页列表"),
        (status = 401, description = "未登录")
    )
)]
pub async fn list_bookings(
    booking_service: web::Data<BookingService>,
    query: web::Query<BookingQuery>,
) -> Result<HttpResponse> {
    match booking_service.list_bookings(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/bookings/assign-ambulance",
    tag = "admin-bookings",
    security(("bearer_auth" = [])),
    request_body = AssignAmbulanceRequest,
    responses(
        (status = 200, description = "分配成功", body = BookingResponse),
        (status = 400, description = "车辆维修中或预约状态不允许"),
        (status = 404, description = "预约或车辆不存在")
    )
)]
pub async fn assign_ambulance(
    req: HttpRequest,
    booking_service: web::Data<BookingService>,
    request: web::Json<AssignAmbulanceRequest>,
) -> Result<HttpResponse> {
    if let Some(admin) = current_admin(&req) {
        log::info!(
            "Admin {} assigning ambulance {} to booking {}",
            admin.0,
            request.ambulance_id,
            request.booking_id
        );
    }
    match booking_service.assign_ambulance(request.into_inner()).await {
        Ok(booking) => Ok(HttpResponse::Ok().json(ApiResponse::success(booking))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/bookings/{id}/status",
    tag = "admin-bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "预约ID")),
    request_body = UpdateBookingStatusRequest,
    responses(
        (status = 200, description = "状态已更新", body = BookingResponse),
        (status = 400, description = "非法的状态流转"),
        (status = 404, description = "预约不存在")
    )
)]
pub async fn update_booking_status(
    booking_service: web::Data<BookingService>,
    path: web::Path<Uuid>,
    request: web::Json<UpdateBookingStatusRequest>,
) -> Result<HttpResponse> {
    match booking_service
        .update_status(path.into_inner(), request.into_inner())
        .await
    {
        Ok(booking) => Ok(HttpResponse::Ok().json(ApiResponse::success(booking))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn booking_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/bookings", web::post().to(create_booking))
        .route("/bookings/{id}", web::get().to(get_booking))
        .route("/admin/bookings", web::get().to(list_bookings))
        .route(
            "/admin/bookings/assign-ambulance",
            web::post().to(assign_ambulance),
        )
        .route(
            "/admin/bookings/{id}/status",
            web::put().to(update_booking_status),
        );
}
