use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use uuid::Uuid;

use crate::middlewares::current_admin;
use crate::models::*;
use crate::services::FleetService;

fn log_admin_action(req: &HttpRequest, action: &str, id: Uuid) {
    let admin = current_admin(req).map(|a| a.0).unwrap_or_default();
    log::info!("Admin {admin} {action} {id}");
}

// ---------- 车辆 ----------

#[utoipa::path(
    get,
    path = "/api/v1/admin/ambulances",
    tag = "admin-fleet",
    security(("bearer_auth" = [])),
    params(("status" = Option<crate::entities::AmbulanceStatus>, Query, description = "按状态筛选")),
    responses((status = 200, description = "车辆列表", body = [AmbulanceResponse]))
)]
pub async fn list_ambulances(
    fleet_service: web::Data<FleetService>,
    query: web::Query<AmbulanceQuery>,
) -> Result<HttpResponse> {
    match fleet_service.list_ambulances(&query).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/ambulances",
    tag = "admin-fleet",
    security(("bearer_auth" = [])),
    request_body = CreateAmbulanceRequest,
    responses(
        (status = 200, description = "车辆已创建", body = AmbulanceResponse),
        (status = 409, description = "车牌已存在")
    )
)]
pub async fn create_ambulance(
    fleet_service: web::Data<FleetService>,
    request: web::Json<CreateAmbulanceRequest>,
) -> Result<HttpResponse> {
    match fleet_service.create_ambulance(request.into_inner()).await {
        Ok(ambulance) => Ok(HttpResponse::Ok().json(ApiResponse::success(ambulance))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/ambulances/{id}",
    tag = "admin-fleet",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "车辆ID")),
    request_body = UpdateAmbulanceRequest,
    responses(
        (status = 200, description = "车辆已更新", body = AmbulanceResponse),
        (status = 404, description = "车辆不存在")
    )
)]
pub async fn update_ambulance(
    fleet_service: web::Data<FleetService>,
    path: web::Path<Uuid>,
    request: web::Json<UpdateAmbulanceRequest>,
) -> Result<HttpResponse> {
    match fleet_service
        .update_ambulance(path.into_inner(), request.into_inner())
        .await
    {
        Ok(ambulance) => Ok(HttpResponse::Ok().json(ApiResponse::success(ambulance))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/ambulances/{id}",
    tag = "admin-fleet",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "车辆ID")),
    responses(
        (status = 200, description = "车辆已删除"),
        (status = 404, description = "车辆不存在")
    )
)]
pub async fn delete_ambulance(
    req: HttpRequest,
    fleet_service: web::Data<FleetService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    log_admin_action(&req, "deleting ambulance", id);
    match fleet_service.delete_ambulance(id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Ambulance deleted"))),
        Err(e) => Ok(e.error_response()),
    }
}

// ---------- 司机 ----------

#[utoipa::path(
    get,
    path = "/api/v1/admin/drivers",
    tag = "admin-fleet",
    security(("bearer_auth" = [])),
    params(("status" = Option<crate::entities::DriverStatus>, Query, description = "按状态筛选")),
    responses((status = 200, description = "司机列表", body = [DriverResponse]))
)]
pub async fn list_drivers(
    fleet_service: web::Data<FleetService>,
    query: web::Query<DriverQuery>,
) -> Result<HttpResponse> {
    match fleet_service.list_drivers(&query).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/drivers",
    tag = "admin-fleet",
    security(("bearer_auth" = [])),
    request_body = CreateDriverRequest,
    responses(
        (status = 200, description = "司机已创建", body = DriverResponse),
        (status = 400, description = "司机手机号未验证 (PHONE_NOT_VERIFIED / OTP_EXPIRED)")
    )
)]
pub async fn create_driver(
    fleet_service: web::Data<FleetService>,
    request: web::Json<CreateDriverRequest>,
) -> Result<HttpResponse> {
    match fleet_service.create_driver(request.into_inner()).await {
        Ok(driver) => Ok(HttpResponse::Ok().json(ApiResponse::success(driver))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/drivers/{id}/status",
    tag = "admin-fleet",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "司机ID")),
    request_body = UpdateDriverStatusRequest,
    responses(
        (status = 200, description = "状态已更新", body = DriverResponse),
        (status = 404, description = "司机不存在")
    )
)]
pub async fn update_driver_status(
    fleet_service: web::Data<FleetService>,
    path: web::Path<Uuid>,
    request: web::Json<UpdateDriverStatusRequest>,
) -> Result<HttpResponse> {
    match fleet_service
        .update_driver_status(path.into_inner(), request.into_inner())
        .await
    {
        Ok(driver) => Ok(HttpResponse::Ok().json(ApiResponse::success(driver))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/drivers/{id}",
    tag = "admin-fleet",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "司机ID")),
    responses(
        (status = 200, description = "司机已删除"),
        (status = 404, description = "司机不存在")
    )
)]
pub async fn delete_driver(
    req: HttpRequest,
    fleet_service: web::Data<FleetService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    log_admin_action(&req, "deleting driver", id);
    match fleet_service.delete_driver(id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Driver deleted"))),
        Err(e) => Ok(e.error_response()),
    }
}

// ---------- 排班 ----------

#[utoipa::path(
    get,
    path = "/api/v1/admin/driver-assignments",
    tag = "admin-fleet",
    security(("bearer_auth" = [])),
    params(
        ("date" = Option<chrono::NaiveDate>, Query, description = "排班日期 (YYYY-MM-DD)"),
        ("driver_id" = Option<Uuid>, Query, description = "司机ID")
    ),
    responses((status = 200, description = "排班列表", body = [DriverAssignmentResponse]))
)]
pub async fn list_assignments(
    fleet_service: web::Data<FleetService>,
    query: web::Query<DriverAssignmentQuery>,
) -> Result<HttpResponse> {
    match fleet_service.list_assignments(&query).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/driver-assignments",
    tag = "admin-fleet",
    security(("bearer_auth" = [])),
    request_body = AssignDriverRequest,
    responses(
        (status = 200, description = "排班已创建", body = DriverAssignmentResponse),
        (status = 400, description = "司机停用或车辆维修中"),
        (status = 409, description = "该司机当天已有排班")
    )
)]
pub async fn assign_driver(
    fleet_service: web::Data<FleetService>,
    request: web::Json<AssignDriverRequest>,
) -> Result<HttpResponse> {
    match fleet_service.assign_driver(request.into_inner()).await {
        Ok(assignment) => Ok(HttpResponse::Ok().json(ApiResponse::success(assignment))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/driver-assignments/{id}",
    tag = "admin-fleet",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "排班ID")),
    responses(
        (status = 200, description = "排班已删除"),
        (status = 404, description = "排班不存在")
    )
)]
pub async fn delete_assignment(
    req: HttpRequest,
    fleet_service: web::Data<FleetService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let id = path.into_inner();
    log_admin_action(&req, "deleting driver assignment", id);
    match fleet_service.delete_assignment(id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Assignment deleted"))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn fleet_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/admin/ambulances")
            .route(web::get().to(list_ambulances))
            .route(web::post().to(create_ambulance)),
    )
    .service(
        web::resource("/admin/ambulances/{id}")
            .route(web::put().to(update_ambulance))
            .route(web::delete().to(delete_ambulance)),
    )
    .service(
        web::resource("/admin/drivers")
            .route(web::get().to(list_drivers))
            .route(web::post().to(create_driver)),
    )
    .route("/admin/drivers/{id}", web::delete().to(delete_driver))
    .route(
        "/admin/drivers/{id}/status",
        web::put().to(update_driver_status),
    )
    .service(
        web::resource("/admin/driver-assignments")
            .route(web::get().to(list_assignments))
            .route(web::post().to(assign_driver)),
    )
    .route(
        "/admin/driver-assignments/{id}",
        web::delete().to(delete_assignment),
    );
}
