use actix_web::{HttpResponse, ResponseError, Result, web};
use uuid::Uuid;

use crate::models::*;
use crate::services::ExpenseService;

#[utoipa::path(
    get,
    path = "/api/v1/admin/expenses",
    tag = "admin-expenses",
    security(("bearer_auth" = [])),
    params(
        ("from" = Option<chrono::NaiveDate>, Query, description = "起始日期 (含)"),
        ("to" = Option<chrono::NaiveDate>, Query, description = "结束日期 (含)"),
        ("category" = Option<crate::entities::ExpenseCategory>, Query, description = "类别"),
        ("employee_id" = Option<Uuid>, Query, description = "员工ID"),
        ("ambulance_id" = Option<Uuid>, Query, description = "车辆ID"),
        ("page" = Option<u32>, Query, description = "页码"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (最大 100)")
    ),
    responses(
        (status = 200, description = "支出分页列表，total_amount_cents 为筛选条件下的总金额"),
        (status = 400, description = "日期范围错误")
    )
)]
pub async fn list_expenses(
    expense_service: web::Data<ExpenseService>,
    query: web::Query<ExpenseQuery>,
) -> Result<HttpResponse> {
    match expense_service.list_expenses(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/expenses",
    tag = "admin-expenses",
    security(("bearer_auth" = [])),
    request_body = CreateExpenseRequest,
    responses(
        (status = 200, description = "支出已记录", body = ExpenseResponse),
        (status = 400, description = "金额必须大于 0"),
        (status = 404, description = "关联的员工或车辆不存在")
    )
)]
pub async fn create_expense(
    expense_service: web::Data<ExpenseService>,
    request: web::Json<CreateExpenseRequest>,
) -> Result<HttpResponse> {
    match expense_service.create_expense(request.into_inner()).await {
        Ok(expense) => Ok(HttpResponse::Ok().json(ApiResponse::success(expense))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/expenses/{id}",
    tag = "admin-expenses",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "支出ID")),
    responses(
        (status = 200, description = "支出已删除"),
        (status = 404, description = "支出不存在")
    )
)]
pub async fn delete_expense(
    expense_service: web::Data<ExpenseService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match expense_service.delete_expense(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message("Expense deleted"))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn expense_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/admin/expenses")
            .route(web::get().to(list_expenses))
            .route(web::post().to(create_expense)),
    )
    .route("/admin/expenses/{id}", web::delete().to(delete_expense));
}
