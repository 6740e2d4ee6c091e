use crate::entities::{
    ambulance_entity as ambulances, employee_entity as employees, expense_entity as expenses,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::record_store::{fetch, remove};
use chrono::Utc;
use sea_orm::sea_query::{Alias, Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct ExpenseService {
    pool: DatabaseConnection,
}

impl ExpenseService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 记一笔支出，关联的员工 / 车辆必须存在
    pub async fn create_expense(&self, request: CreateExpenseRequest) -> AppResult<ExpenseResponse> {
        if request.amount_cents <= 0 {
            return Err(AppError::ValidationError(
                "Amount must be greater than zero".to_string(),
            ));
        }
        if let Some(employee_id) = request.employee_id {
            fetch::<employees::Entity, _>(&self.pool, employee_id).await?;
        }
        if let Some(ambulance_id) = request.ambulance_id {
            fetch::<ambulances::Entity, _>(&self.pool, ambulance_id).await?;
        }

        let expense = expenses::ActiveModel {
            id: Set(Uuid::new_v4()),
            category: Set(request.category),
            amount_cents: Set(request.amount_cents),
            description: Set(request.description),
            expense_date: Set(request.expense_date),
            employee_id: Set(request.employee_id),
            ambulance_id: Set(request.ambulance_id),
            created_at: Set(Utc::now()),
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "Expense {} recorded: {} cents ({:?})",
            expense.id,
            expense.amount_cents,
            expense.category
        );
        Ok(expense.into())
    }

    /// 支出列表，附带当前筛选条件下(不分页)的总金额
    pub async fn list_expenses(&self, query: &ExpenseQuery) -> AppResult<ExpensePageResponse> {
        if let (Some(from), Some(to)) = (query.from, query.to)
            && from > to
        {
            return Err(AppError::ValidationError(
                "'from' must not be later than 'to'".to_string(),
            ));
        }
        let params = PaginationParams::new(query.page, query.per_page);

        let total = filtered(query).count(&self.pool).await? as i64;

        #[derive(Debug, sea_orm::FromQueryResult)]
        struct TotalRow {
            total: Option<i64>,
        }
        let total_amount_cents = filtered(query)
            .select_only()
            .column_as(
                Expr::expr(Func::cast_as(
                    Func::sum(Expr::col(expenses::Column::AmountCents)),
                    Alias::new("BIGINT"),
                )),
                "total",
            )
            .into_model::<TotalRow>()
            .one(&self.pool)
            .await?
            .and_then(|r| r.total)
            .unwrap_or(0);

        let rows = filtered(query)
            .order_by_desc(expenses::Column::ExpenseDate)
            .order_by_desc(expenses::Column::CreatedAt)
            .offset(params.get_offset() as u64)
            .limit(params.get_limit() as u64)
            .all(&self.pool)
            .await?;

        let data = rows.into_iter().map(Into::into).collect();
        Ok(ExpensePageResponse {
            page: PaginatedResponse::new(data, &params, total),
            total_amount_cents,
        })
    }

    pub async fn delete_expense(&self, expense_id: Uuid) -> AppResult<()> {
        remove::<expenses::Entity, _>(&self.pool, expense_id).await
    }
}

fn filtered(query: &ExpenseQuery) -> Select<expenses::Entity> {
    let mut select = expenses::Entity::find();
    if let Some(from) = query.from {
        select = select.filter(expenses::Column::ExpenseDate.gte(from));
    }
    if let Some(to) = query.to {
        select = select.filter(expenses::Column::ExpenseDate.lte(to));
    }
    if let Some(category) = query.category {
        select = select.filter(expenses::Column::Category.eq(category));
    }
    if let Some(employee_id) = query.employee_id {
        select = select.filter(expenses::Column::EmployeeId.eq(employee_id));
    }
    if let Some(ambulance_id) = query.ambulance_id {
        select = select.filter(expenses::Column::AmbulanceId.eq(ambulance_id));
    }
    select
}
