use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{ExpenseCategory, expense_entity};

use super::PaginatedResponse;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateExpenseRequest {
    pub category: ExpenseCategory,
    /// 金额(美分)
    #[schema(example = 4599)]
    pub amount_cents: i64,
    pub description: Option<String>,
    pub expense_date: NaiveDate,
    pub employee_id: Option<Uuid>,
    pub ambulance_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct ExpenseQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub category: Option<ExpenseCategory>,
    pub employee_id: Option<Uuid>,
    pub ambulance_id: Option<Uuid>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExpenseResponse {
    pub id: Uuid,
    pub category: ExpenseCategory,
    pub amount_cents: i64,
    pub description: Option<String>,
    pub expense_date: NaiveDate,
    pub employee_id: Option<Uuid>,
    pub ambulance_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<expense_entity::Model> for ExpenseResponse {
    fn from(m: expense_entity::Model) -> Self {
        Self {
            id: m.id,
            category: m.category,
            amount_cents: m.amount_cents,
            description: m.description,
            expense_date: m.expense_date,
            employee_id: m.employee_id,
            ambulance_id: m.ambulance_id,
            created_at: m.created_at,
        }
    }
}

/// 分页结果 + 当前筛选条件下的总金额
#[derive(Debug, Clone, Serialize)]
pub struct ExpensePageResponse {
    #[serde(flatten)]
    pub page: PaginatedResponse<ExpenseResponse>,
    pub total_amount_cents: i64,
}
