use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    #[sea_orm(string_value = "fuel")]
    Fuel,
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
    #[sea_orm(string_value = "salary")]
    Salary,
    #[sea_orm(string_value = "insurance")]
    Insurance,
    #[sea_orm(string_value = "supplies")]
    Supplies,
    #[sea_orm(string_value = "other")]
    Other,
}

/// 支出 (金额单位: 美分)
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub category: ExpenseCategory,
    pub amount_cents: i64,
    pub description: Option<String>,
    pub expense_date: NaiveDate,
    pub employee_id: Option<Uuid>,
    pub ambulance_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
