use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{EmployeeRole, attendance_entity, employee_entity};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub role: EmployeeRole,
    #[schema(example = "+15551234567")]
    pub phone: String,
    pub email: Option<String>,
    pub hired_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateEmployeeRequest {
    pub name: Option<String>,
    pub role: Option<EmployeeRole>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct EmployeeQuery {
    pub role: Option<EmployeeRole>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeResponse {
    pub id: Uuid,
    pub name: String,
    pub role: EmployeeRole,
    pub phone: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub hired_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl From<employee_entity::Model> for EmployeeResponse {
    fn from(m: employee_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            role: m.role,
            phone: m.phone,
            email: m.email,
            is_active: m.is_active,
            hired_on: m.hired_on,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRequest {
    pub employee_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct AttendanceQuery {
    pub employee_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttendanceResponse {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub work_date: NaiveDate,
    pub check_in_at: DateTime<Utc>,
    pub check_out_at: Option<DateTime<Utc>>,
    pub worked_minutes: Option<i64>,
}

impl From<attendance_entity::Model> for AttendanceResponse {
    fn from(m: attendance_entity::Model) -> Self {
        let worked_minutes = m.worked_minutes();
        Self {
            id: m.id,
            employee_id: m.employee_id,
            work_date: m.work_date,
            check_in_at: m.check_in_at,
            check_out_at: m.check_out_at,
            worked_minutes,
        }
    }
}
