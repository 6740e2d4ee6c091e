use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{
    AmbulanceStatus, DriverStatus, ambulance_entity, driver_assignment_entity, driver_entity,
};

// ---------- 车辆 ----------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateAmbulanceRequest {
    #[schema(example = "AMB-1024")]
    pub license_plate: String,
    pub model: String,
    pub capacity: i32,
}

/// 只更新提供的字段
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateAmbulanceRequest {
    pub license_plate: Option<String>,
    pub model: Option<String>,
    pub capacity: Option<i32>,
    pub status: Option<AmbulanceStatus>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct AmbulanceQuery {
    pub status: Option<AmbulanceStatus>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AmbulanceResponse {
    pub id: Uuid,
    pub license_plate: String,
    pub model: String,
    pub capacity: i32,
    pub status: AmbulanceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ambulance_entity::Model> for AmbulanceResponse {
    fn from(m: ambulance_entity::Model) -> Self {
        Self {
            id: m.id,
            license_plate: m.license_plate,
            model: m.model,
            capacity: m.capacity,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

// ---------- 司机 ----------

/// 新建司机，司机手机号需先完成验证码验证
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateDriverRequest {
    pub name: String,
    #[schema(example = "+15551234567")]
    pub phone: String,
    pub license_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateDriverStatusRequest {
    pub status: DriverStatus,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct DriverQuery {
    pub status: Option<DriverStatus>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DriverResponse {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub license_number: String,
    pub status: DriverStatus,
    pub created_at: DateTime<Utc>,
}

impl From<driver_entity::Model> for DriverResponse {
    fn from(m: driver_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            phone: m.phone,
            license_number: m.license_number,
            status: m.status,
            created_at: m.created_at,
        }
    }
}

// ---------- 排班 ----------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignDriverRequest {
    pub driver_id: Uuid,
    pub ambulance_id: Uuid,
    #[schema(example = "2026-10-18")]
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct DriverAssignmentQuery {
    pub date: Option<NaiveDate>,
    pub driver_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DriverAssignmentResponse {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub ambulance_id: Uuid,
    pub date: NaiveDate,
}

impl From<driver_assignment_entity::Model> for DriverAssignmentResponse {
    fn from(m: driver_assignment_entity::Model) -> Self {
        Self {
            id: m.id,
            driver_id: m.driver_id,
            ambulance_id: m.ambulance_id,
            date: m.assignment_date,
        }
    }
}
