use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum AmbulanceStatus {
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "on_duty")]
    OnDuty,
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
}

impl AmbulanceStatus {
    /// 维修中的车辆不能派给预约或司机
    pub fn is_dispatchable(&self) -> bool {
        !matches!(self, AmbulanceStatus::Maintenance)
    }
}

impl std::fmt::Display for AmbulanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AmbulanceStatus::Available => write!(f, "available"),
            AmbulanceStatus::OnDuty => write!(f, "on_duty"),
            AmbulanceStatus::Maintenance => write!(f, "maintenance"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ambulances")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub license_plate: String,
    pub model: String,
    pub capacity: i32,
    pub status: AmbulanceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
