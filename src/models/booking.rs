use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{
    BookingStatus, LocationKind, booking_entity, booking_location_entity as location_entity,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Location {
    #[schema(example = "1 Main St, Springfield")]
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<location_entity::Model> for Location {
    fn from(m: location_entity::Model) -> Self {
        Self {
            address: m.address,
            latitude: m.latitude,
            longitude: m.longitude,
        }
    }
}

/// 创建预约，phone 必须已通过验证码验证
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    pub name: String,
    #[schema(example = "+15551234567")]
    pub phone: String,
    pub email: Option<String>,
    pub pickup_location: Location,
    pub drop_location: Location,
    pub from_date: DateTime<Utc>,
    pub to_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingResponse {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub pickup_location: Option<Location>,
    pub drop_location: Option<Location>,
    pub from_date: DateTime<Utc>,
    pub to_date: DateTime<Utc>,
    pub status: BookingStatus,
    pub assigned_ambulance_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingResponse {
    /// 预约 + 上下车地点 拼装
    pub fn from_parts(
        booking: booking_entity::Model,
        locations: Vec<location_entity::Model>,
    ) -> Self {
        let mut pickup_location = None;
        let mut drop_location = None;
        for location in locations {
            match location.kind {
                LocationKind::Pickup => pickup_location = Some(location.into()),
                LocationKind::DropOff => drop_location = Some(location.into()),
            }
        }

        Self {
            id: booking.id,
            name: booking.name,
            phone: booking.phone,
            email: booking.email,
            pickup_location,
            drop_location,
            from_date: booking.from_date,
            to_date: booking.to_date,
            status: booking.status,
            assigned_ambulance_id: booking.assigned_ambulance_id,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct BookingQuery {
    pub status: Option<BookingStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignAmbulanceRequest {
    pub booking_id: Uuid,
    pub ambulance_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
}
