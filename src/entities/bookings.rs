use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "assigned")]
    Assigned,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl BookingStatus {
    /// 允许的状态流转:
    /// pending -> assigned / cancelled
    /// assigned -> assigned (换车) / completed / cancelled
    /// completed, cancelled 为终态
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Assigned)
                | (Pending, Cancelled)
                | (Assigned, Assigned)
                | (Assigned, Completed)
                | (Assigned, Cancelled)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Assigned => write!(f, "assigned"),
            BookingStatus::Completed => write!(f, "completed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub from_date: DateTime<Utc>,
    pub to_date: DateTime<Utc>,
    pub status: BookingStatus,
    pub assigned_ambulance_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::booking_locations::Entity")]
    Locations,
}

impl Related<super::booking_locations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Locations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::BookingStatus::*;

    #[test]
    fn test_booking_transitions() {
        assert!(Pending.can_transition_to(Assigned));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Completed));
        assert!(Assigned.can_transition_to(Assigned));
        assert!(Assigned.can_transition_to(Completed));
        assert!(!Assigned.can_transition_to(Pending));
    }

    #[test]
    fn test_terminal_states_are_final() {
        for terminal in [Completed, Cancelled] {
            assert!(terminal.is_terminal());
            for next in [Pending, Assigned, Completed, Cancelled] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }
}
