use crate::error::{AppError, AppResult};
use sea_orm::{ConnectionTrait, EntityTrait, PrimaryKeyTrait};
use uuid::Uuid;

/// 以 UUID 为主键的业务表，LABEL 用于错误信息
pub trait Record: EntityTrait {
    const LABEL: &'static str;
}

impl Record for crate::entities::booking_entity::Entity {
    const LABEL: &'static str = "Booking";
}

impl Record for crate::entities::ambulance_entity::Entity {
    const LABEL: &'static str = "Ambulance";
}

impl Record for crate::entities::driver_entity::Entity {
    const LABEL: &'static str = "Driver";
}

impl Record for crate::entities::driver_assignment_entity::Entity {
    const LABEL: &'static str = "Driver assignment";
}

impl Record for crate::entities::employee_entity::Entity {
    const LABEL: &'static str = "Employee";
}

impl Record for crate::entities::attendance_entity::Entity {
    const LABEL: &'static str = "Attendance record";
}

impl Record for crate::entities::expense_entity::Entity {
    const LABEL: &'static str = "Expense";
}

/// 按 id 取一条记录，不存在返回 NotFound
pub async fn fetch<E, C>(conn: &C, id: Uuid) -> AppResult<E::Model>
where
    E: Record,
    C: ConnectionTrait,
    Uuid: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
{
    E::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} not found", E::LABEL)))
}

/// 按 id 删除一条记录，不存在返回 NotFound
pub async fn remove<E, C>(conn: &C, id: Uuid) -> AppResult<()>
where
    E: Record,
    C: ConnectionTrait,
    Uuid: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
{
    let result = E::delete_by_id(id).exec(conn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound(format!("{} not found", E::LABEL)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ambulance_entity as ambulances;
    use crate::services::test_support::setup_db;

    #[tokio::test]
    async fn test_missing_record_reports_label() {
        let db = setup_db().await;
        match fetch::<ambulances::Entity, _>(&db, Uuid::new_v4()).await {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "Ambulance not found"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(
            remove::<ambulances::Entity, _>(&db, Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }
}
