use crate::entities::{attendance_entity as attendance, employee_entity as employees};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::record_store::{fetch, remove};
use crate::utils::{Clock, normalize_us_phone};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct StaffService {
    pool: DatabaseConnection,
    clock: Arc<dyn Clock>,
}

impl StaffService {
    pub fn new(pool: DatabaseConnection, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    // ---------- 员工 ----------

    pub async fn create_employee(
        &self,
        request: CreateEmployeeRequest,
    ) -> AppResult<EmployeeResponse> {
        if request.name.trim().is_empty() {
            return Err(AppError::ValidationError("Name is required".to_string()));
        }
        validate_email(request.email.as_deref())?;
        let phone = normalize_us_phone(&request.phone)?;

        let now = self.clock.now();
        let employee = employees::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            role: Set(request.role),
            phone: Set(phone),
            email: Set(request.email),
            is_active: Set(true),
            hired_on: Set(request.hired_on),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.pool)
        .await?;

        log::info!("Employee {} created ({:?})", employee.id, employee.role);
        Ok(employee.into())
    }

    pub async fn list_employees(&self, query: &EmployeeQuery) -> AppResult<Vec<EmployeeResponse>> {
        let mut select = employees::Entity::find();
        if let Some(role) = query.role {
            select = select.filter(employees::Column::Role.eq(role));
        }
        if let Some(active) = query.active {
            select = select.filter(employees::Column::IsActive.eq(active));
        }
        let rows = select
            .order_by_asc(employees::Column::Name)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn update_employee(
        &self,
        employee_id: Uuid,
        request: UpdateEmployeeRequest,
    ) -> AppResult<EmployeeResponse> {
        if request.name.is_none()
            && request.role.is_none()
            && request.phone.is_none()
            && request.email.is_none()
            && request.is_active.is_none()
        {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }

        let mut model = fetch::<employees::Entity, _>(&self.pool, employee_id)
            .await?
            .into_active_model();
        if let Some(name) = &request.name {
            if name.trim().is_empty() {
                return Err(AppError::ValidationError("Name is required".to_string()));
            }
            model.name = Set(name.trim().to_string());
        }
        if let Some(role) = request.role {
            model.role = Set(role);
        }
        if let Some(phone) = &request.phone {
            model.phone = Set(normalize_us_phone(phone)?);
        }
        if let Some(email) = request.email {
            validate_email(Some(&email))?;
            model.email = Set(Some(email));
        }
        if let Some(active) = request.is_active {
            model.is_active = Set(active);
        }
        model.updated_at = Set(self.clock.now());

        let updated = model.update(&self.pool).await?;
        Ok(updated.into())
    }

    pub async fn delete_employee(&self, employee_id: Uuid) -> AppResult<()> {
        remove::<employees::Entity, _>(&self.pool, employee_id).await?;
        log::info!("Employee {employee_id} deleted");
        Ok(())
    }

    // ---------- 考勤 ----------

    /// 签到：仅在职员工，每人每天 (UTC) 一次
    pub async fn check_in(&self, request: AttendanceRequest) -> AppResult<AttendanceResponse> {
        let employee = fetch::<employees::Entity, _>(&self.pool, request.employee_id).await?;
        if !employee.is_active {
            return Err(AppError::ValidationError(format!(
                "Employee {} is not active",
                employee.name
            )));
        }

        let now = self.clock.now();
        let work_date = now.date_naive();
        let result = attendance::ActiveModel {
            id: Set(Uuid::new_v4()),
            employee_id: Set(employee.id),
            work_date: Set(work_date),
            check_in_at: Set(now),
            check_out_at: Set(None),
        }
        .insert(&self.pool)
        .await;

        match result {
            Ok(record) => {
                log::info!("Employee {} checked in on {}", employee.id, work_date);
                Ok(record.into())
            }
            Err(e) => Err(match AppError::from(e) {
                AppError::Conflict(_) => AppError::Conflict(format!(
                    "Employee {} already checked in on {}",
                    employee.name, work_date
                )),
                other => other,
            }),
        }
    }

    /// 签退：需要当天有未签退的签到记录
    pub async fn check_out(&self, request: AttendanceRequest) -> AppResult<AttendanceResponse> {
        let now = self.clock.now();
        let work_date = now.date_naive();

        let record = attendance::Entity::find()
            .filter(attendance::Column::EmployeeId.eq(request.employee_id))
            .filter(attendance::Column::WorkDate.eq(work_date))
            .one(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::ValidationError("No check-in found for today".to_string())
            })?;

        if !record.is_open() {
            return Err(AppError::Conflict(
                "Already checked out for today".to_string(),
            ));
        }

        let mut model = record.into_active_model();
        model.check_out_at = Set(Some(now));
        let updated = model.update(&self.pool).await?;

        log::info!(
            "Employee {} checked out on {}",
            request.employee_id,
            work_date
        );
        Ok(updated.into())
    }

    pub async fn list_attendance(
        &self,
        query: &AttendanceQuery,
    ) -> AppResult<Vec<AttendanceResponse>> {
        let mut select = attendance::Entity::find();
        if let Some(employee_id) = query.employee_id {
            select = select.filter(attendance::Column::EmployeeId.eq(employee_id));
        }
        if let Some(date) = query.date {
            select = select.filter(attendance::Column::WorkDate.eq(date));
        }
        let rows = select
            .order_by_desc(attendance::Column::WorkDate)
            .order_by_asc(attendance::Column::CheckInAt)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

fn validate_email(email: Option<&str>) -> AppResult<()> {
    if let Some(email) = email
        && !email.contains('@')
    {
        return Err(AppError::ValidationError("Invalid email address".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::EmployeeRole;
    use crate::services::test_support::{setup_db, t0};
    use crate::utils::ManualClock;
    use chrono::Duration;

    async fn setup() -> (StaffService, ManualClock) {
        let db = setup_db().await;
        let clock = ManualClock::new(t0());
        (StaffService::new(db, Arc::new(clock.clone())), clock)
    }

    fn employee_request(name: &str) -> CreateEmployeeRequest {
        CreateEmployeeRequest {
            name: name.to_string(),
            role: EmployeeRole::Attendant,
            phone: "555-222-3333".to_string(),
            email: None,
            hired_on: None,
        }
    }

    #[tokio::test]
    async fn test_employee_crud() {
        let (staff, _) = setup().await;
        let created = staff.create_employee(employee_request("Ana")).await.unwrap();
        assert!(created.is_active);
        assert_eq!(created.phone, "+15552223333");

        let updated = staff
            .update_employee(
                created.id,
                UpdateEmployeeRequest {
                    role: Some(EmployeeRole::Dispatcher),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.role, EmployeeRole::Dispatcher);
        assert_eq!(updated.name, "Ana");

        let dispatchers = staff
            .list_employees(&EmployeeQuery {
                role: Some(EmployeeRole::Dispatcher),
                active: None,
            })
            .await
            .unwrap();
        assert_eq!(dispatchers.len(), 1);

        staff.delete_employee(created.id).await.unwrap();
        assert!(matches!(
            staff.delete_employee(created.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_check_in_once_per_day() {
        let (staff, clock) = setup().await;
        let employee = staff.create_employee(employee_request("Ana")).await.unwrap();
        let request = AttendanceRequest {
            employee_id: employee.id,
        };

        let record = staff.check_in(request.clone()).await.unwrap();
        assert_eq!(record.work_date, t0().date_naive());
        assert!(matches!(
            staff.check_in(request.clone()).await,
            Err(AppError::Conflict(_))
        ));

        clock.advance(Duration::hours(8));
        let closed = staff.check_out(request.clone()).await.unwrap();
        assert_eq!(closed.worked_minutes, Some(480));
        assert!(matches!(
            staff.check_out(request.clone()).await,
            Err(AppError::Conflict(_))
        ));

        // 第二天可以再次签到
        clock.advance(Duration::days(1));
        staff.check_in(request).await.unwrap();

        let history = staff
            .list_attendance(&AttendanceQuery {
                employee_id: Some(employee.id),
                date: None,
            })
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn test_check_out_without_check_in() {
        let (staff, _) = setup().await;
        let employee = staff.create_employee(employee_request("Ana")).await.unwrap();
        assert!(matches!(
            staff
                .check_out(AttendanceRequest {
                    employee_id: employee.id
                })
                .await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_inactive_employee_cannot_check_in() {
        let (staff, _) = setup().await;
        let employee = staff.create_employee(employee_request("Ana")).await.unwrap();
        staff
            .update_employee(
                employee.id,
                UpdateEmployeeRequest {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            staff
                .check_in(AttendanceRequest {
                    employee_id: employee.id
                })
                .await,
            Err(AppError::ValidationError(_))
        ));
    }
}
