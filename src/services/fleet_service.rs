use crate::entities::{
    AmbulanceStatus, DriverStatus, ambulance_entity as ambulances,
    driver_assignment_entity as assignments, driver_entity as drivers,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::VerificationService;
use crate::services::record_store::{fetch, remove};
use crate::utils::normalize_us_phone;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct FleetService {
    pool: DatabaseConnection,
    verification: VerificationService,
}

impl FleetService {
    pub fn new(pool: DatabaseConnection, verification: VerificationService) -> Self {
        Self { pool, verification }
    }

    // ---------- 车辆 ----------

    pub async fn create_ambulance(
        &self,
        request: CreateAmbulanceRequest,
    ) -> AppResult<AmbulanceResponse> {
        let license_plate = normalize_plate(&request.license_plate)?;
        validate_ambulance_fields(&request.model, request.capacity)?;

        let now = Utc::now();
        let ambulance = ambulances::ActiveModel {
            id: Set(Uuid::new_v4()),
            license_plate: Set(license_plate),
            model: Set(request.model.trim().to_string()),
            capacity: Set(request.capacity),
            status: Set(AmbulanceStatus::Available),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.pool)
        .await?;

        log::info!("Ambulance {} registered", ambulance.license_plate);
        Ok(ambulance.into())
    }

    pub async fn list_ambulances(&self, query: &AmbulanceQuery) -> AppResult<Vec<AmbulanceResponse>> {
        let mut select = ambulances::Entity::find();
        if let Some(status) = query.status {
            select = select.filter(ambulances::Column::Status.eq(status));
        }
        let rows = select
            .order_by_asc(ambulances::Column::LicensePlate)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// 只更新请求中提供的字段
    pub async fn update_ambulance(
        &self,
        ambulance_id: Uuid,
        request: UpdateAmbulanceRequest,
    ) -> AppResult<AmbulanceResponse> {
        if request.license_plate.is_none()
            && request.model.is_none()
            && request.capacity.is_none()
            && request.status.is_none()
        {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }

        let current = fetch::<ambulances::Entity, _>(&self.pool, ambulance_id).await?;
        validate_ambulance_fields(
            request.model.as_deref().unwrap_or(&current.model),
            request.capacity.unwrap_or(current.capacity),
        )?;

        let mut model = current.into_active_model();
        if let Some(plate) = &request.license_plate {
            model.license_plate = Set(normalize_plate(plate)?);
        }
        if let Some(m) = &request.model {
            model.model = Set(m.trim().to_string());
        }
        if let Some(capacity) = request.capacity {
            model.capacity = Set(capacity);
        }
        if let Some(status) = request.status {
            model.status = Set(status);
        }
        model.updated_at = Set(Utc::now());

        let updated = model.update(&self.pool).await?;
        Ok(updated.into())
    }

    pub async fn delete_ambulance(&self, ambulance_id: Uuid) -> AppResult<()> {
        remove::<ambulances::Entity, _>(&self.pool, ambulance_id).await?;
        log::info!("Ambulance {ambulance_id} deleted");
        Ok(())
    }

    // ---------- 司机 ----------

    /// 新建司机，消耗司机手机号的验证记录
    pub async fn create_driver(&self, request: CreateDriverRequest) -> AppResult<DriverResponse> {
        if request.name.trim().is_empty() {
            return Err(AppError::ValidationError("Name is required".to_string()));
        }
        if request.license_number.trim().is_empty() {
            return Err(AppError::ValidationError(
                "License number is required".to_string(),
            ));
        }
        let phone = normalize_us_phone(&request.phone)?;

        let now = Utc::now();
        let driver = drivers::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            phone: Set(phone.clone()),
            license_number: Set(request.license_number.trim().to_string()),
            status: Set(DriverStatus::Available),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let driver = self
            .verification
            .authorize_with(&phone, move |txn| {
                Box::pin(async move { Ok(driver.insert(txn).await?) })
            })
            .await?;

        log::info!("Driver {} created", driver.id);
        Ok(driver.into())
    }

    pub async fn list_drivers(&self, query: &DriverQuery) -> AppResult<Vec<DriverResponse>> {
        let mut select = drivers::Entity::find();
        if let Some(status) = query.status {
            select = select.filter(drivers::Column::Status.eq(status));
        }
        let rows = select
            .order_by_asc(drivers::Column::Name)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn update_driver_status(
        &self,
        driver_id: Uuid,
        request: UpdateDriverStatusRequest,
    ) -> AppResult<DriverResponse> {
        let mut model = fetch::<drivers::Entity, _>(&self.pool, driver_id)
            .await?
            .into_active_model();
        model.status = Set(request.status);
        model.updated_at = Set(Utc::now());
        let updated = model.update(&self.pool).await?;
        Ok(updated.into())
    }

    pub async fn delete_driver(&self, driver_id: Uuid) -> AppResult<()> {
        remove::<drivers::Entity, _>(&self.pool, driver_id).await?;
        log::info!("Driver {driver_id} deleted");
        Ok(())
    }

    // ---------- 排班 ----------

    /// 司机 + 车辆 + 日期，每个司机每天只能有一条
    pub async fn assign_driver(
        &self,
        request: AssignDriverRequest,
    ) -> AppResult<DriverAssignmentResponse> {
        let driver = fetch::<drivers::Entity, _>(&self.pool, request.driver_id).await?;
        if driver.status == DriverStatus::Inactive {
            return Err(AppError::ValidationError(format!(
                "Driver {} is inactive",
                driver.name
            )));
        }
        let ambulance = fetch::<ambulances::Entity, _>(&self.pool, request.ambulance_id).await?;
        if !ambulance.status.is_dispatchable() {
            return Err(AppError::ValidationError(format!(
                "Ambulance {} is under maintenance",
                ambulance.license_plate
            )));
        }

        let result = assignments::ActiveModel {
            id: Set(Uuid::new_v4()),
            driver_id: Set(driver.id),
            ambulance_id: Set(ambulance.id),
            assignment_date: Set(request.date),
            created_at: Set(Utc::now()),
        }
        .insert(&self.pool)
        .await;

        let assignment = match result {
            Ok(a) => a,
            Err(e) => {
                return Err(match AppError::from(e) {
                    AppError::Conflict(_) => AppError::Conflict(format!(
                        "Driver {} is already assigned on {}",
                        driver.name, request.date
                    )),
                    other => other,
                });
            }
        };

        log::info!(
            "Driver {} assigned to ambulance {} on {}",
            driver.id,
            ambulance.id,
            request.date
        );
        Ok(assignment.into())
    }

    pub async fn list_assignments(
        &self,
        query: &DriverAssignmentQuery,
    ) -> AppResult<Vec<DriverAssignmentResponse>> {
        let mut select = assignments::Entity::find();
        if let Some(date) = query.date {
            select = select.filter(assignments::Column::AssignmentDate.eq(date));
        }
        if let Some(driver_id) = query.driver_id {
            select = select.filter(assignments::Column::DriverId.eq(driver_id));
        }
        let rows = select
            .order_by_desc(assignments::Column::AssignmentDate)
            .all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn delete_assignment(&self, assignment_id: Uuid) -> AppResult<()> {
        remove::<assignments::Entity, _>(&self.pool, assignment_id).await
    }
}

fn normalize_plate(plate: &str) -> AppResult<String> {
    let plate = plate.trim().to_ascii_uppercase();
    if plate.is_empty() || plate.len() > 20 {
        return Err(AppError::ValidationError(
            "License plate must be between 1 and 20 characters".to_string(),
        ));
    }
    Ok(plate)
}

fn validate_ambulance_fields(model: &str, capacity: i32) -> AppResult<()> {
    if model.trim().is_empty() {
        return Err(AppError::ValidationError("Model is required".to_string()));
    }
    if capacity < 1 {
        return Err(AppError::ValidationError(
            "Capacity must be at least 1".to_string(),
        ));
    }
    Ok(())
}
