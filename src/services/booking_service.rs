use crate::entities::{
    BookingStatus, LocationKind, ambulance_entity as ambulances, booking_entity as bookings,
    booking_location_entity as locations,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::VerificationService;
use crate::services::record_store::fetch;
use crate::utils::normalize_us_phone;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone)]
pub struct BookingService {
    pool: DatabaseConnection,
    verification: VerificationService,
}

impl BookingService {
    pub fn new(pool: DatabaseConnection, verification: VerificationService) -> Self {
        Self { pool, verification }
    }

    /// 创建预约
    ///
    /// 手机号必须已验证；验证记录的消费与预约写入在同一事务内完成
    pub async fn create_booking(&self, request: CreateBookingRequest) -> AppResult<BookingResponse> {
        validate_booking_request(&request)?;
        let phone = normalize_us_phone(&request.phone)?;

        let now = Utc::now();
        let booking_id = Uuid::new_v4();
        let booking = bookings::ActiveModel {
            id: Set(booking_id),
            name: Set(request.name.trim().to_string()),
            phone: Set(phone.clone()),
            email: Set(request.email.clone()),
            from_date: Set(request.from_date),
            to_date: Set(request.to_date),
            status: Set(BookingStatus::Pending),
            assigned_ambulance_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let pickup = location_model(booking_id, LocationKind::Pickup, &request.pickup_location);
        let dropoff = location_model(booking_id, LocationKind::DropOff, &request.drop_location);

        let (booking, saved_locations) = self
            .verification
            .authorize_with(&phone, move |txn| {
                Box::pin(async move {
                    let booking = booking.insert(txn).await?;
                    let pickup = pickup.insert(txn).await?;
                    let dropoff = dropoff.insert(txn).await?;
                    Ok((booking, vec![pickup, dropoff]))
                })
            })
            .await?;

        log::info!("Booking {} created for {}", booking.id, booking.phone);
        Ok(BookingResponse::from_parts(booking, saved_locations))
    }

    /// 预约详情 (含上下车地点)
    pub async fn get_booking(&self, booking_id: Uuid) -> AppResult<BookingResponse> {
        let booking = fetch::<bookings::Entity, _>(&self.pool, booking_id).await?;
        let booking_locations = booking
            .find_related(locations::Entity)
            .all(&self.pool)
            .await?;
        Ok(BookingResponse::from_parts(booking, booking_locations))
    }

    /// 预约列表 (管理端)，按创建时间倒序
    pub async fn list_bookings(
        &self,
        query: &BookingQuery,
    ) -> AppResult<PaginatedResponse<BookingResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut select = bookings::Entity::find();
        if let Some(status) = query.status {
            select = select.filter(bookings::Column::Status.eq(status));
        }

        let total = select.clone().count(&self.pool).await? as i64;
        let rows = select
            .order_by_desc(bookings::Column::CreatedAt)
            .offset(params.get_offset() as u64)
            .limit(params.get_limit() as u64)
            .all(&self.pool)
            .await?;

        // 一次性取出本页所有地点
        let ids: Vec<Uuid> = rows.iter().map(|b| b.id).collect();
        let mut by_booking: HashMap<Uuid, Vec<locations::Model>> = HashMap::new();
        if !ids.is_empty() {
            for location in locations::Entity::find()
                .filter(locations::Column::BookingId.is_in(ids))
                .all(&self.pool)
                .await?
            {
                by_booking
                    .entry(location.booking_id)
                    .or_default()
                    .push(location);
            }
        }

        let data = rows
            .into_iter()
            .map(|b| {
                let locs = by_booking.remove(&b.id).unwrap_or_default();
                BookingResponse::from_parts(b, locs)
            })
            .collect();

        Ok(PaginatedResponse::new(data, &params, total))
    }

    /// 给预约分配车辆
    pub async fn assign_ambulance(
        &self,
        request: AssignAmbulanceRequest,
    ) -> AppResult<BookingResponse> {
        let booking = fetch::<bookings::Entity, _>(&self.pool, request.booking_id).await?;
        let ambulance = fetch::<ambulances::Entity, _>(&self.pool, request.ambulance_id).await?;

        if !ambulance.status.is_dispatchable() {
            return Err(AppError::ValidationError(format!(
                "Ambulance {} is under maintenance",
                ambulance.license_plate
            )));
        }
        if !booking.status.can_transition_to(BookingStatus::Assigned) {
            return Err(AppError::ValidationError(format!(
                "Cannot assign an ambulance to a {} booking",
                booking.status
            )));
        }

        let mut model = booking.into_active_model();
        model.assigned_ambulance_id = Set(Some(ambulance.id));
        model.status = Set(BookingStatus::Assigned);
        model.updated_at = Set(Utc::now());
        model.update(&self.pool).await?;

        log::info!(
            "Ambulance {} assigned to booking {}",
            ambulance.id,
            request.booking_id
        );
        self.get_booking(request.booking_id).await
    }

    /// 更新预约状态，只允许合法流转
    pub async fn update_status(
        &self,
        booking_id: Uuid,
        request: UpdateBookingStatusRequest,
    ) -> AppResult<BookingResponse> {
        let booking = fetch::<bookings::Entity, _>(&self.pool, booking_id).await?;

        if request.status == BookingStatus::Assigned && booking.assigned_ambulance_id.is_none() {
            return Err(AppError::ValidationError(
                "Use ambulance assignment to move a booking to assigned".to_string(),
            ));
        }
        if !booking.status.can_transition_to(request.status) {
            return Err(AppError::ValidationError(format!(
                "Invalid status transition: {} -> {}",
                booking.status, request.status
            )));
        }

        let mut model = booking.into_active_model();
        model.status = Set(request.status);
        model.updated_at = Set(Utc::now());
        model.update(&self.pool).await?;

        self.get_booking(booking_id).await
    }
}

fn location_model(booking_id: Uuid, kind: LocationKind, location: &Location) -> locations::ActiveModel {
    locations::ActiveModel {
        id: Set(Uuid::new_v4()),
        booking_id: Set(booking_id),
        kind: Set(kind),
        address: Set(location.address.trim().to_string()),
        latitude: Set(location.latitude),
        longitude: Set(location.longitude),
    }
}

fn validate_location(label: &str, location: &Location) -> AppResult<()> {
    if location.address.trim().is_empty() {
        return Err(AppError::ValidationError(format!("{label} address is required")));
    }
    if !(-90.0..=90.0).contains(&location.latitude)
        || !(-180.0..=180.0).contains(&location.longitude)
    {
        return Err(AppError::ValidationError(format!(
            "{label} coordinates are out of range"
        )));
    }
    Ok(())
}

fn validate_booking_request(request: &CreateBookingRequest) -> AppResult<()> {
    if request.name.trim().is_empty() {
        return Err(AppError::ValidationError("Name is required".to_string()));
    }
    if let Some(email) = &request.email
        && !email.contains('@')
    {
        return Err(AppError::ValidationError("Invalid email address".to_string()));
    }
    if request.to_date < request.from_date {
        return Err(AppError::ValidationError(
            "to_date must not be earlier than from_date".to_string(),
        ));
    }
    validate_location("Pickup", &request.pickup_location)?;
    validate_location("Drop", &request.drop_location)?;
    Ok(())
}
