use sea_orm_migration::prelude::*;

/// 手机验证码记录 (每个手机号最多一条)
#[derive(DeriveIden)]
enum VerificationRecords {
    Table,
    Phone,
    ChallengeId,
    Code,
    IssuedAt,
    ExpiresAt,
    Verified,
    VerifiedAt,
}

#[derive(DeriveIden)]
enum Ambulances {
    Table,
    Id,
    LicensePlate,
    Model,
    Capacity,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Drivers {
    Table,
    Id,
    Name,
    Phone,
    LicenseNumber,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DriverAssignments {
    Table,
    Id,
    DriverId,
    AmbulanceId,
    AssignmentDate,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Bookings {
    Table,
    Id,
    Name,
    Phone,
    Email,
    FromDate,
    ToDate,
    Status,
    AssignedAmbulanceId,
    CreatedAt,
    UpdatedAt,
}

/// 预约的上车点 / 下车点
#[derive(DeriveIden)]
enum BookingLocations {
    Table,
    Id,
    BookingId,
    Kind,
    Address,
    Latitude,
    Longitude,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VerificationRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VerificationRecords::Phone)
                            .string_len(20)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(VerificationRecords::ChallengeId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VerificationRecords::Code)
                            .string_len(6)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VerificationRecords::IssuedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VerificationRecords::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VerificationRecords::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(VerificationRecords::VerifiedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 过期清理按 expires_at 扫描
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_verification_records_expires_at")
                    .table(VerificationRecords::Table)
                    .col(VerificationRecords::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ambulances::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Ambulances::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Ambulances::LicensePlate)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Ambulances::Model).string().not_null())
                    .col(ColumnDef::new(Ambulances::Capacity).integer().not_null())
                    .col(
                        ColumnDef::new(Ambulances::Status)
                            .string_len(20)
                            .not_null()
                            .default("available"),
                    )
                    .col(
                        ColumnDef::new(Ambulances::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Ambulances::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Drivers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Drivers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Drivers::Name).string().not_null())
                    .col(ColumnDef::new(Drivers::Phone).string_len(20).not_null())
                    .col(ColumnDef::new(Drivers::LicenseNumber).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Drivers::Status)
                            .string_len(20)
                            .not_null()
                            .default("available"),
                    )
                    .col(
                        ColumnDef::new(Drivers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Drivers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DriverAssignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DriverAssignments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DriverAssignments::DriverId).uuid().not_null())
                    .col(
                        ColumnDef::new(DriverAssignments::AmbulanceId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DriverAssignments::AssignmentDate)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DriverAssignments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_driver_assignment_driver")
                            .from(DriverAssignments::Table, DriverAssignments::DriverId)
                            .to(Drivers::Table, Drivers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_driver_assignment_ambulance")
                            .from(DriverAssignments::Table, DriverAssignments::AmbulanceId)
                            .to(Ambulances::Table, Ambulances::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一司机同一天只能分配一辆车
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_driver_assignments_driver_date_unique")
                    .table(DriverAssignments::Table)
                    .col(DriverAssignments::DriverId)
                    .col(DriverAssignments::AssignmentDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Bookings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Bookings::Name).string().not_null())
                    .col(ColumnDef::new(Bookings::Phone).string_len(20).not_null())
                    .col(ColumnDef::new(Bookings::Email).string().null())
                    .col(
                        ColumnDef::new(Bookings::FromDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::ToDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Bookings::AssignedAmbulanceId).uuid().null())
                    .col(
                        ColumnDef::new(Bookings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Bookings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_ambulance")
                            .from(Bookings::Table, Bookings::AssignedAmbulanceId)
                            .to(Ambulances::Table, Ambulances::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bookings_status_created_at")
                    .table(Bookings::Table)
                    .col(Bookings::Status)
                    .col(Bookings::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BookingLocations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BookingLocations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BookingLocations::BookingId).uuid().not_null())
                    .col(ColumnDef::new(BookingLocations::Kind).string_len(10).not_null())
                    .col(ColumnDef::new(BookingLocations::Address).string().not_null())
                    .col(ColumnDef::new(BookingLocations::Latitude).double().not_null())
                    .col(ColumnDef::new(BookingLocations::Longitude).double().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_location_booking")
                            .from(BookingLocations::Table, BookingLocations::BookingId)
                            .to(Bookings::Table, Bookings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 每个预约的 pickup / drop 各一条
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_booking_locations_booking_kind_unique")
                    .table(BookingLocations::Table)
                    .col(BookingLocations::BookingId)
                    .col(BookingLocations::Kind)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 删除顺序：子表 -> 父表
        manager
            .drop_table(Table::drop().if_exists().table(BookingLocations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Bookings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(DriverAssignments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Drivers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Ambulances::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(VerificationRecords::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
