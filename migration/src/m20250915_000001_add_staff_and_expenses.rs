use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Employees {
    Table,
    Id,
    Name,
    Role,
    Phone,
    Email,
    IsActive,
    HiredOn,
    CreatedAt,
    UpdatedAt,
}

/// 考勤 (每名员工每天最多一条签到 / 签退)
#[derive(DeriveIden)]
enum Attendance {
    Table,
    Id,
    EmployeeId,
    WorkDate,
    CheckInAt,
    CheckOutAt,
}

#[derive(DeriveIden)]
enum Expenses {
    Table,
    Id,
    Category,
    AmountCents,
    Description,
    ExpenseDate,
    EmployeeId,
    AmbulanceId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Ambulances {
    Table,
    Id,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Employees::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Employees::Name).string().not_null())
                    .col(ColumnDef::new(Employees::Role).string_len(20).not_null())
                    .col(ColumnDef::new(Employees::Phone).string_len(20).not_null())
                    .col(ColumnDef::new(Employees::Email).string().null())
                    .col(
                        ColumnDef::new(Employees::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Employees::HiredOn).date().null())
                    .col(
                        ColumnDef::new(Employees::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Employees::UpdatedAt)
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
                    .table(Attendance::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Attendance::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Attendance::EmployeeId).uuid().not_null())
                    .col(ColumnDef::new(Attendance::WorkDate).date().not_null())
                    .col(
                        ColumnDef::new(Attendance::CheckInAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Attendance::CheckOutAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendance_employee")
                            .from(Attendance::Table, Attendance::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_attendance_employee_date_unique")
                    .table(Attendance::Table)
                    .col(Attendance::EmployeeId)
                    .col(Attendance::WorkDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Expenses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Expenses::Category).string_len(20).not_null())
                    .col(ColumnDef::new(Expenses::AmountCents).big_integer().not_null())
                    .col(ColumnDef::new(Expenses::Description).text().null())
                    .col(ColumnDef::new(Expenses::ExpenseDate).date().not_null())
                    .col(ColumnDef::new(Expenses::EmployeeId).uuid().null())
                    .col(ColumnDef::new(Expenses::AmbulanceId).uuid().null())
                    .col(
                        ColumnDef::new(Expenses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expense_employee")
                            .from(Expenses::Table, Expenses::EmployeeId)
                            .to(Employees::Table, Employees::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expense_ambulance")
                            .from(Expenses::Table, Expenses::AmbulanceId)
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
                    .name("idx_expenses_expense_date")
                    .table(Expenses::Table)
                    .col(Expenses::ExpenseDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Attendance::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Employees::Table).to_owned())
            .await?;
        Ok(())
    }
}
