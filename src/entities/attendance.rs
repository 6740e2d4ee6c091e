use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;

/// 考勤记录 (employee_id, work_date) 唯一
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "attendance")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub employee_id: Uuid,
    pub work_date: NaiveDate,
    pub check_in_at: DateTime<Utc>,
    pub check_out_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn is_open(&self) -> bool {
        self.check_out_at.is_none()
    }

    /// 已签退时的工作分钟数
    pub fn worked_minutes(&self) -> Option<i64> {
        self.check_out_at
            .map(|out| (out - self.check_in_at).num_minutes())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
