use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 手机验证码记录
/// - phone: 主键，同一手机号最多一条，重新发送时整体替换
/// - challenge_id: 每次发送重新生成，条件更新 / 删除都带上它，避免误操作替换后的新记录
/// - expires_at: issued_at + 5 分钟，验证成功不会延长
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "verification_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub phone: String,
    pub challenge_id: Uuid,
    pub code: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
}

impl Model {
    /// 超过 expires_at 即视为不存在
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
