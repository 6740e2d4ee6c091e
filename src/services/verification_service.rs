use crate::entities::verification_record_entity as records;
use crate::error::{AppResult, VerificationError};
use crate::external::CodeSender;
use crate::models::{IssuedChallenge, VerifyCodeResponse};
use crate::utils::{Clock, generate_six_digit_code, normalize_us_phone};
use chrono::Duration;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use uuid::Uuid;

/// 验证码有效期 5 分钟，从发送时刻起算
pub const CHALLENGE_TTL_SECONDS: i64 = 300;

/// 与验证码消费处于同一事务内的写入操作
pub type CommitFuture<'c, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'c>>;

/// 手机验证码闸门
///
/// 状态: 无记录 -> 未验证 -> 已验证 -> 已消费(删除)，未验证 / 已验证都会在
/// expires_at 之后视为不存在。
///
/// 已知薄弱点（保持原样，未做处理）:
/// - 重新发送会无条件覆盖旧记录，没有频率限制
/// - 输错验证码不计次数，没有锁定
#[derive(Clone)]
pub struct VerificationService {
    pool: DatabaseConnection,
    sender: Arc<dyn CodeSender>,
    clock: Arc<dyn Clock>,
    echo_code: bool,
}

impl VerificationService {
    pub fn new(
        pool: DatabaseConnection,
        sender: Arc<dyn CodeSender>,
        clock: Arc<dyn Clock>,
        echo_code: bool,
    ) -> Self {
        Self {
            pool,
            sender,
            clock,
            echo_code,
        }
    }

    /// 是否在响应中回显验证码 (仅开发环境)
    pub fn echo_code(&self) -> bool {
        self.echo_code
    }

    /// 发送验证码：整体替换该手机号已有记录，然后通过短信通道下发
    ///
    /// 替换与下发在同一事务内，下发失败则回滚，旧记录 (包括已验证状态) 保持不变
    pub async fn issue_challenge(&self, phone: &str) -> AppResult<IssuedChallenge> {
        let phone = normalize_us_phone(phone)?;
        let code = generate_six_digit_code();
        let issued_at = self.clock.now();
        let expires_at = issued_at + Duration::seconds(CHALLENGE_TTL_SECONDS);

        let record = records::ActiveModel {
            phone: Set(phone.clone()),
            challenge_id: Set(Uuid::new_v4()),
            code: Set(code.clone()),
            issued_at: Set(issued_at),
            expires_at: Set(expires_at),
            verified: Set(false),
            verified_at: Set(None),
        };

        let txn = self.pool.begin().await?;
        records::Entity::insert(record)
            .on_conflict(
                OnConflict::column(records::Column::Phone)
                    .update_columns([
                        records::Column::ChallengeId,
                        records::Column::Code,
                        records::Column::IssuedAt,
                        records::Column::ExpiresAt,
                        records::Column::Verified,
                        records::Column::VerifiedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;

        if let Err(e) = self.sender.send_code(&phone, &code).await {
            txn.rollback().await?;
            log::warn!("Verification code delivery to {phone} failed, previous record kept");
            return Err(e);
        }
        txn.commit().await?;
        log::info!("Verification code issued for {phone}, expires at {expires_at}");

        Ok(IssuedChallenge {
            phone,
            code,
            expires_at,
        })
    }

    /// 提交验证码
    ///
    /// 判断顺序: 不存在 -> 已过期(顺手清除) -> 不匹配(记录不变)
    pub async fn submit_code(&self, phone: &str, code: &str) -> AppResult<VerifyCodeResponse> {
        let phone = normalize_us_phone(phone)?;
        let now = self.clock.now();

        let record = records::Entity::find_by_id(phone.clone())
            .one(&self.pool)
            .await?
            .ok_or(VerificationError::NotFound)?;

        if record.is_expired(now) {
            self.purge_challenge(&record).await?;
            log::info!("Expired verification code purged for {phone}");
            return Err(VerificationError::Expired.into());
        }

        if record.code != code.trim() {
            log::warn!("Verification code mismatch for {phone}");
            return Err(VerificationError::Mismatch.into());
        }

        // 已验证过的重复提交直接成功，verified_at 保持第一次的时间
        if !record.verified {
            let result = records::Entity::update_many()
                .col_expr(records::Column::Verified, Expr::value(true))
                .col_expr(records::Column::VerifiedAt, Expr::value(now))
                .filter(records::Column::Phone.eq(phone.as_str()))
                .filter(records::Column::ChallengeId.eq(record.challenge_id))
                .filter(records::Column::Verified.eq(false))
                .exec(&self.pool)
                .await?;

            if result.rows_affected == 0 {
                // 期间被重新发送或已被消费
                let current = records::Entity::find_by_id(phone.clone())
                    .one(&self.pool)
                    .await?;
                let still_ours = current
                    .map(|c| c.challenge_id == record.challenge_id && c.verified)
                    .unwrap_or(false);
                if !still_ours {
                    return Err(VerificationError::NotFound.into());
                }
            } else {
                log::info!("Phone {phone} verified");
            }
        }

        Ok(VerifyCodeResponse {
            phone,
            verified: true,
            expires_at: record.expires_at,
        })
    }

    /// 仅做授权检查并消费验证记录，不附带其它写入
    pub async fn authorize(&self, phone: &str) -> AppResult<()> {
        self.authorize_with(phone, |_txn| Box::pin(async { Ok(()) }))
            .await
    }

    /// 授权并消费：在同一事务中删除已验证记录并执行 `commit`
    ///
    /// - 记录不存在或未验证 -> NotVerified (先于过期判断)
    /// - 已验证但已过期 -> Expired，并清除记录
    /// - 条件删除 (phone, challenge_id, verified) 影响行数为 1 才算抢到，
    ///   并发的第二个请求只会看到 0 行
    /// - `commit` 失败则整体回滚，验证状态保留
    pub async fn authorize_with<T, F>(&self, phone: &str, commit: F) -> AppResult<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c DatabaseTransaction) -> CommitFuture<'c, T> + Send,
    {
        let phone = normalize_us_phone(phone)?;
        let now = self.clock.now();
        let txn = self.pool.begin().await?;

        let record = match records::Entity::find_by_id(phone.clone()).one(&txn).await? {
            Some(record) if record.verified => record,
            _ => {
                txn.rollback().await?;
                return Err(VerificationError::NotVerified.into());
            }
        };

        if record.is_expired(now) {
            records::Entity::delete_many()
                .filter(records::Column::Phone.eq(phone.as_str()))
                .filter(records::Column::ChallengeId.eq(record.challenge_id))
                .exec(&txn)
                .await?;
            txn.commit().await?;
            log::info!("Verification for {phone} expired before use");
            return Err(VerificationError::Expired.into());
        }

        let consumed = records::Entity::delete_many()
            .filter(records::Column::Phone.eq(phone.as_str()))
            .filter(records::Column::ChallengeId.eq(record.challenge_id))
            .filter(records::Column::Verified.eq(true))
            .exec(&txn)
            .await?;

        if consumed.rows_affected != 1 {
            txn.rollback().await?;
            log::warn!("Verification for {phone} was consumed concurrently");
            return Err(VerificationError::NotVerified.into());
        }

        match commit(&txn).await {
            Ok(value) => {
                txn.commit().await?;
                log::info!("Verification for {phone} consumed");
                Ok(value)
            }
            Err(e) => {
                txn.rollback().await?;
                Err(e)
            }
        }
    }

    /// 清理所有已过期的记录，返回删除条数
    pub async fn purge_expired(&self) -> AppResult<u64> {
        let now = self.clock.now();
        let result = records::Entity::delete_many()
            .filter(records::Column::ExpiresAt.lt(now))
            .exec(&self.pool)
            .await?;
        Ok(result.rows_affected)
    }

    async fn purge_challenge(&self, record: &records::Model) -> AppResult<()> {
        records::Entity::delete_many()
            .filter(records::Column::Phone.eq(record.phone.as_str()))
            .filter(records::Column::ChallengeId.eq(record.challenge_id))
            .exec(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::services::test_support::{setup_db, t0, verification_service};
    use crate::utils::ManualClock;
    use async_trait::async_trait;

    struct UnreachableSender;

    #[async_trait]
    impl CodeSender for UnreachableSender {
        async fn send_code(&self, _phone: &str, _code: &str) -> AppResult<()> {
            Err(AppError::ExternalApiError("carrier unreachable".to_string()))
        }
    }

    fn verification_err<T: std::fmt::Debug>(result: AppResult<T>) -> VerificationError {
        match result {
            Err(AppError::Verification(e)) => e,
            other => panic!("expected verification error, got {other:?}"),
        }
    }

    async fn stored(service: &VerificationService, phone: &str) -> Option<records::Model> {
        records::Entity::find_by_id(phone.to_string())
            .one(&service.pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_failed_delivery_keeps_previous_verification() {
        let db = setup_db().await;
        let clock = ManualClock::new(t0());
        let service = verification_service(&db, &clock);
        let issued = service.issue_challenge("+15551234567").await.unwrap();
        service
            .submit_code("+15551234567", &issued.code)
            .await
            .unwrap();

        let unreachable = VerificationService::new(
            db.clone(),
            Arc::new(UnreachableSender),
            Arc::new(clock.clone()),
            false,
        );
        clock.advance(Duration::seconds(30));
        let result = unreachable.issue_challenge("+15551234567").await;
        assert!(matches!(result, Err(AppError::ExternalApiError(_))));

        let record = stored(&service, "+15551234567").await.unwrap();
        assert!(record.verified);
        assert_eq!(record.code, issued.code);
        assert_eq!(record.issued_at, t0());
        service.authorize("+15551234567").await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_delivery_leaves_no_record() {
        let db = setup_db().await;
        let clock = ManualClock::new(t0());
        let unreachable = VerificationService::new(
            db.clone(),
            Arc::new(UnreachableSender),
            Arc::new(clock.clone()),
            false,
        );
        assert!(unreachable.issue_challenge("+15551234567").await.is_err());
        assert!(stored(&unreachable, "+15551234567").await.is_none());
    }

    #[tokio::test]
    async fn test_issue_creates_unverified_record() {
        let db = setup_db().await;
        let clock = ManualClock::new(t0());
        let service = verification_service(&db, &clock);

        let issued = service.issue_challenge("+15551234567").await.unwrap();
        assert_eq!(issued.code.len(), 6);
        assert_eq!(issued.expires_at, t0() + Duration::seconds(300));

        let record = stored(&service, "+15551234567").await.unwrap();
        assert!(!record.verified);
        assert!(record.verified_at.is_none());
        assert_eq!(record.issued_at, t0());
    }

    #[tokio::test]
    async fn test_phone_is_normalized_for_every_operation() {
        let db = setup_db().await;
        let clock = ManualClock::new(t0());
        let service = verification_service(&db, &clock);

        let issued = service.issue_challenge("(555) 123-4567").await.unwrap();
        assert_eq!(issued.phone, "+15551234567");
        service
            .submit_code("1-555-123-4567", &issued.code)
            .await
            .unwrap();
        service.authorize("+15551234567").await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_phone_is_rejected() {
        let db = setup_db().await;
        let clock = ManualClock::new(t0());
        let service = verification_service(&db, &clock);

        assert!(matches!(
            service.issue_challenge("12345").await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_submit_without_challenge_is_not_found() {
        let db = setup_db().await;
        let clock = ManualClock::new(t0());
        let service = verification_service(&db, &clock);

        let err = verification_err(service.submit_code("+15551234567", "123456").await);
        assert_eq!(err, VerificationError::NotFound);
    }

    #[tokio::test]
    async fn test_wrong_code_does_not_verify_and_no_lockout() {
        let db = setup_db().await;
        let clock = ManualClock::new(t0());
        let service = verification_service(&db, &clock);
        let issued = service.issue_challenge("+15551234567").await.unwrap();
        let wrong = if issued.code == "000000" { "111111" } else { "000000" };

        for _ in 0..5 {
            let err = verification_err(service.submit_code("+15551234567", wrong).await);
            assert_eq!(err, VerificationError::Mismatch);
        }
        assert!(!stored(&service, "+15551234567").await.unwrap().verified);

        service
            .submit_code("+15551234567", &issued.code)
            .await
            .unwrap();
        assert!(stored(&service, "+15551234567").await.unwrap().verified);
    }

    #[tokio::test]
    async fn test_resubmit_keeps_first_verified_at() {
        let db = setup_db().await;
        let clock = ManualClock::new(t0());
        let service = verification_service(&db, &clock);
        let issued = service.issue_challenge("+15551234567").await.unwrap();

        clock.advance(Duration::seconds(30));
        service.submit_code("+15551234567", &issued.code).await.unwrap();
        clock.advance(Duration::seconds(30));
        service.submit_code("+15551234567", &issued.code).await.unwrap();

        let record = stored(&service, "+15551234567").await.unwrap();
        assert_eq!(record.verified_at, Some(t0() + Duration::seconds(30)));
    }

    #[tokio::test]
    async fn test_submit_after_expiry_purges_record() {
        let db = setup_db().await;
        let clock = ManualClock::new(t0());
        let service = verification_service(&db, &clock);
        let issued = service.issue_challenge("+15551234567").await.unwrap();

        clock.advance(Duration::seconds(301));
        let err = verification_err(service.submit_code("+15551234567", &issued.code).await);
        assert_eq!(err, VerificationError::Expired);
        assert!(stored(&service, "+15551234567").await.is_none());

        let err = verification_err(service.submit_code("+15551234567", &issued.code).await);
        assert_eq!(err, VerificationError::NotFound);
    }

    #[tokio::test]
    async fn test_code_is_valid_at_exact_expiry() {
        let db = setup_db().await;
        let clock = ManualClock::new(t0());
        let service = verification_service(&db, &clock);
        let issued = service.issue_challenge("+15551234567").await.unwrap();

        clock.advance(Duration::seconds(CHALLENGE_TTL_SECONDS));
        service.submit_code("+15551234567", &issued.code).await.unwrap();
    }

    #[tokio::test]
    async fn test_reissue_invalidates_old_code() {
        let db = setup_db().await;
        let clock = ManualClock::new(t0());
        let service = verification_service(&db, &clock);

        let first = service.issue_challenge("+15551234567").await.unwrap();
        let mut second = service.issue_challenge("+15551234567").await.unwrap();
        while second.code == first.code {
            second = service.issue_challenge("+15551234567").await.unwrap();
        }

        let err = verification_err(service.submit_code("+15551234567", &first.code).await);
        assert!(matches!(
            err,
            VerificationError::Mismatch | VerificationError::NotFound
        ));
        service.submit_code("+15551234567", &second.code).await.unwrap();
    }

    #[tokio::test]
    async fn test_reissue_resets_verified_state() {
        let db = setup_db().await;
        let clock = ManualClock::new(t0());
        let service = verification_service(&db, &clock);

        let issued = service.issue_challenge("+15551234567").await.unwrap();
        service.submit_code("+15551234567", &issued.code).await.unwrap();
        service.issue_challenge("+15551234567").await.unwrap();

        let err = verification_err(service.authorize("+15551234567").await);
        assert_eq!(err, VerificationError::NotVerified);
    }

    #[tokio::test]
    async fn test_authorize_without_challenge_is_not_verified() {
        let db = setup_db().await;
        let clock = ManualClock::new(t0());
        let service = verification_service(&db, &clock);

        let err = verification_err(service.authorize("+15551234567").await);
        assert_eq!(err, VerificationError::NotVerified);
    }

    #[tokio::test]
    async fn test_authorize_after_ttl_is_expired_even_if_verified() {
        let db = setup_db().await;
        let clock = ManualClock::new(t0());
        let service = verification_service(&db, &clock);
        let issued = service.issue_challenge("+15551234567").await.unwrap();

        clock.advance(Duration::seconds(240));
        service.submit_code("+15551234567", &issued.code).await.unwrap();

        // 验证不会延长有效期
        clock.advance(Duration::seconds(61));
        let err = verification_err(service.authorize("+15551234567").await);
        assert_eq!(err, VerificationError::Expired);
        assert!(stored(&service, "+15551234567").await.is_none());
    }

    #[tokio::test]
    async fn test_unverified_and_expired_reports_not_verified() {
        let db = setup_db().await;
        let clock = ManualClock::new(t0());
        let service = verification_service(&db, &clock);

        service.issue_challenge("+15550000000").await.unwrap();
        clock.advance(Duration::seconds(301));

        let err = verification_err(service.authorize("+15550000000").await);
        assert_eq!(err, VerificationError::NotVerified);
    }

    #[tokio::test]
    async fn test_end_to_end_single_use() {
        let db = setup_db().await;
        let clock = ManualClock::new(t0());
        let service = verification_service(&db, &clock);

        let issued = service.issue_challenge("+15551234567").await.unwrap();
        assert_eq!(issued.expires_at, t0() + Duration::seconds(300));

        clock.set(t0() + Duration::seconds(60));
        service.submit_code("+15551234567", &issued.code).await.unwrap();

        clock.set(t0() + Duration::seconds(120));
        service.authorize("+15551234567").await.unwrap();
        assert!(stored(&service, "+15551234567").await.is_none());

        let err = verification_err(service.authorize("+15551234567").await);
        assert_eq!(err, VerificationError::NotVerified);
        let err = verification_err(service.submit_code("+15551234567", &issued.code).await);
        assert_eq!(err, VerificationError::NotFound);
    }

    #[tokio::test]
    async fn test_failed_commit_keeps_verification() {
        let db = setup_db().await;
        let clock = ManualClock::new(t0());
        let service = verification_service(&db, &clock);
        let issued = service.issue_challenge("+15551234567").await.unwrap();
        service.submit_code("+15551234567", &issued.code).await.unwrap();

        let result: AppResult<()> = service
            .authorize_with("+15551234567", |_txn| {
                Box::pin(async { Err(AppError::InternalError("insert failed".into())) })
            })
            .await;
        assert!(matches!(result, Err(AppError::InternalError(_))));
        assert!(stored(&service, "+15551234567").await.unwrap().verified);

        let value = service
            .authorize_with("+15551234567", |_txn| Box::pin(async { Ok(42) }))
            .await
            .unwrap();
        assert_eq!(value, 42);
        assert!(stored(&service, "+15551234567").await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_authorize_succeeds_once() {
        let db = setup_db().await;
        let clock = ManualClock::new(t0());
        let service = verification_service(&db, &clock);
        let issued = service.issue_challenge("+15551234567").await.unwrap();
        service.submit_code("+15551234567", &issued.code).await.unwrap();

        let (a, b) = tokio::join!(
            service.authorize("+15551234567"),
            service.authorize("+15551234567")
        );
        let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn test_purge_expired_only_removes_stale_records() {
        let db = setup_db().await;
        let clock = ManualClock::new(t0());
        let service = verification_service(&db, &clock);

        service.issue_challenge("+15550000001").await.unwrap();
        clock.advance(Duration::seconds(200));
        service.issue_challenge("+15550000002").await.unwrap();
        clock.advance(Duration::seconds(200));

        assert_eq!(service.purge_expired().await.unwrap(), 1);
        assert!(stored(&service, "+15550000001").await.is_none());
        assert!(stored(&service, "+15550000002").await.is_some());
    }
}
