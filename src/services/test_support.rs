//! 服务层测试共用：内存 SQLite + 手动时钟

use crate::config::DatabaseConfig;
use crate::database::{DbPool, create_pool, run_migrations};
use crate::external::LogCodeSender;
use crate::services::VerificationService;
use crate::utils::ManualClock;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap()
}

pub async fn setup_db() -> DbPool {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
    };
    let pool = create_pool(&config).await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

pub fn verification_service(db: &DbPool, clock: &ManualClock) -> VerificationService {
    VerificationService::new(
        db.clone(),
        Arc::new(LogCodeSender),
        Arc::new(clock.clone()),
        false,
    )
}

/// 走完 发送 -> 提交 流程，使该手机号处于已验证状态
pub async fn verify_phone(service: &VerificationService, phone: &str) {
    let issued = service.issue_challenge(phone).await.unwrap();
    service.submit_code(phone, &issued.code).await.unwrap();
}
