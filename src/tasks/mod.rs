//! 后台定时任务，启动时调用一次 `spawn_all`

use crate::services::VerificationService;
use std::time::Duration;

/// 启动所有后台任务 (不阻塞)
///
/// 过期判断以请求时的检查为准，这里的清理只负责回收存储
pub fn spawn_all(verification_service: VerificationService, sweep_interval_secs: u64) {
    if sweep_interval_secs == 0 {
        log::info!("Expired verification sweep disabled");
        return;
    }

    let svc = verification_service;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(sweep_interval_secs));
        loop {
            interval.tick().await;
            match svc.purge_expired().await {
                Ok(n) if n > 0 => log::info!("Expired verification records purged: {n}"),
                Ok(_) => {}
                Err(e) => log::error!("Failed to purge expired verification records: {e:?}"),
            }
        }
    });
}
