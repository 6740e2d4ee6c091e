pub mod admin;
pub mod booking;
pub mod expense;
pub mod fleet;
pub mod health;
pub mod otp;
pub mod staff;

pub use admin::admin_config;
pub use booking::booking_config;
pub use expense::expense_config;
pub use fleet::fleet_config;
pub use health::health_config;
pub use otp::otp_config;
pub use staff::staff_config;

use crate::error::AppError;
use actix_web::web;

/// 请求体 JSON 解析失败时返回统一的错误结构
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(format!("Invalid request body: {err}")).into()
    })
}

/// 查询参数解析失败时返回统一的错误结构
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(format!("Invalid query parameters: {err}")).into()
    })
}

/// /api/v1 下的全部路由
pub fn api_config(cfg: &mut web::ServiceConfig) {
    cfg.configure(otp_config)
        .configure(booking_config)
        .configure(admin_config)
        .configure(fleet_config)
        .configure(staff_config)
        .configure(expense_config);
}
