use crate::config::AdminAccount;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{JwtService, verify_password};
use std::sync::Arc;

/// 管理员登录：账号来自配置文件，密码为 bcrypt hash
#[derive(Clone)]
pub struct AdminService {
    admins: Arc<Vec<AdminAccount>>,
    jwt_service: JwtService,
}

impl AdminService {
    pub fn new(admins: Vec<AdminAccount>, jwt_service: JwtService) -> Self {
        if admins.is_empty() {
            log::warn!("No admin accounts configured, admin login is disabled");
        }
        Self {
            admins: Arc::new(admins),
            jwt_service,
        }
    }

    pub async fn login(&self, request: AdminLoginRequest) -> AppResult<AdminLoginResponse> {
        let invalid = || AppError::AuthError("Invalid username or password".to_string());

        let account = self
            .admins
            .iter()
            .find(|a| a.username == request.username)
            .ok_or_else(invalid)?;

        if !verify_password(&request.password, &account.password_hash)? {
            log::warn!("Failed admin login for {}", request.username);
            return Err(invalid());
        }

        let access_token = self.jwt_service.generate_admin_token(&account.username)?;
        log::info!("Admin {} logged in", account.username);

        Ok(AdminLoginResponse {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: self.jwt_service.get_expires_in(),
        })
    }
}
