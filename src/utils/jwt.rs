use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // admin username
    pub exp: i64,
    pub iat: i64,
    pub token_type: String,
}

/// 鉴权中间件写入请求扩展的管理员身份
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminIdentity(pub String);

const ADMIN_TOKEN_TYPE: &str = "admin";

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expires_in: i64,
}

impl JwtService {
    pub fn new(secret: &str, expires_in: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expires_in,
        }
    }

    pub fn generate_admin_token(&self, username: &str) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.expires_in);

        let claims = Claims {
            sub: username.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type: ADMIN_TOKEN_TYPE.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AppError::JwtError)
    }

    pub fn verify_admin_token(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(AppError::JwtError)?;

        if claims.token_type != ADMIN_TOKEN_TYPE {
            return Err(AppError::AuthError("Invalid access token type".to_string()));
        }

        Ok(claims)
    }

    pub fn get_expires_in(&self) -> i64 {
        self.expires_in
    }
}
