use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub otp: OtpConfig,
    #[serde(default)]
    pub twilio: TwilioConfig,
    #[serde(default)]
    pub admins: Vec<AdminAccount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// postgres://... 或 sqlite::memory: (非持久化, 仅开发环境)
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn is_in_memory(&self) -> bool {
        self.url.starts_with("sqlite::memory:") || self.url.contains("mode=memory")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in: i64, // seconds
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SmsProvider {
    /// 只写日志，不真正发短信
    #[default]
    Log,
    Twilio,
}

impl std::str::FromStr for SmsProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "log" => Ok(SmsProvider::Log),
            "twilio" => Ok(SmsProvider::Twilio),
            other => Err(format!("Unknown SMS provider: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpConfig {
    #[serde(default)]
    pub sms_provider: SmsProvider,
    /// 开发环境下在响应体中回显验证码
    #[serde(default)]
    pub echo_code: bool,
    /// 过期记录清理间隔(秒)，0 表示关闭
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_sweep_interval() -> u64 {
    60
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            sms_provider: SmsProvider::Log,
            echo_code: false,
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminAccount {
    pub username: String,
    /// bcrypt hash
    pub password_hash: String,
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::parse(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Self::from_env_defaults()?,
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn parse(config_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        toml::from_str(config_str)
            .map_err(|e| format!("Failed to parse config file: {e}").into())
    }

    fn from_env_defaults() -> Result<Self, Box<dyn std::error::Error>> {
        // 无配置文件时数据库 URL 必须提供
        let database_url = get_env("DATABASE_URL")
            .ok_or("DATABASE_URL is not set and config.toml was not found")?;

        Ok(Config {
            server: ServerConfig {
                host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: get_env_parse("SERVER_PORT", 8080u16),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
            },
            jwt: JwtConfig {
                secret: get_env("JWT_SECRET")
                    .unwrap_or_else(|| "change-me-in-production".to_string()),
                expires_in: get_env_parse("JWT_EXPIRES_IN", 1800i64),
            },
            otp: OtpConfig::default(),
            twilio: TwilioConfig::default(),
            admins: Vec::new(),
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.expires_in = n;
        }
        if let Ok(v) = env::var("OTP_SMS_PROVIDER") {
            match v.parse() {
                Ok(provider) => self.otp.sms_provider = provider,
                Err(e) => log::warn!("Ignoring OTP_SMS_PROVIDER: {e}"),
            }
        }
        if let Ok(v) = env::var("OTP_ECHO_CODE")
            && let Ok(b) = v.parse()
        {
            self.otp.echo_code = b;
        }
        if let Ok(v) = env::var("OTP_SWEEP_INTERVAL_SECS")
            && let Ok(n) = v.parse()
        {
            self.otp.sweep_interval_secs = n;
        }
        if let Ok(v) = env::var("TWILIO_ACCOUNT_SID") {
            self.twilio.account_sid = v;
        }
        if let Ok(v) = env::var("TWILIO_AUTH_TOKEN") {
            self.twilio.auth_token = v;
        }
        if let Ok(v) = env::var("TWILIO_FROM_PHONE") {
            self.twilio.from_phone = v;
        }
        // ADMIN_USERNAME + ADMIN_PASSWORD_HASH 追加一个管理员
        if let (Some(username), Some(password_hash)) =
            (get_env("ADMIN_USERNAME"), get_env("ADMIN_PASSWORD_HASH"))
        {
            self.admins.retain(|a| a.username != username);
            self.admins.push(AdminAccount {
                username,
                password_hash,
            });
        }
    }
}

fn get_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
