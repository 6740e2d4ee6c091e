use crate::config::{OtpConfig, SmsProvider, TwilioConfig};
use crate::error::AppResult;
use crate::external::TwilioService;
use async_trait::async_trait;
use std::sync::Arc;

/// 验证码下发通道
#[async_trait]
pub trait CodeSender: Send + Sync {
    async fn send_code(&self, phone: &str, code: &str) -> AppResult<()>;
}

/// 开发环境通道：只把验证码写进日志
#[derive(Debug, Clone, Copy, Default)]
pub struct LogCodeSender;

#[async_trait]
impl CodeSender for LogCodeSender {
    async fn send_code(&self, phone: &str, code: &str) -> AppResult<()> {
        log::info!("Verification code for {phone}: {code} (SMS delivery disabled)");
        Ok(())
    }
}

pub fn build_code_sender(otp: &OtpConfig, twilio: &TwilioConfig) -> Arc<dyn CodeSender> {
    match otp.sms_provider {
        SmsProvider::Log => {
            log::warn!("SMS provider is 'log': verification codes are written to the log only");
            Arc::new(LogCodeSender)
        }
        SmsProvider::Twilio => Arc::new(TwilioService::new(twilio.clone())),
    }
}
