use crate::config::TwilioConfig;
use crate::error::{AppError, AppResult};
use crate::external::CodeSender;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SendSmsResponse {
    pub sid: String,
    pub status: String,
    pub error_code: Option<i64>,
    pub error_message: Option<String>,
}

#[derive(Clone)]
pub struct TwilioService {
    client: Client,
    config: TwilioConfig,
}

impl TwilioService {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn message_body(code: &str) -> String {
        format!("Your ambulette booking verification code is: {code}. It is valid for 5 minutes.")
    }

    pub async fn send_sms(&self, phone: &str, body: &str) -> AppResult<SendSmsResponse> {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.config.account_sid
        );

        let params = [
            ("To", phone),
            ("From", self.config.from_phone.as_str()),
            ("Body", body),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&params)
            .send()
            .await?;

        if response.status().is_success() {
            let sms: SendSmsResponse = response.json().await?;
            log::info!("Verification SMS queued: {} sid={} status={}", phone, sms.sid, sms.status);
            Ok(sms)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Verification SMS failed to send: {}, Error: {}", phone, error_text);
            Err(AppError::ExternalApiError(format!(
                "SMS sending failed: {}",
                error_text
            )))
        }
    }
}

#[async_trait]
impl CodeSender for TwilioService {
    async fn send_code(&self, phone: &str, code: &str) -> AppResult<()> {
        let sms = self.send_sms(phone, &Self::message_body(code)).await?;
        if let Some(error_code) = sms.error_code {
            return Err(AppError::ExternalApiError(format!(
                "SMS rejected ({error_code}): {}",
                sms.error_message.unwrap_or_default()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_body_contains_code() {
        let body = TwilioService::message_body("482913");
        assert!(body.contains("482913"));
        assert!(body.contains("5 minutes"));
    }
}
