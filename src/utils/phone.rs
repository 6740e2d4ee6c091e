use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

fn us_phone_regex() -> &'static Regex {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    PHONE_REGEX.get_or_init(|| Regex::new(r"^\+1\d{10}$").expect("valid phone regex"))
}

/// 验证美国手机号格式
pub fn validate_us_phone(phone: &str) -> AppResult<()> {
    if !us_phone_regex().is_match(phone) {
        return Err(AppError::ValidationError(
            "Invalid phone number, expected US format (+1xxxxxxxxxx)".to_string(),
        ));
    }

    Ok(())
}

/// 格式化手机号，确保以+1开头
pub fn format_us_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() == 11 && digits.starts_with('1') {
        format!("+{}", digits)
    } else if digits.len() == 10 {
        format!("+1{}", digits)
    } else {
        phone.trim().to_string()
    }
}

/// 格式化并校验，返回作为验证记录主键的规范形式
pub fn normalize_us_phone(phone: &str) -> AppResult<String> {
    let formatted = format_us_phone(phone);
    validate_us_phone(&formatted)?;
    Ok(formatted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_us_phone() {
        assert!(validate_us_phone("+12345678901").is_ok());
        assert!(validate_us_phone("+1234567890").is_err());
        assert!(validate_us_phone("12345678901").is_err());
        assert!(validate_us_phone("+22345678901").is_err());
    }

    #[test]
    fn test_format_us_phone() {
        assert_eq!(format_us_phone("2345678901"), "+12345678901");
        assert_eq!(format_us_phone("12345678901"), "+12345678901");
        assert_eq!(format_us_phone("+12345678901"), "+12345678901");
        assert_eq!(format_us_phone("(234) 567-8901"), "+12345678901");
    }

    #[test]
    fn test_normalize_us_phone() {
        assert_eq!(
            normalize_us_phone("+1 (555) 123-4567").unwrap(),
            "+15551234567"
        );
        assert!(normalize_us_phone("555-0000").is_err());
        assert!(normalize_us_phone("").is_err());
    }
}
