use rand::Rng;

/// 生成6位数字验证码
///
/// `thread_rng` 基于 ChaCha 的 CSPRNG，TTL 内无法被轻易猜中
pub fn generate_six_digit_code() -> String {
    let mut rng = rand::thread_rng();
    format!("{:06}", rng.gen_range(100000..=999999))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_six_digit_code() {
        let code = generate_six_digit_code();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));

        let code_num: u32 = code.parse().unwrap();
        assert!((100000..=999999).contains(&code_num));
    }

    #[test]
    fn test_codes_vary() {
        // 50 次全部相同的概率可以忽略
        let first = generate_six_digit_code();
        let all_same = (0..50).all(|_| generate_six_digit_code() == first);
        assert!(!all_same);
    }
}
