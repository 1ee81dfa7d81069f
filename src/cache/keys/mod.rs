// 缓存键模块

/// 限流计数器键前缀
const RATE_LIMIT_PREFIX: &str = "rate_limit:";

/// 生成限流计数器键
pub fn rate_limit_key(identifier: &str) -> String {
    format!("{}{}", RATE_LIMIT_PREFIX, identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_key() {
        assert_eq!(
            rate_limit_key("letterboxd_rate_limit"),
            "rate_limit:letterboxd_rate_limit"
        );
    }
}
