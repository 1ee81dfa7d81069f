use std::env;
use std::str::FromStr;
use std::time::Duration;

/// 应用配置，全部来自环境变量
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub redis_url: Option<String>,
    pub auth_secret: String,
    pub session_expiration_secs: u64,
    pub nonce_lifetime_secs: u64,
    pub rate_limit_window_secs: u64,
    pub rate_limit_requests: u32,
    pub rate_limit_key: String,
    pub import_limit_min: i64,
    pub import_limit_max: i64,
    pub username_min_length: usize,
    pub username_max_length: usize,
    pub debug_mode: bool,
    pub admin_url: String,
    pub required_capability: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            redis_url: None,
            auth_secret: "insecure-development-secret".to_string(),
            session_expiration_secs: 24 * 3600,
            nonce_lifetime_secs: 86_400,
            rate_limit_window_secs: 60,
            rate_limit_requests: 10,
            rate_limit_key: "letterboxd_rate_limit".to_string(),
            import_limit_min: 1,
            import_limit_max: 100,
            username_min_length: 2,
            username_max_length: 15,
            debug_mode: false,
            admin_url: "http://localhost:3000/wp-admin/".to_string(),
            required_capability: "manage_options".to_string(),
        }
    }
}

/// 读取可选变量，缺失或无法解析时使用默认值
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value for {}, falling back to default", key);
            default
        }),
        Err(_) => default,
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let defaults = Config::default();
        let session_expiration = env::var("SESSION_EXPIRATION")
            .ok()
            .and_then(|v| v.trim_end_matches('h').parse::<u64>().ok())
            .unwrap_or(24);

        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            redis_url: env::var("REDIS_URL").ok().filter(|v| !v.trim().is_empty()),
            auth_secret: env::var("AUTH_SECRET")?,
            session_expiration_secs: session_expiration * 3600,
            nonce_lifetime_secs: env_or("NONCE_LIFETIME", defaults.nonce_lifetime_secs),
            rate_limit_window_secs: env_or("RATE_LIMIT_WINDOW", defaults.rate_limit_window_secs),
            rate_limit_requests: env_or("RATE_LIMIT_REQUESTS", defaults.rate_limit_requests),
            rate_limit_key: env::var("RATE_LIMIT_KEY").unwrap_or(defaults.rate_limit_key),
            import_limit_min: env_or("IMPORT_LIMIT_MIN", defaults.import_limit_min),
            import_limit_max: env_or("IMPORT_LIMIT_MAX", defaults.import_limit_max),
            username_min_length: env_or("USERNAME_MIN_LENGTH", defaults.username_min_length),
            username_max_length: env_or("USERNAME_MAX_LENGTH", defaults.username_max_length),
            debug_mode: env_flag("DEBUG_MODE"),
            admin_url: env::var("ADMIN_URL").unwrap_or(defaults.admin_url),
            required_capability: env::var("REQUIRED_CAPABILITY")
                .unwrap_or(defaults.required_capability),
        })
    }

    pub fn session_expiration(&self) -> Duration {
        Duration::from_secs(self.session_expiration_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn guard_config(&self) -> GuardConfig {
        GuardConfig {
            rate_limit_key: self.rate_limit_key.clone(),
            rate_limit_window: self.rate_limit_window(),
            rate_limit_requests: self.rate_limit_requests,
            debug_mode: self.debug_mode,
            required_capability: self.required_capability.clone(),
            admin_url: self.admin_url.clone(),
            ..GuardConfig::default()
        }
    }

    pub fn validation_limits(&self) -> ValidationLimits {
        ValidationLimits {
            username_min_length: self.username_min_length,
            username_max_length: self.username_max_length,
            import_limit_min: self.import_limit_min,
            import_limit_max: self.import_limit_max,
        }
    }
}

/// 请求守卫配置
#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub rate_limit_key: String,
    pub rate_limit_window: Duration,
    pub rate_limit_requests: u32,
    /// 开启后跳过限流，仅用于本地开发
    pub debug_mode: bool,
    pub required_capability: String,
    /// 表单提交的 Referer 必须以此开头
    pub admin_url: String,
    pub ajax_action: String,
    pub ajax_nonce_field: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            rate_limit_key: "letterboxd_rate_limit".to_string(),
            rate_limit_window: Duration::from_secs(60),
            rate_limit_requests: 10,
            debug_mode: false,
            required_capability: "manage_options".to_string(),
            admin_url: "http://localhost:3000/wp-admin/".to_string(),
            ajax_action: "letterboxd_ajax_nonce".to_string(),
            ajax_nonce_field: "nonce".to_string(),
        }
    }
}

/// 字段校验的边界值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationLimits {
    pub username_min_length: usize,
    pub username_max_length: usize,
    pub import_limit_min: i64,
    pub import_limit_max: i64,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            username_min_length: 2,
            username_max_length: 15,
            import_limit_min: 1,
            import_limit_max: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projections_carry_defaults() {
        let config = Config::default();
        let guard = config.guard_config();
        assert_eq!(guard.rate_limit_requests, 10);
        assert_eq!(guard.rate_limit_window, Duration::from_secs(60));
        assert_eq!(guard.required_capability, "manage_options");
        assert!(!guard.debug_mode);

        assert_eq!(config.validation_limits(), ValidationLimits::default());
    }
}
