//! 设置字段的校验规则
//!
//! 所有规则都是无状态的纯函数，按固定顺序检查，遇到第一个失败即返回。

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::config::ValidationLimits;
use crate::error::{ErrorKind, ValidationError, ValidationResult};

/// 持有边界配置的字段校验器
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldValidator {
    limits: ValidationLimits,
}

impl FieldValidator {
    pub fn new(limits: ValidationLimits) -> Self {
        Self { limits }
    }

    pub fn validate_username(&self, value: &str) -> ValidationResult {
        let username = value.trim();

        if username.is_empty() {
            return Err(ErrorKind::InvalidUsername.into());
        }

        let len = username.chars().count();
        let (min, max) = (
            self.limits.username_min_length,
            self.limits.username_max_length,
        );
        if len < min || len > max {
            return Err(ValidationError::with_message(
                ErrorKind::InvalidUsernameLength,
                format!("Username must be between {} and {} characters.", min, max),
            ));
        }

        if !matches_username_format(username) {
            return Err(ErrorKind::InvalidUsernameFormat.into());
        }

        // 上面的格式检查已排除连续连字符，这里保留作为兜底
        if username.contains("--") {
            return Err(ValidationError::with_message(
                ErrorKind::InvalidUsernameFormat,
                "Username cannot contain consecutive hyphens.",
            ));
        }

        if username.chars().any(|c| c.is_uppercase()) {
            return Err(ErrorKind::InvalidUsernameCase.into());
        }

        Ok(())
    }

    /// 以 `now` 作为当前时刻校验日期
    pub fn validate_date(&self, value: &str, now: DateTime<Utc>) -> ValidationResult {
        if value.is_empty() {
            return Ok(());
        }

        let Some((year, month, day)) = split_iso_date(value) else {
            return Err(ErrorKind::InvalidDateFormat.into());
        };

        let date = if year >= 1 {
            NaiveDate::from_ymd_opt(year, month, day)
        } else {
            None
        };
        let Some(date) = date else {
            return Err(ErrorKind::InvalidDate.into());
        };

        let starts_at = date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        match starts_at {
            Some(starts_at) if starts_at > now => Err(ErrorKind::FutureDate.into()),
            Some(_) => Ok(()),
            None => Err(ErrorKind::InvalidDate.into()),
        }
    }

    pub fn validate_import_limit(&self, value: i64) -> ValidationResult {
        let (min, max) = (self.limits.import_limit_min, self.limits.import_limit_max);
        if value < min || value > max {
            return Err(ValidationError::with_message(
                ErrorKind::InvalidImportLimit,
                format!("Import limit must be between {} and {}.", min, max),
            ));
        }
        Ok(())
    }

    pub fn validate_email(&self, value: &str) -> ValidationResult {
        if is_email(value) {
            Ok(())
        } else {
            Err(ErrorKind::InvalidEmail.into())
        }
    }

    pub fn validate_url(&self, value: &str) -> ValidationResult {
        match url::Url::parse(value) {
            Ok(parsed)
                if matches!(parsed.scheme(), "http" | "https") && parsed.host().is_some() =>
            {
                Ok(())
            }
            _ => Err(ErrorKind::InvalidUrl.into()),
        }
    }
}

pub fn validate_username(value: &str) -> ValidationResult {
    FieldValidator::default().validate_username(value)
}

pub fn validate_date(value: &str) -> ValidationResult {
    FieldValidator::default().validate_date(value, Utc::now())
}

pub fn validate_import_limit(value: i64) -> ValidationResult {
    FieldValidator::default().validate_import_limit(value)
}

/// 字母数字组成，连字符只能出现在中间且不能连续
fn matches_username_format(value: &str) -> bool {
    value
        .split('-')
        .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// 严格匹配 YYYY-MM-DD
fn split_iso_date(value: &str) -> Option<(i32, u32, u32)> {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !digits_ok {
        return None;
    }

    let year = value[0..4].parse().ok()?;
    let month = value[5..7].parse().ok()?;
    let day = value[8..10].parse().ok()?;
    Some((year, month, day))
}

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    if !local.chars().all(is_email_local_char) {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

pub(crate) fn is_email_local_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~.-".contains(c)
}

/// 宽松的整数转换：数字截断，字符串取开头的带符号数字，其余为 0
pub fn coerce_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => leading_int(s),
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

fn leading_int(value: &str) -> i64 {
    let trimmed = value.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    let parsed = digits.parse::<i64>().unwrap_or(if digits.is_empty() {
        0
    } else {
        i64::MAX
    });
    if negative { -parsed } else { parsed }
}
