use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{ErrorKind, ValidationError, ValidationResult};
use crate::infrastructure::clock::{Clock, SystemClock};
use crate::validation::{FieldValidator, coerce_int};

use super::model::{FieldRejection, RawSettingsPayload, SanitizationReport, SanitizedSettings};
use super::text::{esc_url_raw, sanitize_email, sanitize_text_field, scalar_text};

/// 把原始设置逐字段清理、校验，失败的字段直接丢弃
#[derive(Clone)]
pub struct OptionsSanitizer {
    validator: FieldValidator,
    clock: Arc<dyn Clock>,
}

impl Default for OptionsSanitizer {
    fn default() -> Self {
        Self::new(FieldValidator::default(), Arc::new(SystemClock))
    }
}

impl OptionsSanitizer {
    pub fn new(validator: FieldValidator, clock: Arc<dyn Clock>) -> Self {
        Self { validator, clock }
    }

    pub fn sanitize(&self, raw: &RawSettingsPayload) -> SanitizedSettings {
        let report = self.sanitize_with_report(raw);
        for rejection in &report.rejected {
            tracing::debug!(
                field = rejection.field,
                kind = ?rejection.kind,
                "Dropped invalid settings field"
            );
        }
        report.settings
    }

    pub fn sanitize_with_report(&self, raw: &RawSettingsPayload) -> SanitizationReport {
        let mut report = SanitizationReport::default();
        let now = self.clock.now();

        if let Some(value) = raw.get("username") {
            let username = sanitize_text_field(&scalar_text(value));
            if accept(
                &mut report,
                "username",
                self.validator.validate_username(&username),
            ) {
                report.settings.username = Some(username);
            }
        }

        if let Some(value) = raw.get("start_date") {
            let date = sanitize_text_field(&scalar_text(value));
            if accept(
                &mut report,
                "start_date",
                self.validator.validate_date(&date, now),
            ) {
                report.settings.start_date = Some(date);
            }
        }

        // 复选框语义：只要键存在即为 true
        report.settings.draft_status = raw.contains_key("draft_status");

        if let Some(value) = raw.get("import_limit") {
            let limit = coerce_int(value);
            if accept(
                &mut report,
                "import_limit",
                self.validator.validate_import_limit(limit),
            ) {
                report.settings.import_limit = Some(limit);
            }
        }

        if let Some(value) = raw.get("email") {
            let email = sanitize_email(&scalar_text(value));
            if !email.is_empty()
                && accept(&mut report, "email", self.validator.validate_email(&email))
            {
                report.settings.email = Some(email);
            }
        }

        if let Some(value) = raw.get("url") {
            let url = esc_url_raw(&scalar_text(value));
            if !url.is_empty() && accept(&mut report, "url", self.validator.validate_url(&url)) {
                report.settings.url = Some(url);
            }
        }

        if let Some(value) = raw.get("settings") {
            match value {
                Value::Object(nested) => {
                    report.settings.settings = Some(clean_nested(nested));
                }
                _ => report.rejected.push(FieldRejection {
                    field: "settings",
                    kind: ErrorKind::InvalidPayload,
                    message: "Settings must be a mapping.".to_string(),
                }),
            }
        }

        report
    }
}

fn accept(report: &mut SanitizationReport, field: &'static str, result: ValidationResult) -> bool {
    match result {
        Ok(()) => true,
        Err(ValidationError { kind, message }) => {
            report.rejected.push(FieldRejection {
                field,
                kind,
                message,
            });
            false
        }
    }
}

/// 嵌套设置只做文本清理，不做语义校验
fn clean_nested(nested: &serde_json::Map<String, Value>) -> BTreeMap<String, String> {
    nested
        .iter()
        .filter(|(_, value)| !matches!(value, Value::Array(_) | Value::Object(_) | Value::Null))
        .map(|(key, value)| (key.clone(), sanitize_text_field(&scalar_text(value))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::MockClock;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn payload(value: Value) -> RawSettingsPayload {
        match value {
            Value::Object(map) => map,
            _ => panic!("payload must be an object"),
        }
    }

    fn sanitizer() -> OptionsSanitizer {
        let clock = MockClock::new(Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap());
        OptionsSanitizer::new(FieldValidator::default(), Arc::new(clock))
    }

    #[test]
    fn test_empty_payload_still_has_draft_status() {
        let settings = sanitizer().sanitize(&payload(json!({})));
        assert_eq!(settings, SanitizedSettings::default());
        assert!(!settings.draft_status);
    }

    #[test]
    fn test_partial_success_drops_invalid_username() {
        let settings = sanitizer().sanitize(&payload(json!({
            "username": "Bad_Name!",
            "import_limit": 50
        })));
        assert_eq!(settings.import_limit, Some(50));
        assert_eq!(settings.username, None);
    }

    #[test]
    fn test_valid_payload() {
        let settings = sanitizer().sanitize(&payload(json!({
            "username": "  film-fan ",
            "start_date": "2024-01-31",
            "draft_status": "0",
            "import_limit": "25",
            "email": "someone@example.com",
            "url": "letterboxd.com/film-fan",
            "settings": {"columns": " 4 ", "title": "<b>My</b> films", "show": true}
        })));

        assert_eq!(settings.username.as_deref(), Some("film-fan"));
        assert_eq!(settings.start_date.as_deref(), Some("2024-01-31"));
        assert!(settings.draft_status);
        assert_eq!(settings.import_limit, Some(25));
        assert_eq!(settings.email.as_deref(), Some("someone@example.com"));
        assert_eq!(settings.url.as_deref(), Some("http://letterboxd.com/film-fan"));

        let nested = settings.settings.unwrap();
        assert_eq!(nested.get("columns").map(String::as_str), Some("4"));
        assert_eq!(nested.get("title").map(String::as_str), Some("My films"));
        assert_eq!(nested.get("show").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_draft_status_ignores_value() {
        for value in [json!(false), json!(""), json!(null), json!("off")] {
            let settings = sanitizer().sanitize(&payload(json!({ "draft_status": value })));
            assert!(settings.draft_status);
        }
    }

    #[test]
    fn test_empty_start_date_is_kept() {
        let settings = sanitizer().sanitize(&payload(json!({ "start_date": "" })));
        assert_eq!(settings.start_date.as_deref(), Some(""));
    }

    #[test]
    fn test_report_lists_rejections() {
        let report = sanitizer().sanitize_with_report(&payload(json!({
            "username": "AB",
            "start_date": "2024-06-16",
            "import_limit": 101,
            "email": "not-an-email",
            "url": "javascript:alert(1)",
            "settings": "flat"
        })));

        let kinds: Vec<(&str, ErrorKind)> =
            report.rejected.iter().map(|r| (r.field, r.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("username", ErrorKind::InvalidUsernameCase),
                ("start_date", ErrorKind::FutureDate),
                ("import_limit", ErrorKind::InvalidImportLimit),
                ("email", ErrorKind::InvalidEmail),
                ("url", ErrorKind::InvalidUrl),
                ("settings", ErrorKind::InvalidPayload),
            ]
        );
        assert_eq!(report.settings, SanitizedSettings::default());
    }

    #[test]
    fn test_unknown_keys_are_dropped() {
        let settings = sanitizer().sanitize(&payload(json!({
            "username": "dave",
            "is_admin": true,
            "<script>": "x"
        })));
        let encoded = serde_json::to_value(&settings).unwrap();
        let mut keys: Vec<&String> = encoded.as_object().unwrap().keys().collect();
        keys.sort();
        assert_eq!(keys, vec!["draft_status", "username"]);
    }

    #[test]
    fn test_nested_settings_skip_structured_values() {
        let settings = sanitizer().sanitize(&payload(json!({
            "settings": {"a": [1, 2], "b": {"c": "d"}, "e": null, "f": 3}
        })));
        let nested = settings.settings.unwrap();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested.get("f").map(String::as_str), Some("3"));
    }
}
