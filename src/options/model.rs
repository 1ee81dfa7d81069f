use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ErrorKind;

/// 未经信任的原始设置（表单或 AJAX 请求体）
pub type RawSettingsPayload = Map<String, Value>;

/// 清理后的设置，只包含通过校验的已知字段
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizedSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    pub draft_status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<BTreeMap<String, String>>,
}

/// 被丢弃的字段及原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldRejection {
    pub field: &'static str,
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SanitizationReport {
    pub settings: SanitizedSettings,
    pub rejected: Vec<FieldRejection>,
}
