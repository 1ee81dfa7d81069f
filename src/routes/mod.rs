use std::collections::HashMap;

use axum::body::Bytes;
use axum::http::{HeaderMap, header};
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::error::{ErrorKind, ValidationError};
use crate::options::RawSettingsPayload;

pub mod ajax;
pub mod options;

/// 解析请求体；空请求体视为空对象，查询参数只补充请求体中没有的字段
///
/// 表单提交（`application/x-www-form-urlencoded`）按表单解析，其余按 JSON 对象解析。
pub(crate) fn read_payload(
    headers: &HeaderMap,
    body: &Bytes,
    query: HashMap<String, String>,
) -> Result<RawSettingsPayload, ValidationError> {
    let mut payload = if body.iter().all(u8::is_ascii_whitespace) {
        RawSettingsPayload::new()
    } else if is_form(headers) {
        read_form(body)
    } else {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => map,
            _ => return Err(ErrorKind::InvalidPayload.into()),
        }
    };

    for (key, value) in query {
        payload.entry(key).or_insert(Value::String(value));
    }
    Ok(payload)
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok())
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|ct| {
            ct.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}

/// 表单字段：`key[]` 收集为数组，`key[sub]` 收集为对象，同名普通字段后者覆盖前者
fn read_form(body: &[u8]) -> RawSettingsPayload {
    let mut payload = RawSettingsPayload::new();

    for (name, value) in form_urlencoded::parse(body) {
        let value = Value::String(value.into_owned());

        match split_bracket(&name) {
            Some((key, "")) => {
                let entry = payload
                    .entry(key.to_string())
                    .or_insert_with(|| Value::Array(Vec::new()));
                match entry {
                    Value::Array(items) => items.push(value),
                    other => *other = Value::Array(vec![value]),
                }
            }
            Some((key, sub)) => {
                let entry = payload
                    .entry(key.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                match entry {
                    Value::Object(map) => {
                        map.insert(sub.to_string(), value);
                    }
                    other => *other = Value::Object(Map::from_iter([(sub.to_string(), value)])),
                }
            }
            None => {
                payload.insert(name.to_string(), value);
            }
        }
    }

    payload
}

/// `settings[theme]` → `("settings", "theme")`，`tags[]` → `("tags", "")`
fn split_bracket(name: &str) -> Option<(&str, &str)> {
    let (key, rest) = name.split_once('[')?;
    let sub = rest.strip_suffix(']')?;
    if key.is_empty() || sub.contains(['[', ']']) {
        return None;
    }
    Some((key, sub))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn form_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded; charset=UTF-8"),
        );
        headers
    }

    #[test]
    fn test_read_payload() {
        let headers = HeaderMap::new();
        let empty = read_payload(&headers, &Bytes::from_static(b"  "), HashMap::new()).unwrap();
        assert!(empty.is_empty());

        let query = HashMap::from([
            ("_wpnonce".to_string(), "abc".to_string()),
            ("username".to_string(), "ignored".to_string()),
        ]);
        let merged =
            read_payload(&headers, &Bytes::from_static(br#"{"username":"dave"}"#), query).unwrap();
        assert_eq!(merged["username"], "dave");
        assert_eq!(merged["_wpnonce"], "abc");

        let err = read_payload(&headers, &Bytes::from_static(b"[1,2]"), HashMap::new()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPayload);
        let err = read_payload(&headers, &Bytes::from_static(b"{oops"), HashMap::new()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidPayload);
    }

    #[test]
    fn test_read_form_payload() {
        let body = Bytes::from_static(
            b"_wpnonce=abc&username=dave&draft_status=on&import_limit=20\
              &tags[]=a&tags[]=b&settings[theme]=dark+mode&username=erin",
        );
        let payload = read_payload(&form_headers(), &body, HashMap::new()).unwrap();

        assert_eq!(payload["_wpnonce"], "abc");
        assert_eq!(payload["username"], "erin");
        assert_eq!(payload["draft_status"], "on");
        assert_eq!(payload["import_limit"], "20");
        assert_eq!(payload["tags"], serde_json::json!(["a", "b"]));
        assert_eq!(payload["settings"]["theme"], "dark mode");
    }

    #[test]
    fn test_split_bracket() {
        assert_eq!(split_bracket("tags[]"), Some(("tags", "")));
        assert_eq!(split_bracket("settings[theme]"), Some(("settings", "theme")));
        assert_eq!(split_bracket("plain"), None);
        assert_eq!(split_bracket("[x]"), None);
        assert_eq!(split_bracket("a[b][c]"), None);
    }
}
