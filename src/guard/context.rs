use std::collections::HashMap;

use axum::http::{HeaderMap, Method, header};
use serde_json::Value;

use crate::options::RawSettingsPayload;
use crate::utils::Claims;

/// 当前请求的登录状态，未登录或令牌无效时为匿名
#[derive(Debug, Clone, Default)]
pub struct Session(pub Option<Claims>);

impl Session {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn claims(&self) -> Option<&Claims> {
        self.0.as_ref()
    }

    /// 匿名用户的 ID 为 "0"
    pub fn user_id(&self) -> &str {
        self.0.as_ref().map(|c| c.sub.as_str()).unwrap_or("0")
    }
}

/// 守卫判断所需的请求信息
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub referer: Option<String>,
    /// 是否经由异步通道（XMLHttpRequest）发起
    pub is_ajax: bool,
    pub session: Session,
    pub params: HashMap<String, String>,
}

impl RequestContext {
    pub fn new(method: Method, session: Session) -> Self {
        Self {
            method,
            referer: None,
            is_ajax: false,
            session,
            params: HashMap::new(),
        }
    }

    /// 只从请求头中提取上下文，请求体解析之前即可用于限流和权限检查
    pub fn from_headers(method: Method, headers: &HeaderMap, session: Session) -> Self {
        let referer = headers
            .get(header::REFERER)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);

        let is_ajax = headers
            .get("x-requested-with")
            .and_then(|h| h.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"));

        Self {
            method,
            referer,
            is_ajax,
            session,
            params: HashMap::new(),
        }
    }

    /// 从请求头和请求体中提取上下文，请求体只取顶层字符串字段
    pub fn from_request(
        method: Method,
        headers: &HeaderMap,
        session: Session,
        payload: &RawSettingsPayload,
    ) -> Self {
        Self::from_headers(method, headers, session).with_payload(payload)
    }

    pub fn with_payload(mut self, payload: &RawSettingsPayload) -> Self {
        self.params.extend(payload.iter().filter_map(|(k, v)| match v {
            Value::String(s) => Some((k.clone(), s.clone())),
            _ => None,
        }));
        self
    }

    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    pub fn with_ajax(mut self) -> Self {
        self.is_ajax = true;
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    #[test]
    fn test_from_request_reads_headers_and_string_params() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::REFERER,
            HeaderValue::from_static("http://localhost:3000/wp-admin/options.php"),
        );
        headers.insert("x-requested-with", HeaderValue::from_static("xmlhttprequest"));

        let payload = json!({"_wpnonce": "abc", "import_limit": 5});
        let ctx = RequestContext::from_request(
            Method::POST,
            &headers,
            Session::anonymous(),
            payload.as_object().unwrap(),
        );

        assert_eq!(
            ctx.referer.as_deref(),
            Some("http://localhost:3000/wp-admin/options.php")
        );
        assert!(ctx.is_ajax);
        assert_eq!(ctx.param("_wpnonce"), Some("abc"));
        assert_eq!(ctx.param("import_limit"), None);
        assert_eq!(ctx.session.user_id(), "0");
    }
}
