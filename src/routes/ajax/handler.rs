use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Extension, Query, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    guard::{RequestContext, Session},
    routes::read_payload,
    utils::success_to_api_response,
};

/// AJAX 预览：返回清理后的设置以及被丢弃的字段
///
/// 与表单提交共用限流和权限检查；校验失败时立即返回错误响应，不再继续处理。
pub async fn preview(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<HashMap<String, String>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let ctx = RequestContext::from_headers(method, &headers, session);
    if let Err(e) = state.guard.check_access(&ctx).await {
        return e.into_response();
    }

    let payload = match read_payload(&headers, &body, query) {
        Ok(payload) => payload,
        Err(e) => return e.into_response(),
    };
    let ctx = ctx.with_payload(&payload);

    if let Err(e) = state.guard.verify_ajax_request(&ctx) {
        return e.into_response();
    }

    let report = state.sanitizer.sanitize_with_report(&payload);
    (StatusCode::OK, success_to_api_response(report)).into_response()
}
