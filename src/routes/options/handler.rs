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

use super::model::NonceResponse;

/// 设置表单的令牌字段名
pub const SETTINGS_NONCE_FIELD: &str = "_wpnonce";
/// 设置表单的令牌动作名
pub const SETTINGS_ACTION: &str = "letterboxd_save_settings";

/// 管理后台提交设置；任何请求方法都会进入守卫，由守卫决定是否放行
///
/// 限流和权限在解析请求体之前检查，其余检查在解析之后。
pub async fn save_options(
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

    if let Err(e) = state
        .guard
        .verify_submission(&ctx, SETTINGS_NONCE_FIELD, SETTINGS_ACTION)
    {
        return e.into_response();
    }

    let settings = state.sanitizer.sanitize(&payload);
    tracing::info!(user = ctx.session.user_id(), "Settings sanitized for saving");

    (StatusCode::OK, success_to_api_response(settings)).into_response()
}

/// 为当前会话签发表单令牌和 AJAX 令牌
pub async fn issue_nonces(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> impl IntoResponse {
    let ctx = RequestContext::new(Method::GET, session);
    let guard_config = state.guard.config();

    (
        StatusCode::OK,
        success_to_api_response(NonceResponse {
            nonce_field: SETTINGS_NONCE_FIELD.to_string(),
            settings_nonce: state.guard.create_nonce(SETTINGS_ACTION, &ctx),
            ajax_nonce_field: guard_config.ajax_nonce_field.clone(),
            ajax_nonce: state.guard.create_nonce(&guard_config.ajax_action, &ctx),
        }),
    )
}
