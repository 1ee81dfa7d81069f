use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{any, get, post},
};

use crate::{
    AppState,
    middleware::{log_requests, session_middleware},
    routes,
};

// 创建主路由
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/options", any(routes::options::save_options))
        .route("/nonces", get(routes::options::issue_nonces))
        .route("/ajax/preview", post(routes::ajax::preview))
        .layer(from_fn_with_state(state.clone(), session_middleware))
        .layer(from_fn(log_requests))
        .with_state(state)
}
