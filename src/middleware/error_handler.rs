use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::{error, warn};
use uuid::Uuid;

/// 为每个请求分配ID，并记录被拒绝或失败的响应
pub async fn log_requests(req: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let mut response = next.run(req).await;
    let status = response.status();

    if status.is_server_error() {
        error!(
            request_id = %request_id,
            "Server error occurred - {} {} -> {}",
            method, uri, status
        );
    } else if status.is_client_error() {
        warn!(
            request_id = %request_id,
            "Request rejected - {} {} -> {}",
            method, uri, status
        );
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}
