use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use crate::{AppState, guard::Session, utils::verify_session_token};

/// 解析 Bearer 会话令牌并写入请求扩展；缺失或无效时视为匿名
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let session = match request.headers().typed_get::<Authorization<Bearer>>() {
        Some(Authorization(bearer)) => match verify_session_token(bearer.token(), &state.config) {
            Ok(claims) => Session(Some(claims)),
            Err(e) => {
                tracing::debug!("Ignoring invalid session token: {}", e);
                Session::anonymous()
            }
        },
        None => Session::anonymous(),
    };

    request.extensions_mut().insert(session);
    next.run(request).await
}
