use serde::{Deserialize, Serialize};

/// 设置页和 AJAX 所需的令牌
#[derive(Debug, Serialize, Deserialize)]
pub struct NonceResponse {
    pub nonce_field: String,
    pub settings_nonce: String,
    pub ajax_nonce_field: String,
    pub ajax_nonce: String,
}
