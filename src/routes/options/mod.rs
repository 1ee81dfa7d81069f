mod handler;
mod model;

pub use handler::{SETTINGS_ACTION, SETTINGS_NONCE_FIELD, issue_nonces, save_options};
pub use model::NonceResponse;
