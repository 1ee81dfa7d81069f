// 请求守卫：限流、权限、请求方法、令牌校验

pub mod capability;
pub mod context;
pub mod nonce;
pub mod request_guard;

pub use capability::{CapabilityChecker, SessionCapabilities};
pub use context::{RequestContext, Session};
pub use nonce::{HashNonces, NonceVerifier};
pub use request_guard::RequestGuard;
