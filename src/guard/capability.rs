use super::context::Session;

/// 权限检查
pub trait CapabilityChecker: Send + Sync {
    fn has_capability(&self, session: &Session, capability: &str) -> bool;
}

/// 读取会话令牌中携带的权限列表
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionCapabilities;

impl CapabilityChecker for SessionCapabilities {
    fn has_capability(&self, session: &Session, capability: &str) -> bool {
        session.claims().is_some_and(|c| c.can(capability))
    }
}
