use std::sync::Arc;
use std::time::Duration;

use axum::http::Method;

use crate::cache::{CachedRateLimit, CounterStore, StoreError};
use crate::config::GuardConfig;
use crate::error::{ErrorKind, ValidationResult};
use crate::infrastructure::clock::Clock;

use super::capability::CapabilityChecker;
use super::context::RequestContext;
use super::nonce::NonceVerifier;

/// 特权请求守卫
///
/// 检查顺序固定：限流、权限、请求方法、令牌与来源页。后面的检查假定前面的已经通过，
/// 无权限的调用者不会走到令牌校验，因此无法借此探测令牌是否有效。
pub struct RequestGuard<S> {
    config: GuardConfig,
    store: S,
    clock: Arc<dyn Clock>,
    capabilities: Arc<dyn CapabilityChecker>,
    nonces: Arc<dyn NonceVerifier>,
}

impl<S: CounterStore> RequestGuard<S> {
    pub fn new(
        config: GuardConfig,
        store: S,
        clock: Arc<dyn Clock>,
        capabilities: Arc<dyn CapabilityChecker>,
        nonces: Arc<dyn NonceVerifier>,
    ) -> Self {
        Self {
            config,
            store,
            clock,
            capabilities,
            nonces,
        }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub async fn verify_request(
        &self,
        ctx: &RequestContext,
        nonce_field: &str,
        action: &str,
    ) -> ValidationResult {
        self.check_access(ctx).await?;
        self.verify_submission(ctx, nonce_field, action)
    }

    /// 前两步检查：限流、权限
    ///
    /// 只依赖会话，不需要请求体，处理器在解析请求体之前调用。
    pub async fn check_access(&self, ctx: &RequestContext) -> ValidationResult {
        if self.config.debug_mode {
            tracing::debug!("Debug mode active, skipping rate limit check");
        } else {
            match self.is_rate_limited().await {
                Ok(false) => {}
                Ok(true) => return reject(ErrorKind::RateLimitExceeded, ctx),
                Err(e) => {
                    tracing::error!("Rate limit store unavailable: {}", e);
                    return Err(ErrorKind::Internal.into());
                }
            }
        }

        if !self
            .capabilities
            .has_capability(&ctx.session, &self.config.required_capability)
        {
            return reject(ErrorKind::InsufficientPermissions, ctx);
        }

        Ok(())
    }

    /// 后两步检查：请求方法、令牌与来源页
    pub fn verify_submission(
        &self,
        ctx: &RequestContext,
        nonce_field: &str,
        action: &str,
    ) -> ValidationResult {
        if !matches!(ctx.method, Method::GET | Method::POST) {
            return reject(ErrorKind::InvalidRequestMethod, ctx);
        }

        let nonce_ok = ctx
            .param(nonce_field)
            .is_some_and(|token| self.nonces.verify(token, action, &ctx.session));
        let referer_ok = ctx
            .referer
            .as_deref()
            .is_some_and(|r| r.starts_with(&self.config.admin_url));
        if !nonce_ok || !referer_ok {
            return reject(ErrorKind::InvalidNonce, ctx);
        }

        Ok(())
    }

    /// 异步请求的令牌与通道校验：专用令牌 + 必须经由异步通道
    ///
    /// 不包含限流和权限检查，处理器需先调用 [`check_access`](Self::check_access)。
    pub fn verify_ajax_request(&self, ctx: &RequestContext) -> ValidationResult {
        let nonce_ok = ctx
            .param(&self.config.ajax_nonce_field)
            .is_some_and(|token| {
                self.nonces
                    .verify(token, &self.config.ajax_action, &ctx.session)
            });
        if !nonce_ok {
            return reject(ErrorKind::InvalidNonce, ctx);
        }

        if !ctx.is_ajax {
            return reject(ErrorKind::InvalidRequestMethod, ctx);
        }

        Ok(())
    }

    /// 读取当前窗口的计数，未超限时计数加一
    ///
    /// 每次调用都会写入计数器，同一窗口内调用两次会计两次。
    pub async fn is_rate_limited(&self) -> Result<bool, StoreError> {
        let key = self.config.rate_limit_key.as_str();
        let window = self.config.rate_limit_window;
        let now = self.clock.now().timestamp();

        match self.store.get(key).await? {
            // 上限为 0 时一律限流，不写入计数
            None if self.config.rate_limit_requests == 0 => Ok(true),
            None => {
                let reset_at = now + window.as_secs() as i64;
                self.store
                    .set(key, &CachedRateLimit::first(key, reset_at), window)
                    .await?;
                Ok(false)
            }
            Some(current) if current.count >= self.config.rate_limit_requests => Ok(true),
            Some(current) => {
                // 保持窗口结束时间不变
                let remaining = (current.reset_at - now).max(1) as u64;
                self.store
                    .set(key, &current.incremented(), Duration::from_secs(remaining))
                    .await?;
                Ok(false)
            }
        }
    }

    /// 为当前会话签发令牌
    pub fn create_nonce(&self, action: &str, ctx: &RequestContext) -> String {
        self.nonces.create(action, &ctx.session)
    }
}

fn reject(kind: ErrorKind, ctx: &RequestContext) -> ValidationResult {
    tracing::warn!(
        kind = ?kind,
        user = ctx.session.user_id(),
        method = %ctx.method,
        "Request rejected by guard"
    );
    Err(kind.into())
}
