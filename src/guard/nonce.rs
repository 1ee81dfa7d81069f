//! 一次性表单令牌
//!
//! 令牌与动作名、用户绑定，按半个有效期划分时间片，当前和上一个时间片内签发的令牌都有效。

use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::infrastructure::clock::Clock;

use super::context::Session;

const TOKEN_LEN: usize = 12;

pub trait NonceVerifier: Send + Sync {
    fn create(&self, action: &str, session: &Session) -> String;
    fn verify(&self, token: &str, action: &str, session: &Session) -> bool;
}

/// 基于 SHA-256 的令牌实现
pub struct HashNonces {
    secret: String,
    lifetime: Duration,
    clock: Arc<dyn Clock>,
}

impl HashNonces {
    pub fn new(secret: impl Into<String>, lifetime: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: secret.into(),
            lifetime,
            clock,
        }
    }

    fn tick(&self) -> i64 {
        let half = (self.lifetime.as_secs() / 2).max(1) as i64;
        let now = self.clock.now().timestamp();
        (now + half - 1).div_euclid(half)
    }

    fn token_for(&self, tick: i64, action: &str, session: &Session) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!(
            "{}|{}|{}|{}",
            self.secret,
            tick,
            action,
            session.user_id()
        ));
        let digest = format!("{:x}", hasher.finalize());
        digest[..TOKEN_LEN].to_string()
    }
}

impl NonceVerifier for HashNonces {
    fn create(&self, action: &str, session: &Session) -> String {
        self.token_for(self.tick(), action, session)
    }

    fn verify(&self, token: &str, action: &str, session: &Session) -> bool {
        if token.is_empty() {
            return false;
        }
        let tick = self.tick();
        [tick, tick - 1]
            .iter()
            .any(|t| constant_time_eq(token, &self.token_for(*t, action, session)))
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
