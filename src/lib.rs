use std::sync::Arc;

use cache::CounterBackend;
use config::Config;
use guard::{HashNonces, RequestGuard, SessionCapabilities};
use infrastructure::clock::Clock;
use options::OptionsSanitizer;
use validation::FieldValidator;

pub mod cache;
pub mod config;
pub mod error;
pub mod guard;
pub mod infrastructure;
pub mod middleware;
pub mod options;
pub mod result;
pub mod router;
pub mod routes;
pub mod utils;
pub mod validation;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub guard: Arc<RequestGuard<CounterBackend>>,
    pub sanitizer: Arc<OptionsSanitizer>,
}

impl AppState {
    pub fn new(config: Config, store: CounterBackend, clock: Arc<dyn Clock>) -> Self {
        let nonces = HashNonces::new(
            config.auth_secret.clone(),
            std::time::Duration::from_secs(config.nonce_lifetime_secs),
            clock.clone(),
        );
        let guard = RequestGuard::new(
            config.guard_config(),
            store,
            clock.clone(),
            Arc::new(SessionCapabilities),
            Arc::new(nonces),
        );
        let sanitizer = OptionsSanitizer::new(FieldValidator::new(config.validation_limits()), clock);

        Self {
            config,
            guard: Arc::new(guard),
            sanitizer: Arc::new(sanitizer),
        }
    }
}
