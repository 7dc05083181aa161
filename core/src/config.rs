//! Client configuration.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FRESHSERVICE_BASE_URL` | (required) | e.g. `https://acme.freshservice.com` |
//! | `FRESHSERVICE_API_KEY` | unset | API key sent as HTTP basic auth |
//! | `FRESHSERVICE_BATCH_LIMIT` | 512 | Max length of one search query |

use crate::error::ApiError;
use crate::query::{QueryBatcher, DEFAULT_BATCH_LIMIT};

pub const ENV_BASE_URL: &str = "FRESHSERVICE_BASE_URL";
pub const ENV_API_KEY: &str = "FRESHSERVICE_API_KEY";
pub const ENV_BATCH_LIMIT: &str = "FRESHSERVICE_BATCH_LIMIT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub batch_limit: usize,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            batch_limit: DEFAULT_BATCH_LIMIT,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_batch_limit(mut self, batch_limit: usize) -> Self {
        self.batch_limit = batch_limit;
        self
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup. Empty values are
    /// treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = get(ENV_BASE_URL)
            .ok_or_else(|| ApiError::Config(format!("{ENV_BASE_URL} is not set")))?;

        let batch_limit = match get(ENV_BATCH_LIMIT) {
            None => DEFAULT_BATCH_LIMIT,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ApiError::Config(format!(
                        "{ENV_BATCH_LIMIT} must be a positive integer, got {raw:?}"
                    )))
                }
            },
        };

        Ok(Self {
            base_url,
            api_key: get(ENV_API_KEY),
            batch_limit,
        })
    }

    pub fn batcher(&self) -> QueryBatcher {
        QueryBatcher::new(self.batch_limit)
    }
}
