//! Question providers.
//!
//! [`QuestionSource`] is the seam between the quiz state machine and the
//! network. [`OpenTdbSource`] talks to Open Trivia DB; tests plug in their own.

mod opentdb;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::Question;

pub use opentdb::{OpenTdbSource, parse_batch, parse_token};

/// Status code reported by the provider in every response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseCode(pub u8);

impl ResponseCode {
    pub const SUCCESS: Self = Self(0);
    pub const NO_RESULTS: Self = Self(1);
    pub const INVALID_PARAMETER: Self = Self(2);
    pub const TOKEN_NOT_FOUND: Self = Self(3);
    pub const TOKEN_EMPTY: Self = Self(4);
    pub const RATE_LIMIT: Self = Self(5);

    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    fn describe(self) -> &'static str {
        match self.0 {
            0 => "success",
            1 => "not enough questions available",
            2 => "invalid parameter",
            3 => "session token not found",
            4 => "session token has returned every available question",
            5 => "rate limit exceeded",
            _ => "unknown response code",
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.describe())
    }
}

/// Failure to obtain a de-duplication token. Never fatal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token request failed: {0}")]
    Network(String),
    #[error("provider refused token: {0}")]
    Provider(ResponseCode),
    #[error("malformed token response: {0}")]
    Malformed(String),
    #[error("token request timed out after {0:?}")]
    Timeout(Duration),
}

/// Failure of a single batch fetch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("network failure: {0}")]
    Network(String),
    #[error("provider reported {0}")]
    Provider(ResponseCode),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("provider returned no questions")]
    Empty,
}

/// A remote provider of multiple-choice questions.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Ask the provider for a fresh de-duplication token.
    async fn request_token(&self) -> Result<String, TokenError>;

    /// Fetch one batch, scoped to `token` when present.
    async fn fetch_batch(&self, token: Option<&str>) -> Result<Vec<Question>, FetchError>;
}

/// Return `held` unchanged, or request a new token from `source`.
///
/// Failures are logged and yield `None`; the quiz then runs without
/// de-duplication.
pub async fn acquire_token(
    source: &dyn QuestionSource,
    held: Option<String>,
    timeout: Duration,
) -> Option<String> {
    if held.is_some() {
        return held;
    }

    let result = match tokio::time::timeout(timeout, source.request_token()).await {
        Ok(result) => result,
        Err(_) => Err(TokenError::Timeout(timeout)),
    };

    match result {
        Ok(token) => {
            debug!("acquired session token");
            Some(token)
        }
        Err(e) => {
            warn!("Could not get session token, duplicates may occur: {}", e);
            None
        }
    }
}
