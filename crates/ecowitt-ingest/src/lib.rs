//! Gateway telemetry sources and the refresh engine
//!
//! A [`TelemetrySource`] produces one raw `get_livedata_info` payload per call.
//! [`RefreshEngine`] turns that payload into a [`ecowitt_core::SensorSnapshot`]
//! for the current assignment.

pub mod fixture;
pub mod gateway;
pub mod refresh;

pub use fixture::*;
pub use gateway::*;
pub use refresh::*;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Invalid gateway address: {0}")]
    InvalidAddress(String),

    #[error("Timed out waiting for gateway")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Gateway returned HTTP {0}")]
    Status(u16),

    #[error("Payload is not valid JSON: {0}")]
    Decode(String),

    #[error("No more fixture payloads")]
    Exhausted,
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Anything that can hand out live-data payloads
#[async_trait::async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Source name/identifier
    fn name(&self) -> &str;

    /// Fetch one payload. Each call is independent of the previous one.
    async fn fetch(&mut self) -> FetchResult<Value>;
}
