//! Core data types, sensor catalog, and reading pipeline for Ecowitt gateways
//!
//! This crate turns one `get_livedata_info` payload into typed readings and
//! resolves them against the user's sensor assignment. Everything here is
//! synchronous and free of I/O; fetching lives in `ecowitt-ingest`.

pub mod assignment;
pub mod catalog;
pub mod display;
pub mod extract;
pub mod normalize;
pub mod payload;
pub mod pipeline;
pub mod resolve;
pub mod types;
pub mod units;

pub use assignment::*;
pub use catalog::*;
pub use extract::*;
pub use normalize::*;
pub use payload::*;
pub use pipeline::*;
pub use resolve::*;
pub use types::*;
pub use units::*;
