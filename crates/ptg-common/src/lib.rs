//! PTG Common Library
//!
//! Shared plumbing for the PTG workspace members.
//!
//! - **Logging**: `tracing` subscriber setup driven by [`logging::LogConfig`]
//! - **Environment**: `PTG_*` variable lookup and boolean parsing
//! - **Errors**: [`CommonError`] for invalid shared configuration values
//!
//! # Example
//!
//! ```no_run
//! use ptg_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> ptg_common::Result<()> {
//!     let _guard = init_logging(&LogConfig::from_env()?)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod env;
pub mod error;
pub mod logging;

pub use error::{CommonError, Result};
