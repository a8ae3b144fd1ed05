//! # Router Config
//!
//! Configuration for the model router gateway: the model catalog and the two
//! routing tables, loaded from a TOML file.
//!
//! The provider re-reads the file on every [`ConfigProvider::load`] call, so
//! edits take effect on the next request without a restart. Validation of the
//! referential invariant (every routing-table value names a configured model)
//! is fatal at startup and only at startup.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod provider;
pub mod schema;

pub use provider::{ConfigError, ConfigProvider};
pub use schema::{ModelConfig, RouterConfig};
