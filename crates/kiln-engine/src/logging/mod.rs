//! Logging setup.
//!
//! The engine logs through the `log` facade only; `init_logging` installs
//! `env_logger` for binaries that do not bring their own logger.

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};
