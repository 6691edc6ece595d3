//! Core library for Sigfox module CLI operations
//!
//! This crate provides the business logic for talking to Sigfox modules over a
//! serial line: AT library loading, persisted settings, serial transactions,
//! device discovery and the per-device session that ties them together.

pub mod config;
pub mod device;
pub mod library;
pub mod message;
pub mod ports;
pub mod transaction;

// Re-export commonly used types
pub use config::{ConfigError, ConfigStore, JsonConfigStore, Settings};
pub use device::{DeviceSession, Timeouts};
pub use library::{AtLibrary, CommandKey, LibraryCatalog, LibraryError};
pub use message::{Payload, PayloadError};
pub use ports::{PortScanner, ScanError, SystemPortScanner};
pub use transaction::{Response, SerialError, SerialExecutor, Transact};
