pub mod config;
pub mod errors;

pub use config::DeviceConfig;
pub use errors::{FailureKind, TrezorError, TrezorResult};
