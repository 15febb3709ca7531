//! Error types for the Trezor client.
//!
//! Every failure is returned to the caller of the operation that triggered
//! it. The only local recovery lives in the exchange engine (button
//! confirmation) and the unlock state machine (re-issuing the request).

use crate::hardware::trezor::messages::describe_tag;
use crate::hardware::trezor::pin_entry::EntryKind;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type TrezorResult<T> = std::result::Result<T, TrezorError>;

/// Trezor client error.
#[derive(Debug, Error)]
pub enum TrezorError {
    /// No device with the expected USB identifiers is attached.
    #[error("no Trezor device found (vendor {vendor:#06x}, product {product:#06x})")]
    NoDevice { vendor: u16, product: u16 },

    /// More than one matching device is attached.
    #[error("too many Trezor devices connected: {0}")]
    TooManyDevices(usize),

    /// USB read/write failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Bad report id, bad magic or a truncated report stream.
    #[error("framing error: {0}")]
    Framing(String),

    #[error("failed to marshal {message}: {source}")]
    Marshal {
        message: &'static str,
        #[source]
        source: protobuf::Error,
    },

    #[error("failed to unmarshal {message}: {source}")]
    Unmarshal {
        message: &'static str,
        #[source]
        source: protobuf::Error,
    },

    /// The device answered with a message type the caller did not ask for.
    #[error("expected reply types {expected:?}, got {}", describe_tag(*.received))]
    UnexpectedReply { expected: Vec<String>, received: u16 },

    /// The device reported a `Failure` message.
    #[error("device failure: {0}")]
    Failure(FailureKind),

    /// The human supplied an empty PIN or passphrase.
    #[error("{0} entry abandoned")]
    SecretAbandoned(EntryKind),

    /// The derivation path does not start with `m/`.
    #[error("invalid derivation path '{0}': must start with \"m/\"")]
    InvalidPath(String),

    /// A derivation path segment is not a valid (hardened) 32-bit index.
    #[error("malformed derivation path segment '{segment}' in '{path}'")]
    MalformedSegment { path: String, segment: String },

    /// The coin ticker is not in the coin table.
    #[error("unknown coin ticker '{0}'")]
    UnknownCoin(String),

    /// The coin exists but belongs to another coin family.
    #[error("coin '{ticker}' is not supported by the {app} app")]
    UnsupportedCoin { ticker: String, app: &'static str },

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// Protocol state violation (unexpected signal, too many unlock rounds).
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Sub-kind of a device-reported failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureKind {
    #[error("PIN cancelled")]
    PinCancelled,
    #[error("PIN invalid")]
    PinInvalid,
    #[error("{0}")]
    Other(String),
}

impl TrezorError {
    /// Errors worth retrying after reconnecting the device.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TrezorError::Transport(_))
    }

    /// Errors caused by the human declining to continue.
    pub fn is_user_abort(&self) -> bool {
        matches!(
            self,
            TrezorError::SecretAbandoned(_) | TrezorError::Failure(FailureKind::PinCancelled)
        )
    }

    /// The device rejected the PIN that was entered.
    pub fn is_pin_rejected(&self) -> bool {
        matches!(
            self,
            TrezorError::Failure(FailureKind::PinInvalid | FailureKind::PinCancelled)
        )
    }
}

#[cfg(feature = "usb")]
impl From<rusb::Error> for TrezorError {
    fn from(err: rusb::Error) -> Self {
        TrezorError::Transport(err.to_string())
    }
}

impl From<toml::de::Error> for TrezorError {
    fn from(err: toml::de::Error) -> Self {
        TrezorError::Config(err.to_string())
    }
}
