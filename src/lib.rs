// src/lib.rs
//! Client for the Trezor hardware-wallet wire protocol.
//!
//! Frames protocol messages over 64-byte USB reports, drives the
//! PIN / passphrase / button handshake and derives addresses and extended
//! public keys for Bitcoin-like and Ethereum-like coins.

pub mod core;
pub mod hardware;

pub use crate::core::config::DeviceConfig;
pub use crate::core::errors::{FailureKind, TrezorError, TrezorResult};
pub use crate::hardware::trezor::{
    CoinApp, ConsoleEntry, DerivationPath, EntryKind, PinEntry, Transport, TrezorDevice,
};
