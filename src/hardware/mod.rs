//! 硬件wallet集成模块
//!
//! 此模块提供与 Trezor 硬件wallet的集成

pub mod trezor;

pub use trezor::TrezorDevice;
