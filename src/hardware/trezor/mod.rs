//! Trezor 硬件wallet集成
//!
//! 此模块实现与 Trezor 硬件wallet的通信，支持：
//! - USB 报告帧编解码与请求/应答交换
//! - PIN / passphrase 解锁
//! - Bitcoin App 与 Ethereum App

pub mod bitcoin_app;
pub mod coins;
pub mod device;
pub mod ethereum_app;
pub mod exchange;
pub mod framing;
pub mod messages;
pub mod mock;
pub mod path;
pub mod pin_entry;
pub mod transport;
pub mod unlock;

pub use device::{CoinApp, TrezorDevice};
pub use exchange::{Reply, ReplyKind, Signal};
pub use path::DerivationPath;
pub use pin_entry::{ConsoleEntry, EntryKind, PinEntry};
pub use transport::Transport;

#[cfg(feature = "usb")]
pub use transport::UsbTransport;
