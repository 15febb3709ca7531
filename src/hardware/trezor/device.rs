//! Trezor 设备管理
//!
//! 一个 `TrezorDevice` 独占一个传输通道，所有操作都经过解锁状态机。
//! `close` 消耗设备本身，关闭后无法再发起任何操作。

use super::bitcoin_app::TrezorBitcoinApp;
use super::coins::{self, CoinFamily};
use super::ethereum_app::TrezorEthereumApp;
use super::exchange::{exchange, Exchanged, Reply, ReplyKind};
use super::messages::{Features, Initialize, Ping, TrezorMessage};
use super::path::DerivationPath;
use super::pin_entry::PinEntry;
use super::transport::Transport;
use super::unlock::Unlocker;
use crate::core::errors::{TrezorError, TrezorResult};
use tracing::{debug, info, warn};

#[cfg(feature = "usb")]
use super::transport::UsbTransport;
#[cfg(feature = "usb")]
use crate::core::config::DeviceConfig;

/// 最低安全固件版本
const MIN_SAFE_FIRMWARE_MAJOR: u32 = 1;
const MIN_SAFE_FIRMWARE_MINOR: u32 = 10;

/// 按币种族提供的派生操作
pub trait CoinApp {
    /// 派生路径对应的address
    fn get_address(&mut self, path: &DerivationPath, coin: &str, mode: &str)
        -> TrezorResult<String>;

    /// 派生路径对应的扩展公钥
    fn get_xpub(&mut self, path: &DerivationPath, coin: &str, mode: &str) -> TrezorResult<String>;
}

/// Trezor 设备会话
pub struct TrezorDevice<T: Transport, E: PinEntry> {
    transport: T,
    entry: E,
    features: Features,
}

#[cfg(feature = "usb")]
impl<E: PinEntry> TrezorDevice<UsbTransport, E> {
    /// 连接到唯一的 Trezor 设备
    pub fn open(entry: E) -> TrezorResult<Self> {
        Self::open_with_config(&DeviceConfig::default(), entry)
    }

    pub fn open_with_config(config: &DeviceConfig, entry: E) -> TrezorResult<Self> {
        info!("连接 Trezor 硬件wallet...");
        let mut transport = UsbTransport::open_unique(config.vendor_id, config.product_id)?;
        transport.set_timeout(config.read_timeout());
        Self::from_transport(transport, entry)
    }
}

impl<T: Transport, E: PinEntry> TrezorDevice<T, E> {
    /// 在已打开的传输上完成 Initialize → Features 握手
    ///
    /// 握手失败时传输随 error 一起释放。
    pub fn from_transport(mut transport: T, entry: E) -> TrezorResult<Self> {
        info!("初始化 Trezor 设备...");

        let handshake = exchange(&mut transport, &Initialize::default(), &[ReplyKind::Features])?;
        let features = match handshake {
            Exchanged::Matched {
                reply: Reply::Features(features),
                ..
            } => features,
            Exchanged::Matched { reply, .. } => return Err(reply.unexpected(ReplyKind::Features)),
            Exchanged::Signal(signal) => {
                return Err(TrezorError::Protocol(format!(
                    "unexpected {:?} during handshake",
                    signal
                )))
            }
        };

        let [major, minor, patch] = features.firmware();
        info!(
            "✅ Trezor: {} {} v{}.{}.{} ({})",
            features.vendor.as_deref().unwrap_or("trezor.io"),
            features.model.as_deref().unwrap_or("1"),
            major,
            minor,
            patch,
            features.label()
        );
        if !is_trezor_firmware_safe(&features) {
            warn!(
                "⚠️ 固件版本过旧: {}.{}.{} < {}.{}.x",
                major, minor, patch, MIN_SAFE_FIRMWARE_MAJOR, MIN_SAFE_FIRMWARE_MINOR
            );
        }

        Ok(Self {
            transport,
            entry,
            features,
        })
    }

    /// 固件版本 [major, minor, patch]
    pub fn firmware(&self) -> [u32; 3] {
        self.features.firmware()
    }

    /// 设备标签
    pub fn label(&self) -> &str {
        self.features.label()
    }

    pub fn features(&self) -> &Features {
        &self.features
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// 发送请求，必要时完成 PIN/passphrase 解锁
    pub fn call<M: TrezorMessage>(
        &mut self,
        request: &M,
        expected: &[ReplyKind],
    ) -> TrezorResult<(usize, Reply)> {
        Unlocker::new(&mut self.transport, &mut self.entry).call(request, expected)
    }

    /// Ping 测试，返回设备回显的消息
    pub fn ping(&mut self, message: &str) -> TrezorResult<String> {
        let request = Ping {
            message: Some(message.to_string()),
            button_protection: None,
        };
        match self.call(&request, &[ReplyKind::Success])? {
            (_, Reply::Success(success)) => Ok(success.message.unwrap_or_default()),
            (_, other) => Err(other.unexpected(ReplyKind::Success)),
        }
    }

    /// 主动解锁：锁定的设备会在这里要求 PIN/passphrase
    pub fn unlock(&mut self) -> TrezorResult<()> {
        debug!("解锁 Trezor 设备...");
        self.call(&Ping::default(), &[ReplyKind::Success])?;
        info!("✅ 设备已解锁");
        Ok(())
    }

    pub fn bitcoin(&mut self) -> TrezorBitcoinApp<'_, T, E> {
        TrezorBitcoinApp::new(self)
    }

    pub fn ethereum(&mut self) -> TrezorEthereumApp<'_, T, E> {
        TrezorEthereumApp::new(self)
    }

    /// 按 ticker 选择对应的应用
    pub fn app_for(&mut self, ticker: &str) -> TrezorResult<Box<dyn CoinApp + '_>> {
        let app: Box<dyn CoinApp + '_> = match coins::coin_app(ticker)? {
            CoinFamily::Bitcoin => Box::new(self.bitcoin()),
            CoinFamily::Ethereum => Box::new(self.ethereum()),
        };
        Ok(app)
    }

    /// 解析路径并派生address
    pub fn get_address(&mut self, path: &str, coin: &str, mode: &str) -> TrezorResult<String> {
        let path = DerivationPath::parse(path)?;
        self.app_for(coin)?.get_address(&path, coin, mode)
    }

    /// 解析路径并派生扩展公钥
    pub fn get_xpub(&mut self, path: &str, coin: &str, mode: &str) -> TrezorResult<String> {
        let path = DerivationPath::parse(path)?;
        self.app_for(coin)?.get_xpub(&path, coin, mode)
    }

    /// 关闭设备，释放传输
    pub fn close(self) {
        info!("关闭 Trezor 设备: {}", self.label());
        drop(self.transport);
    }
}

/// check Trezor 固件版本是否足够安全
fn is_trezor_firmware_safe(features: &Features) -> bool {
    let [major, minor, _] = features.firmware();
    major > MIN_SAFE_FIRMWARE_MAJOR
        || (major == MIN_SAFE_FIRMWARE_MAJOR && minor >= MIN_SAFE_FIRMWARE_MINOR)
}
