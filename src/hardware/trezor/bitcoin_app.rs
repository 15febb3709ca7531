//! Trezor Bitcoin App 集成
//!
//! Bitcoin 及其分叉币（bch、ltc、doge 等）的address和扩展公钥派生

use super::coins::{self, CoinFamily, CoinProfile};
use super::device::{CoinApp, TrezorDevice};
use super::exchange::{Reply, ReplyKind};
use super::messages::{GetAddress, GetPublicKey};
use super::path::DerivationPath;
use super::pin_entry::PinEntry;
use super::transport::Transport;
use crate::core::errors::{TrezorError, TrezorResult};
use tracing::{debug, info};

/// Bitcoin Cash 的 cashaddr 前缀
pub const CASHADDR_PREFIX: &str = "bitcoincash:";

/// Trezor Bitcoin App
pub struct TrezorBitcoinApp<'d, T: Transport, E: PinEntry> {
    device: &'d mut TrezorDevice<T, E>,
    show_display: bool,
}

impl<'d, T: Transport, E: PinEntry> TrezorBitcoinApp<'d, T, E> {
    pub fn new(device: &'d mut TrezorDevice<T, E>) -> Self {
        Self {
            device,
            show_display: false,
        }
    }

    /// 是否在设备屏幕上显示结果
    pub fn show_on_device(mut self, show: bool) -> Self {
        self.show_display = show;
        self
    }

    fn profile(coin: &str) -> TrezorResult<&'static CoinProfile> {
        let profile = coins::lookup(coin)?;
        if profile.family != CoinFamily::Bitcoin {
            return Err(TrezorError::UnsupportedCoin {
                ticker: coin.to_string(),
                app: "Bitcoin",
            });
        }
        Ok(profile)
    }

    fn show_display(&self) -> Option<bool> {
        self.show_display.then_some(true)
    }
}

impl<'d, T: Transport, E: PinEntry> CoinApp for TrezorBitcoinApp<'d, T, E> {
    fn get_address(
        &mut self,
        path: &DerivationPath,
        coin: &str,
        mode: &str,
    ) -> TrezorResult<String> {
        let profile = Self::profile(coin)?;
        let script_type = profile.script_type(mode);
        info!("fetch {} address，路径: {}, 脚本: {:?}", coin, path, script_type);

        let request = GetAddress {
            address_n: path.indices().to_vec(),
            coin_name: profile.coin_name_field(),
            show_display: self.show_display(),
            script_type: Some(script_type.code()),
        };

        match self.device.call(&request, &[ReplyKind::Address])? {
            (_, Reply::Address(reply)) => {
                let address = strip_cashaddr_prefix(reply.address);
                debug!("✅ address: {}", address);
                Ok(address)
            }
            (_, other) => Err(other.unexpected(ReplyKind::Address)),
        }
    }

    fn get_xpub(&mut self, path: &DerivationPath, coin: &str, mode: &str) -> TrezorResult<String> {
        let profile = Self::profile(coin)?;
        let script_type = profile.script_type(mode);
        info!("fetch {} 扩展公钥，路径: {}", coin, path);

        let request = GetPublicKey {
            address_n: path.indices().to_vec(),
            ecdsa_curve_name: None,
            show_display: self.show_display(),
            coin_name: profile.coin_name_field(),
            script_type: Some(script_type.code()),
        };

        match self.device.call(&request, &[ReplyKind::PublicKey])? {
            (_, Reply::PublicKey(reply)) => Ok(reply.xpub),
            (_, other) => Err(other.unexpected(ReplyKind::PublicKey)),
        }
    }
}

/// 去掉address开头的 `bitcoincash:`，其他位置的同名字符串保持不变
pub fn strip_cashaddr_prefix(address: String) -> String {
    match address.strip_prefix(CASHADDR_PREFIX) {
        Some(rest) => rest.to_string(),
        None => address,
    }
}
