//! Trezor Ethereum App 集成
//!
//! 以太坊类币种不区分脚本类型，`mode` 参数被忽略。

use super::coins::{self, CoinFamily};
use super::device::{CoinApp, TrezorDevice};
use super::exchange::{Reply, ReplyKind};
use super::messages::{EthereumGetAddress, EthereumGetPublicKey};
use super::path::DerivationPath;
use super::pin_entry::PinEntry;
use super::transport::Transport;
use crate::core::errors::{TrezorError, TrezorResult};
use tracing::{debug, info};

/// Trezor Ethereum App
pub struct TrezorEthereumApp<'d, T: Transport, E: PinEntry> {
    device: &'d mut TrezorDevice<T, E>,
    show_display: bool,
}

impl<'d, T: Transport, E: PinEntry> TrezorEthereumApp<'d, T, E> {
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

    fn check_coin(coin: &str) -> TrezorResult<()> {
        if coins::lookup(coin)?.family != CoinFamily::Ethereum {
            return Err(TrezorError::UnsupportedCoin {
                ticker: coin.to_string(),
                app: "Ethereum",
            });
        }
        Ok(())
    }
}

impl<'d, T: Transport, E: PinEntry> CoinApp for TrezorEthereumApp<'d, T, E> {
    fn get_address(
        &mut self,
        path: &DerivationPath,
        coin: &str,
        _mode: &str,
    ) -> TrezorResult<String> {
        Self::check_coin(coin)?;
        info!("fetch {} address，路径: {}", coin, path);

        let request = EthereumGetAddress {
            address_n: path.indices().to_vec(),
            show_display: self.show_display.then_some(true),
        };

        match self.device.call(&request, &[ReplyKind::EthereumAddress])? {
            (_, Reply::EthereumAddress(reply)) => {
                let address = reply.address().ok_or_else(|| {
                    TrezorError::Protocol("EthereumAddress reply carries no address".to_string())
                })?;
                debug!("✅ address: {}", address);
                Ok(address)
            }
            (_, other) => Err(other.unexpected(ReplyKind::EthereumAddress)),
        }
    }

    fn get_xpub(&mut self, path: &DerivationPath, coin: &str, _mode: &str) -> TrezorResult<String> {
        Self::check_coin(coin)?;
        info!("fetch {} 扩展公钥，路径: {}", coin, path);

        let request = EthereumGetPublicKey {
            address_n: path.indices().to_vec(),
            show_display: self.show_display.then_some(true),
        };

        match self.device.call(&request, &[ReplyKind::EthereumPublicKey])? {
            (_, Reply::EthereumPublicKey(reply)) => Ok(reply.xpub),
            (_, other) => Err(other.unexpected(ReplyKind::EthereumPublicKey)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::trezor::messages::{
        EthereumAddress, EthereumPublicKey, Features, MessageType, TrezorMessage,
    };
    use crate::hardware::trezor::mock::{ScriptedEntry, ScriptedTransport};
    use pretty_assertions::assert_eq;

    const ADDRESS: &str = "0x73d0385F4d8E00C5e6504C6030F47BF6212736A8";

    #[test]
    fn test_get_address_ignores_mode() {
        let mut transport = ScriptedTransport::new();
        transport.push_reply(&Features::default()).unwrap();
        transport
            .push_reply(&EthereumAddress {
                old_address: None,
                address: Some(ADDRESS.to_string()),
            })
            .unwrap();
        let path = DerivationPath::parse("m/44'/60'/0'/0/0").unwrap();

        {
            let mut device =
                TrezorDevice::from_transport(&mut transport, ScriptedEntry::default()).unwrap();
            let address = device.ethereum().get_address(&path, "eth", "P2PKH").unwrap();
            assert_eq!(address, ADDRESS);
        }

        let written = transport.written_messages();
        assert_eq!(written[1].msg_type, MessageType::EthereumGetAddress.tag());
        let request = EthereumGetAddress::from_bytes(&written[1].payload).unwrap();
        assert_eq!(request.address_n, path.indices());
        assert_eq!(request.show_display, None);
    }

    #[test]
    fn test_get_xpub_for_etc() {
        let mut transport = ScriptedTransport::new();
        transport.push_reply(&Features::default()).unwrap();
        transport
            .push_reply(&EthereumPublicKey {
                xpub: "xpub6DCoCpSuQZB2jawqnGMEPS63ePKWkwWPH4TU45Q7LPXWuNd8TMtVxRrgjtEshuqpK3mdhaWHPFsBngh5GFZaM6si3yZdUSfdfa2FQcEoNmd".to_string(),
            })
            .unwrap();

        let mut device =
            TrezorDevice::from_transport(transport, ScriptedEntry::default()).unwrap();
        let path = DerivationPath::parse("m/44'/61'/0'").unwrap();
        let xpub = device.ethereum().get_xpub(&path, "etc", "").unwrap();
        assert!(xpub.starts_with("xpub6DCoCp"));
    }

    #[test]
    fn test_bitcoin_coin_is_unsupported() {
        let mut transport = ScriptedTransport::new();
        transport.push_reply(&Features::default()).unwrap();
        let mut device =
            TrezorDevice::from_transport(transport, ScriptedEntry::default()).unwrap();
        let path = DerivationPath::parse("m/44'/0'/0'/0/0").unwrap();

        let err = device.ethereum().get_address(&path, "btc", "").unwrap_err();
        assert!(matches!(err, TrezorError::UnsupportedCoin { app: "Ethereum", .. }));
        assert_eq!(device.transport().written_types().len(), 1);
    }
}
