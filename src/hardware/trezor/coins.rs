//! 币种参数表
//!
//! ticker → 协议中的 coin_name 与默认脚本类型。查找区分大小写，未知 ticker 直接拒绝。

use crate::core::errors::{TrezorError, TrezorResult};

/// InputScriptType（GetAddress / GetPublicKey 的 script_type 字段）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ScriptType {
    SpendAddress = 0,
    SpendMultisig = 1,
    External = 2,
    SpendWitness = 3,
    SpendP2shWitness = 4,
    SpendTaproot = 5,
}

impl ScriptType {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// 地址模式 → 脚本类型；空模式使用 `default`
    pub fn from_mode(mode: &str, default: ScriptType) -> Self {
        let mode = mode.trim();
        if mode.is_empty() {
            default
        } else if mode.eq_ignore_ascii_case("P2PKH") {
            ScriptType::SpendAddress
        } else if mode.eq_ignore_ascii_case("P2SH") {
            ScriptType::SpendP2shWitness
        } else {
            ScriptType::External
        }
    }
}

/// 币种所属的应用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoinFamily {
    Bitcoin,
    Ethereum,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinProfile {
    pub ticker: &'static str,
    /// 空字符串表示使用设备默认值
    pub coin_name: &'static str,
    pub default_script_type: ScriptType,
    pub family: CoinFamily,
}

impl CoinProfile {
    const fn bitcoin(ticker: &'static str, coin_name: &'static str, script: ScriptType) -> Self {
        Self {
            ticker,
            coin_name,
            default_script_type: script,
            family: CoinFamily::Bitcoin,
        }
    }

    const fn ethereum(ticker: &'static str, coin_name: &'static str) -> Self {
        Self {
            ticker,
            coin_name,
            default_script_type: ScriptType::SpendAddress,
            family: CoinFamily::Ethereum,
        }
    }

    /// 请求里的 coin_name 字段；空名称不发送
    pub fn coin_name_field(&self) -> Option<String> {
        (!self.coin_name.is_empty()).then(|| self.coin_name.to_string())
    }

    pub fn script_type(&self, mode: &str) -> ScriptType {
        ScriptType::from_mode(mode, self.default_script_type)
    }
}

/// 支持的币种
pub static COINS: &[CoinProfile] = &[
    CoinProfile::bitcoin("btc", "Bitcoin", ScriptType::SpendP2shWitness),
    CoinProfile::bitcoin("bch", "Bcash", ScriptType::SpendAddress),
    CoinProfile::bitcoin("btg", "Bgold", ScriptType::SpendP2shWitness),
    CoinProfile::bitcoin("dash", "Dash", ScriptType::SpendAddress),
    CoinProfile::bitcoin("dgb", "DigiByte", ScriptType::SpendP2shWitness),
    CoinProfile::bitcoin("doge", "Dogecoin", ScriptType::SpendAddress),
    CoinProfile::bitcoin("ltc", "Litecoin", ScriptType::SpendP2shWitness),
    CoinProfile::bitcoin("nmc", "Namecoin", ScriptType::SpendAddress),
    CoinProfile::bitcoin("vtc", "Vertcoin", ScriptType::SpendP2shWitness),
    CoinProfile::bitcoin("zec", "Zcash", ScriptType::SpendAddress),
    CoinProfile::ethereum("eth", "Ethereum"),
    CoinProfile::ethereum("etc", ""),
];

/// 按 ticker 精确查找
pub fn lookup(ticker: &str) -> TrezorResult<&'static CoinProfile> {
    COINS
        .iter()
        .find(|profile| profile.ticker == ticker)
        .ok_or_else(|| TrezorError::UnknownCoin(ticker.to_string()))
}

/// ticker 所属的应用
pub fn coin_app(ticker: &str) -> TrezorResult<CoinFamily> {
    lookup(ticker).map(|profile| profile.family)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("btc", "Bitcoin")]
    #[test_case("bch", "Bcash")]
    #[test_case("btg", "Bgold")]
    #[test_case("dash", "Dash")]
    #[test_case("dgb", "DigiByte")]
    #[test_case("doge", "Dogecoin")]
    #[test_case("ltc", "Litecoin")]
    #[test_case("nmc", "Namecoin")]
    #[test_case("vtc", "Vertcoin")]
    #[test_case("zec", "Zcash")]
    #[test_case("eth", "Ethereum")]
    #[test_case("etc", "")]
    fn test_coin_names(ticker: &str, name: &str) {
        assert_eq!(lookup(ticker).unwrap().coin_name, name);
    }

    #[test_case("BTC"; "upper case")]
    #[test_case("xmr"; "not in table")]
    #[test_case(""; "empty")]
    #[test_case(" btc"; "leading space")]
    fn test_unknown_coin(ticker: &str) {
        assert!(matches!(lookup(ticker), Err(TrezorError::UnknownCoin(t)) if t == ticker));
    }

    #[test_case("P2PKH", ScriptType::SpendAddress; "p2pkh")]
    #[test_case("p2pkh", ScriptType::SpendAddress; "p2pkh lower case")]
    #[test_case("P2SH", ScriptType::SpendP2shWitness; "p2sh")]
    #[test_case("P2WPKH", ScriptType::External; "other mode")]
    #[test_case("", ScriptType::SpendP2shWitness; "empty uses default")]
    fn test_btc_script_type(mode: &str, expected: ScriptType) {
        assert_eq!(lookup("btc").unwrap().script_type(mode), expected);
    }

    #[test]
    fn test_families() {
        assert_eq!(coin_app("ltc").unwrap(), CoinFamily::Bitcoin);
        assert_eq!(coin_app("etc").unwrap(), CoinFamily::Ethereum);
        assert!(coin_app("sol").is_err());
    }

    #[test]
    fn test_empty_coin_name_is_omitted() {
        assert_eq!(lookup("etc").unwrap().coin_name_field(), None);
        assert_eq!(
            lookup("doge").unwrap().coin_name_field(),
            Some("Dogecoin".to_string())
        );
    }

    #[test]
    fn test_script_type_codes() {
        assert_eq!(ScriptType::SpendAddress.code(), 0);
        assert_eq!(ScriptType::External.code(), 2);
        assert_eq!(ScriptType::SpendP2shWitness.code(), 4);
    }

    #[test]
    fn test_tickers_are_unique() {
        for (i, a) in COINS.iter().enumerate() {
            assert!(COINS[i + 1..].iter().all(|b| b.ticker != a.ticker));
        }
    }
}
