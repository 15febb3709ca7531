//! BIP32 派生路径
//!
//! 语法：`"m/" segment ("/" segment)*`，segment 为十进制数字，可带 `'` 表示 hardened。

use crate::core::errors::{TrezorError, TrezorResult};
use std::fmt;
use std::str::FromStr;

/// hardened 偏移量 (2^31)
pub const HARDENED: u32 = 0x8000_0000;

/// 解析后的派生路径
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivationPath(Vec<u32>);

impl DerivationPath {
    pub fn new(indices: Vec<u32>) -> Self {
        Self(indices)
    }

    /// from字符串解析（如 "m/44'/0'/0'/0/0"）
    pub fn parse(path: &str) -> TrezorResult<Self> {
        let rest = path
            .strip_prefix("m/")
            .ok_or_else(|| TrezorError::InvalidPath(path.to_string()))?;

        rest.split('/')
            .map(|segment| {
                parse_segment(segment).ok_or_else(|| TrezorError::MalformedSegment {
                    path: path.to_string(),
                    segment: segment.to_string(),
                })
            })
            .collect::<TrezorResult<Vec<u32>>>()
            .map(Self)
    }

    pub fn indices(&self) -> &[u32] {
        &self.0
    }

    pub fn into_indices(self) -> Vec<u32> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 每一级是否为 hardened
    pub fn hardened(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().map(|&index| index & HARDENED != 0)
    }
}

fn parse_segment(segment: &str) -> Option<u32> {
    let (digits, hardened) = match segment.strip_suffix('\'') {
        Some(digits) => (digits, true),
        None => (segment, false),
    };
    // u32::from_str 接受 "+5"，这里只允许纯数字
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u32 = digits.parse().ok()?;
    // 最高位只能由 `'` 设置，否则 Display 无法还原原文
    if value >= HARDENED {
        return None;
    }
    Some(if hardened { value | HARDENED } else { value })
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for &index in &self.0 {
            if index & HARDENED != 0 {
                write!(f, "/{}'", index - HARDENED)?;
            } else {
                write!(f, "/{}", index)?;
            }
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = TrezorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<[u32]> for DerivationPath {
    fn as_ref(&self) -> &[u32] {
        &self.0
    }
}
