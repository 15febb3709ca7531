//! Trezor Protobuf 消息定义
//!
//! 只实现本客户端用到的消息。字段编号与 Trezor 公开的 protobuf schema 一致，
//! 字段编解码交给 `protobuf` crate 的 `CodedOutputStream` / `CodedInputStream`。

use crate::core::errors::{FailureKind, TrezorError, TrezorResult};
use protobuf::{CodedInputStream, CodedOutputStream, UnknownFields};
use std::fmt;
use zeroize::Zeroizing;

/// 消息类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum MessageType {
    // 通用消息
    Initialize = 0,
    Ping = 1,
    Success = 2,
    Failure = 3,
    Features = 17,

    // 公钥操作
    GetPublicKey = 11,
    PublicKey = 12,

    // address操作
    GetAddress = 29,
    Address = 30,
    EthereumGetAddress = 56,
    EthereumAddress = 57,
    EthereumGetPublicKey = 450,
    EthereumPublicKey = 451,

    // PIN/Passphrase
    PinMatrixRequest = 18,
    PinMatrixAck = 19,
    PassphraseRequest = 41,
    PassphraseAck = 42,

    // 按钮确认
    ButtonRequest = 26,
    ButtonAck = 27,
}

impl MessageType {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(Self::Initialize),
            1 => Some(Self::Ping),
            2 => Some(Self::Success),
            3 => Some(Self::Failure),
            17 => Some(Self::Features),
            11 => Some(Self::GetPublicKey),
            12 => Some(Self::PublicKey),
            29 => Some(Self::GetAddress),
            30 => Some(Self::Address),
            56 => Some(Self::EthereumGetAddress),
            57 => Some(Self::EthereumAddress),
            450 => Some(Self::EthereumGetPublicKey),
            451 => Some(Self::EthereumPublicKey),
            18 => Some(Self::PinMatrixRequest),
            19 => Some(Self::PinMatrixAck),
            41 => Some(Self::PassphraseRequest),
            42 => Some(Self::PassphraseAck),
            26 => Some(Self::ButtonRequest),
            27 => Some(Self::ButtonAck),
            _ => None,
        }
    }

    pub fn tag(self) -> u16 {
        self as u16
    }
}

/// 可读的消息类型名称，未知类型显示为 `Unknown(n)`
pub fn describe_tag(tag: u16) -> String {
    match MessageType::from_u16(tag) {
        Some(msg_type) => format!("{:?}", msg_type),
        None => format!("Unknown({})", tag),
    }
}

/// 一条带类型标签的 protobuf 消息
///
/// `write_fields` 写出所有已设置的字段；`merge_field` 处理读到的单个 tag，
/// 未知字段交给 [`skip_field`] 跳过。
pub trait TrezorMessage: Default + fmt::Debug {
    const MESSAGE_TYPE: MessageType;

    fn write_fields(&self, os: &mut CodedOutputStream<'_>) -> protobuf::Result<()>;

    fn merge_field(&mut self, tag: u32, is: &mut CodedInputStream<'_>) -> protobuf::Result<()>;

    /// 序列化为 protobuf 字节
    fn to_bytes(&self) -> TrezorResult<Vec<u8>> {
        let marshal = |source| TrezorError::Marshal {
            message: message_name(Self::MESSAGE_TYPE),
            source,
        };
        let mut buf = Vec::new();
        {
            let mut os = CodedOutputStream::vec(&mut buf);
            self.write_fields(&mut os).map_err(marshal)?;
            os.flush().map_err(marshal)?;
        }
        Ok(buf)
    }

    /// from protobuf 字节解析
    fn from_bytes(bytes: &[u8]) -> TrezorResult<Self> {
        let unmarshal = |source| TrezorError::Unmarshal {
            message: message_name(Self::MESSAGE_TYPE),
            source,
        };
        let mut msg = Self::default();
        let mut is = CodedInputStream::from_bytes(bytes);
        while let Some(tag) = is.read_raw_tag_or_eof().map_err(unmarshal)? {
            msg.merge_field(tag, &mut is).map_err(unmarshal)?;
        }
        Ok(msg)
    }
}

fn message_name(msg_type: MessageType) -> &'static str {
    match msg_type {
        MessageType::Initialize => "Initialize",
        MessageType::Ping => "Ping",
        MessageType::Success => "Success",
        MessageType::Failure => "Failure",
        MessageType::Features => "Features",
        MessageType::GetPublicKey => "GetPublicKey",
        MessageType::PublicKey => "PublicKey",
        MessageType::GetAddress => "GetAddress",
        MessageType::Address => "Address",
        MessageType::EthereumGetAddress => "EthereumGetAddress",
        MessageType::EthereumAddress => "EthereumAddress",
        MessageType::EthereumGetPublicKey => "EthereumGetPublicKey",
        MessageType::EthereumPublicKey => "EthereumPublicKey",
        MessageType::PinMatrixRequest => "PinMatrixRequest",
        MessageType::PinMatrixAck => "PinMatrixAck",
        MessageType::PassphraseRequest => "PassphraseRequest",
        MessageType::PassphraseAck => "PassphraseAck",
        MessageType::ButtonRequest => "ButtonRequest",
        MessageType::ButtonAck => "ButtonAck",
    }
}

/// 跳过未知字段
fn skip_field(tag: u32, is: &mut CodedInputStream<'_>) -> protobuf::Result<()> {
    protobuf::rt::read_unknown_or_skip_group(tag, is, &mut UnknownFields::new())
}

/// address_n: repeated uint32 (field 1)，兼容 packed 与非 packed 编码
fn merge_address_n(
    address_n: &mut Vec<u32>,
    tag: u32,
    is: &mut CodedInputStream<'_>,
) -> protobuf::Result<()> {
    match tag {
        8 => address_n.push(is.read_uint32()?),
        10 => is.read_repeated_packed_uint32_into(address_n)?,
        _ => skip_field(tag, is)?,
    }
    Ok(())
}

fn write_address_n(address_n: &[u32], os: &mut CodedOutputStream<'_>) -> protobuf::Result<()> {
    for &index in address_n {
        os.write_uint32(1, index)?;
    }
    Ok(())
}

// ============ 通用消息 ============

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Initialize {}

impl TrezorMessage for Initialize {
    const MESSAGE_TYPE: MessageType = MessageType::Initialize;

    fn write_fields(&self, _os: &mut CodedOutputStream<'_>) -> protobuf::Result<()> {
        Ok(())
    }

    fn merge_field(&mut self, tag: u32, is: &mut CodedInputStream<'_>) -> protobuf::Result<()> {
        skip_field(tag, is)
    }
}

/// 设备特性（Initialize 的应答）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Features {
    pub vendor: Option<String>,
    pub major_version: Option<u32>,
    pub minor_version: Option<u32>,
    pub patch_version: Option<u32>,
    pub device_id: Option<String>,
    pub pin_protection: Option<bool>,
    pub passphrase_protection: Option<bool>,
    pub label: Option<String>,
    pub initialized: Option<bool>,
    pub model: Option<String>,
}

impl Features {
    pub fn firmware(&self) -> [u32; 3] {
        [
            self.major_version.unwrap_or_default(),
            self.minor_version.unwrap_or_default(),
            self.patch_version.unwrap_or_default(),
        ]
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or_default()
    }
}

impl TrezorMessage for Features {
    const MESSAGE_TYPE: MessageType = MessageType::Features;

    fn write_fields(&self, os: &mut CodedOutputStream<'_>) -> protobuf::Result<()> {
        if let Some(v) = &self.vendor {
            os.write_string(1, v)?;
        }
        if let Some(v) = self.major_version {
            os.write_uint32(2, v)?;
        }
        if let Some(v) = self.minor_version {
            os.write_uint32(3, v)?;
        }
        if let Some(v) = self.patch_version {
            os.write_uint32(4, v)?;
        }
        if let Some(v) = &self.device_id {
            os.write_string(6, v)?;
        }
        if let Some(v) = self.pin_protection {
            os.write_bool(7, v)?;
        }
        if let Some(v) = self.passphrase_protection {
            os.write_bool(8, v)?;
        }
        if let Some(v) = &self.label {
            os.write_string(10, v)?;
        }
        if let Some(v) = self.initialized {
            os.write_bool(12, v)?;
        }
        if let Some(v) = &self.model {
            os.write_string(21, v)?;
        }
        Ok(())
    }

    fn merge_field(&mut self, tag: u32, is: &mut CodedInputStream<'_>) -> protobuf::Result<()> {
        match tag {
            10 => self.vendor = Some(is.read_string()?),
            16 => self.major_version = Some(is.read_uint32()?),
            24 => self.minor_version = Some(is.read_uint32()?),
            32 => self.patch_version = Some(is.read_uint32()?),
            50 => self.device_id = Some(is.read_string()?),
            56 => self.pin_protection = Some(is.read_bool()?),
            64 => self.passphrase_protection = Some(is.read_bool()?),
            82 => self.label = Some(is.read_string()?),
            96 => self.initialized = Some(is.read_bool()?),
            170 => self.model = Some(is.read_string()?),
            _ => skip_field(tag, is)?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ping {
    pub message: Option<String>,
    pub button_protection: Option<bool>,
}

impl TrezorMessage for Ping {
    const MESSAGE_TYPE: MessageType = MessageType::Ping;

    fn write_fields(&self, os: &mut CodedOutputStream<'_>) -> protobuf::Result<()> {
        if let Some(v) = &self.message {
            os.write_string(1, v)?;
        }
        if let Some(v) = self.button_protection {
            os.write_bool(2, v)?;
        }
        Ok(())
    }

    fn merge_field(&mut self, tag: u32, is: &mut CodedInputStream<'_>) -> protobuf::Result<()> {
        match tag {
            10 => self.message = Some(is.read_string()?),
            16 => self.button_protection = Some(is.read_bool()?),
            _ => skip_field(tag, is)?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Success {
    pub message: Option<String>,
}

impl TrezorMessage for Success {
    const MESSAGE_TYPE: MessageType = MessageType::Success;

    fn write_fields(&self, os: &mut CodedOutputStream<'_>) -> protobuf::Result<()> {
        if let Some(v) = &self.message {
            os.write_string(1, v)?;
        }
        Ok(())
    }

    fn merge_field(&mut self, tag: u32, is: &mut CodedInputStream<'_>) -> protobuf::Result<()> {
        match tag {
            10 => self.message = Some(is.read_string()?),
            _ => skip_field(tag, is)?,
        }
        Ok(())
    }
}

/// Failure.code 中与 PIN 相关的取值
pub const FAILURE_PIN_CANCELLED: i32 = 6;
pub const FAILURE_PIN_INVALID: i32 = 7;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Failure {
    pub code: Option<i32>,
    pub message: Option<String>,
}

impl Failure {
    /// 把设备返回的失败映射为具体的 error 类型
    pub fn kind(&self) -> FailureKind {
        match (self.message.as_deref(), self.code) {
            (Some("PIN cancelled"), _) | (None, Some(FAILURE_PIN_CANCELLED)) => {
                FailureKind::PinCancelled
            }
            (Some("PIN invalid"), _) | (None, Some(FAILURE_PIN_INVALID)) => FailureKind::PinInvalid,
            (Some(msg), _) => FailureKind::Other(msg.to_string()),
            (None, code) => FailureKind::Other(format!("failure code {:?}", code)),
        }
    }
}

impl TrezorMessage for Failure {
    const MESSAGE_TYPE: MessageType = MessageType::Failure;

    fn write_fields(&self, os: &mut CodedOutputStream<'_>) -> protobuf::Result<()> {
        if let Some(v) = self.code {
            os.write_enum(1, v)?;
        }
        if let Some(v) = &self.message {
            os.write_string(2, v)?;
        }
        Ok(())
    }

    fn merge_field(&mut self, tag: u32, is: &mut CodedInputStream<'_>) -> protobuf::Result<()> {
        match tag {
            8 => self.code = Some(is.read_int32()?),
            18 => self.message = Some(is.read_string()?),
            _ => skip_field(tag, is)?,
        }
        Ok(())
    }
}

// ============ 按钮确认 ============

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ButtonRequest {
    pub code: Option<i32>,
}

impl TrezorMessage for ButtonRequest {
    const MESSAGE_TYPE: MessageType = MessageType::ButtonRequest;

    fn write_fields(&self, os: &mut CodedOutputStream<'_>) -> protobuf::Result<()> {
        if let Some(v) = self.code {
            os.write_enum(1, v)?;
        }
        Ok(())
    }

    fn merge_field(&mut self, tag: u32, is: &mut CodedInputStream<'_>) -> protobuf::Result<()> {
        match tag {
            8 => self.code = Some(is.read_int32()?),
            _ => skip_field(tag, is)?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ButtonAck {}

impl TrezorMessage for ButtonAck {
    const MESSAGE_TYPE: MessageType = MessageType::ButtonAck;

    fn write_fields(&self, _os: &mut CodedOutputStream<'_>) -> protobuf::Result<()> {
        Ok(())
    }

    fn merge_field(&mut self, tag: u32, is: &mut CodedInputStream<'_>) -> protobuf::Result<()> {
        skip_field(tag, is)
    }
}

// ============ PIN/Passphrase ============

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinMatrixRequest {
    pub r#type: Option<i32>,
}

impl TrezorMessage for PinMatrixRequest {
    const MESSAGE_TYPE: MessageType = MessageType::PinMatrixRequest;

    fn write_fields(&self, os: &mut CodedOutputStream<'_>) -> protobuf::Result<()> {
        if let Some(v) = self.r#type {
            os.write_enum(1, v)?;
        }
        Ok(())
    }

    fn merge_field(&mut self, tag: u32, is: &mut CodedInputStream<'_>) -> protobuf::Result<()> {
        match tag {
            8 => self.r#type = Some(is.read_int32()?),
            _ => skip_field(tag, is)?,
        }
        Ok(())
    }
}

/// PIN 以 3x3 键盘位置编码，不记录到日志
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PinMatrixAck {
    pub pin: Zeroizing<String>,
}

impl fmt::Debug for PinMatrixAck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinMatrixAck").field("pin", &"<redacted>").finish()
    }
}

impl TrezorMessage for PinMatrixAck {
    const MESSAGE_TYPE: MessageType = MessageType::PinMatrixAck;

    fn write_fields(&self, os: &mut CodedOutputStream<'_>) -> protobuf::Result<()> {
        os.write_string(1, &self.pin)
    }

    fn merge_field(&mut self, tag: u32, is: &mut CodedInputStream<'_>) -> protobuf::Result<()> {
        match tag {
            10 => self.pin = Zeroizing::new(is.read_string()?),
            _ => skip_field(tag, is)?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassphraseRequest {
    pub on_device: Option<bool>,
}

impl TrezorMessage for PassphraseRequest {
    const MESSAGE_TYPE: MessageType = MessageType::PassphraseRequest;

    fn write_fields(&self, os: &mut CodedOutputStream<'_>) -> protobuf::Result<()> {
        if let Some(v) = self.on_device {
            os.write_bool(1, v)?;
        }
        Ok(())
    }

    fn merge_field(&mut self, tag: u32, is: &mut CodedInputStream<'_>) -> protobuf::Result<()> {
        match tag {
            8 => self.on_device = Some(is.read_bool()?),
            _ => skip_field(tag, is)?,
        }
        Ok(())
    }
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct PassphraseAck {
    pub passphrase: Option<Zeroizing<String>>,
    pub on_device: Option<bool>,
}

impl fmt::Debug for PassphraseAck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassphraseAck")
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .field("on_device", &self.on_device)
            .finish()
    }
}

impl TrezorMessage for PassphraseAck {
    const MESSAGE_TYPE: MessageType = MessageType::PassphraseAck;

    fn write_fields(&self, os: &mut CodedOutputStream<'_>) -> protobuf::Result<()> {
        if let Some(v) = &self.passphrase {
            os.write_string(1, v)?;
        }
        if let Some(v) = self.on_device {
            os.write_bool(3, v)?;
        }
        Ok(())
    }

    fn merge_field(&mut self, tag: u32, is: &mut CodedInputStream<'_>) -> protobuf::Result<()> {
        match tag {
            10 => self.passphrase = Some(Zeroizing::new(is.read_string()?)),
            24 => self.on_device = Some(is.read_bool()?),
            _ => skip_field(tag, is)?,
        }
        Ok(())
    }
}

// ============ Bitcoin ============

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetAddress {
    pub address_n: Vec<u32>,
    pub coin_name: Option<String>,
    pub show_display: Option<bool>,
    pub script_type: Option<i32>,
}

impl TrezorMessage for GetAddress {
    const MESSAGE_TYPE: MessageType = MessageType::GetAddress;

    fn write_fields(&self, os: &mut CodedOutputStream<'_>) -> protobuf::Result<()> {
        write_address_n(&self.address_n, os)?;
        if let Some(v) = &self.coin_name {
            os.write_string(2, v)?;
        }
        if let Some(v) = self.show_display {
            os.write_bool(3, v)?;
        }
        if let Some(v) = self.script_type {
            os.write_enum(5, v)?;
        }
        Ok(())
    }

    fn merge_field(&mut self, tag: u32, is: &mut CodedInputStream<'_>) -> protobuf::Result<()> {
        match tag {
            18 => self.coin_name = Some(is.read_string()?),
            24 => self.show_display = Some(is.read_bool()?),
            40 => self.script_type = Some(is.read_int32()?),
            _ => merge_address_n(&mut self.address_n, tag, is)?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub address: String,
}

impl TrezorMessage for Address {
    const MESSAGE_TYPE: MessageType = MessageType::Address;

    fn write_fields(&self, os: &mut CodedOutputStream<'_>) -> protobuf::Result<()> {
        os.write_string(1, &self.address)
    }

    fn merge_field(&mut self, tag: u32, is: &mut CodedInputStream<'_>) -> protobuf::Result<()> {
        match tag {
            10 => self.address = is.read_string()?,
            _ => skip_field(tag, is)?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetPublicKey {
    pub address_n: Vec<u32>,
    pub ecdsa_curve_name: Option<String>,
    pub show_display: Option<bool>,
    pub coin_name: Option<String>,
    pub script_type: Option<i32>,
}

impl TrezorMessage for GetPublicKey {
    const MESSAGE_TYPE: MessageType = MessageType::GetPublicKey;

    fn write_fields(&self, os: &mut CodedOutputStream<'_>) -> protobuf::Result<()> {
        write_address_n(&self.address_n, os)?;
        if let Some(v) = &self.ecdsa_curve_name {
            os.write_string(2, v)?;
        }
        if let Some(v) = self.show_display {
            os.write_bool(3, v)?;
        }
        if let Some(v) = &self.coin_name {
            os.write_string(4, v)?;
        }
        if let Some(v) = self.script_type {
            os.write_enum(5, v)?;
        }
        Ok(())
    }

    fn merge_field(&mut self, tag: u32, is: &mut CodedInputStream<'_>) -> protobuf::Result<()> {
        match tag {
            18 => self.ecdsa_curve_name = Some(is.read_string()?),
            24 => self.show_display = Some(is.read_bool()?),
            34 => self.coin_name = Some(is.read_string()?),
            40 => self.script_type = Some(is.read_int32()?),
            _ => merge_address_n(&mut self.address_n, tag, is)?,
        }
        Ok(())
    }
}

/// 扩展公钥应答；HD 节点（field 1）不解析
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublicKey {
    pub xpub: String,
}

impl TrezorMessage for PublicKey {
    const MESSAGE_TYPE: MessageType = MessageType::PublicKey;

    fn write_fields(&self, os: &mut CodedOutputStream<'_>) -> protobuf::Result<()> {
        os.write_string(2, &self.xpub)
    }

    fn merge_field(&mut self, tag: u32, is: &mut CodedInputStream<'_>) -> protobuf::Result<()> {
        match tag {
            18 => self.xpub = is.read_string()?,
            _ => skip_field(tag, is)?,
        }
        Ok(())
    }
}

// ============ Ethereum ============

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EthereumGetAddress {
    pub address_n: Vec<u32>,
    pub show_display: Option<bool>,
}

impl TrezorMessage for EthereumGetAddress {
    const MESSAGE_TYPE: MessageType = MessageType::EthereumGetAddress;

    fn write_fields(&self, os: &mut CodedOutputStream<'_>) -> protobuf::Result<()> {
        write_address_n(&self.address_n, os)?;
        if let Some(v) = self.show_display {
            os.write_bool(2, v)?;
        }
        Ok(())
    }

    fn merge_field(&mut self, tag: u32, is: &mut CodedInputStream<'_>) -> protobuf::Result<()> {
        match tag {
            16 => self.show_display = Some(is.read_bool()?),
            _ => merge_address_n(&mut self.address_n, tag, is)?,
        }
        Ok(())
    }
}

/// 旧固件在 field 1 返回 20 字节原始address，新固件在 field 2 返回字符串
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EthereumAddress {
    pub old_address: Option<Vec<u8>>,
    pub address: Option<String>,
}

impl EthereumAddress {
    pub fn address(&self) -> Option<String> {
        match (&self.address, &self.old_address) {
            (Some(address), _) => Some(address.clone()),
            (None, Some(raw)) => Some(format!("0x{}", hex::encode(raw))),
            (None, None) => None,
        }
    }
}

impl TrezorMessage for EthereumAddress {
    const MESSAGE_TYPE: MessageType = MessageType::EthereumAddress;

    fn write_fields(&self, os: &mut CodedOutputStream<'_>) -> protobuf::Result<()> {
        if let Some(v) = &self.old_address {
            os.write_bytes(1, v)?;
        }
        if let Some(v) = &self.address {
            os.write_string(2, v)?;
        }
        Ok(())
    }

    fn merge_field(&mut self, tag: u32, is: &mut CodedInputStream<'_>) -> protobuf::Result<()> {
        match tag {
            10 => self.old_address = Some(is.read_bytes()?),
            18 => self.address = Some(is.read_string()?),
            _ => skip_field(tag, is)?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EthereumGetPublicKey {
    pub address_n: Vec<u32>,
    pub show_display: Option<bool>,
}

impl TrezorMessage for EthereumGetPublicKey {
    const MESSAGE_TYPE: MessageType = MessageType::EthereumGetPublicKey;

    fn write_fields(&self, os: &mut CodedOutputStream<'_>) -> protobuf::Result<()> {
        write_address_n(&self.address_n, os)?;
        if let Some(v) = self.show_display {
            os.write_bool(2, v)?;
        }
        Ok(())
    }

    fn merge_field(&mut self, tag: u32, is: &mut CodedInputStream<'_>) -> protobuf::Result<()> {
        match tag {
            16 => self.show_display = Some(is.read_bool()?),
            _ => merge_address_n(&mut self.address_n, tag, is)?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EthereumPublicKey {
    pub xpub: String,
}

impl TrezorMessage for EthereumPublicKey {
    const MESSAGE_TYPE: MessageType = MessageType::EthereumPublicKey;

    fn write_fields(&self, os: &mut CodedOutputStream<'_>) -> protobuf::Result<()> {
        os.write_string(2, &self.xpub)
    }

    fn merge_field(&mut self, tag: u32, is: &mut CodedInputStream<'_>) -> protobuf::Result<()> {
        match tag {
            18 => self.xpub = is.read_string()?,
            _ => skip_field(tag, is)?,
        }
        Ok(())
    }
}
