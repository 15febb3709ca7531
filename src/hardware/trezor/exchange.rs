//! 请求/应答交换
//!
//! 一次交换 = 发送一个请求 + 读取与之对应的一个应答。
//! `ButtonRequest` 在这里直接确认（这是唯一可能无限等待user的地方），
//! PIN/passphrase 请求作为 [`Signal`] 交给上层的解锁状态机处理。

use super::messages::{
    Address, ButtonAck, EthereumAddress, EthereumPublicKey, Failure, Features, MessageType,
    PassphraseRequest, PublicKey, Success, TrezorMessage,
};
use super::transport::{read_message, write_message, Transport};
use crate::core::errors::{TrezorError, TrezorResult};
use tracing::{debug, info, warn};

/// 设备要求主机侧补充输入的信号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    None,
    PinRequired,
    PasswordRequired,
}

/// 调用方可以接受的应答类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Success,
    Features,
    Address,
    PublicKey,
    EthereumAddress,
    EthereumPublicKey,
    PassphraseRequest,
}

impl ReplyKind {
    pub fn message_type(self) -> MessageType {
        match self {
            ReplyKind::Success => MessageType::Success,
            ReplyKind::Features => MessageType::Features,
            ReplyKind::Address => MessageType::Address,
            ReplyKind::PublicKey => MessageType::PublicKey,
            ReplyKind::EthereumAddress => MessageType::EthereumAddress,
            ReplyKind::EthereumPublicKey => MessageType::EthereumPublicKey,
            ReplyKind::PassphraseRequest => MessageType::PassphraseRequest,
        }
    }

    fn decode(self, payload: &[u8]) -> TrezorResult<Reply> {
        Ok(match self {
            ReplyKind::Success => Reply::Success(Success::from_bytes(payload)?),
            ReplyKind::Features => Reply::Features(Features::from_bytes(payload)?),
            ReplyKind::Address => Reply::Address(Address::from_bytes(payload)?),
            ReplyKind::PublicKey => Reply::PublicKey(PublicKey::from_bytes(payload)?),
            ReplyKind::EthereumAddress => {
                Reply::EthereumAddress(EthereumAddress::from_bytes(payload)?)
            }
            ReplyKind::EthereumPublicKey => {
                Reply::EthereumPublicKey(EthereumPublicKey::from_bytes(payload)?)
            }
            ReplyKind::PassphraseRequest => {
                Reply::PassphraseRequest(PassphraseRequest::from_bytes(payload)?)
            }
        })
    }
}

/// 解码后的应答
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Success(Success),
    Features(Features),
    Address(Address),
    PublicKey(PublicKey),
    EthereumAddress(EthereumAddress),
    EthereumPublicKey(EthereumPublicKey),
    PassphraseRequest(PassphraseRequest),
}

impl Reply {
    pub fn kind(&self) -> ReplyKind {
        match self {
            Reply::Success(_) => ReplyKind::Success,
            Reply::Features(_) => ReplyKind::Features,
            Reply::Address(_) => ReplyKind::Address,
            Reply::PublicKey(_) => ReplyKind::PublicKey,
            Reply::EthereumAddress(_) => ReplyKind::EthereumAddress,
            Reply::EthereumPublicKey(_) => ReplyKind::EthereumPublicKey,
            Reply::PassphraseRequest(_) => ReplyKind::PassphraseRequest,
        }
    }

    /// 应答类型与期望不符时的 error
    pub fn unexpected(&self, expected: ReplyKind) -> TrezorError {
        TrezorError::UnexpectedReply {
            expected: vec![format!("{:?}", expected)],
            received: self.kind().message_type().tag(),
        }
    }
}

/// 一次交换的结果：匹配到某个期望的应答，或者一个信号
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exchanged {
    /// `index` 是 `expected` 中被匹配项的位置
    Matched { index: usize, reply: Reply },
    Signal(Signal),
}

impl Exchanged {
    pub fn index(&self) -> Option<usize> {
        match self {
            Exchanged::Matched { index, .. } => Some(*index),
            Exchanged::Signal(_) => None,
        }
    }

    pub fn signal(&self) -> Signal {
        match self {
            Exchanged::Matched { .. } => Signal::None,
            Exchanged::Signal(signal) => *signal,
        }
    }
}

/// 发送一条消息，不读取应答
pub fn send<T, M>(transport: &mut T, message: &M) -> TrezorResult<()>
where
    T: Transport + ?Sized,
    M: TrezorMessage,
{
    let payload = message.to_bytes()?;
    write_message(transport, M::MESSAGE_TYPE.tag(), &payload)
}

/// 执行一次交换
///
/// 应答的处理顺序：
/// 1. `Failure` 直接返回 error
/// 2. `ButtonRequest` 回复 `ButtonAck` 后继续等待
/// 3. `PinMatrixRequest` 返回 `Signal::PinRequired`
/// 4. 不在 `expected` 中的 `PassphraseRequest` 返回 `Signal::PasswordRequired`
/// 5. 与 `expected` 按顺序匹配，匹配不到返回 `UnexpectedReply`
pub fn exchange<T, M>(
    transport: &mut T,
    request: &M,
    expected: &[ReplyKind],
) -> TrezorResult<Exchanged>
where
    T: Transport + ?Sized,
    M: TrezorMessage,
{
    debug!("交换 {:?}, 期望 {:?}", M::MESSAGE_TYPE, expected);
    send(transport, request)?;

    loop {
        let reply = read_message(transport)?;

        match MessageType::from_u16(reply.msg_type) {
            Some(MessageType::Failure) => {
                let failure = Failure::from_bytes(&reply.payload)?;
                warn!("⚠️ 设备返回 Failure: {:?}", failure.message);
                return Err(TrezorError::Failure(failure.kind()));
            }
            Some(MessageType::ButtonRequest) => {
                info!("请在 Trezor 设备上确认操作...");
                send(transport, &ButtonAck::default())?;
                continue;
            }
            Some(MessageType::PinMatrixRequest) => {
                debug!("设备需要 PIN");
                return Ok(Exchanged::Signal(Signal::PinRequired));
            }
            Some(MessageType::PassphraseRequest)
                if !expected.contains(&ReplyKind::PassphraseRequest) =>
            {
                debug!("设备需要 passphrase");
                return Ok(Exchanged::Signal(Signal::PasswordRequired));
            }
            _ => {}
        }

        let matched = expected
            .iter()
            .position(|kind| kind.message_type().tag() == reply.msg_type);

        return match matched {
            Some(index) => Ok(Exchanged::Matched {
                index,
                reply: expected[index].decode(&reply.payload)?,
            }),
            None => Err(TrezorError::UnexpectedReply {
                expected: expected.iter().map(|k| format!("{:?}", k)).collect(),
                received: reply.msg_type,
            }),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::FailureKind;
    use crate::hardware::trezor::messages::{ButtonRequest, Ping, PinMatrixRequest};
    use crate::hardware::trezor::mock::ScriptedTransport;
    use pretty_assertions::assert_eq;

    fn ping() -> Ping {
        Ping {
            message: Some("hello".to_string()),
            button_protection: None,
        }
    }

    #[test]
    fn test_button_request_is_acknowledged() {
        let mut transport = ScriptedTransport::new();
        transport.push_reply(&ButtonRequest { code: Some(8) }).unwrap();
        transport.push_reply(&Success::default()).unwrap();

        let result = exchange(&mut transport, &ping(), &[ReplyKind::Success]).unwrap();

        assert_eq!(result.signal(), Signal::None);
        assert_eq!(result.index(), Some(0));
        assert_eq!(
            transport.written_types(),
            vec![MessageType::Ping.tag(), MessageType::ButtonAck.tag()]
        );
    }

    #[test]
    fn test_pin_matrix_request_is_signal() {
        let mut transport = ScriptedTransport::new();
        transport.push_reply(&PinMatrixRequest { r#type: Some(1) }).unwrap();

        let result = exchange(&mut transport, &ping(), &[ReplyKind::Success]).unwrap();

        assert_eq!(result, Exchanged::Signal(Signal::PinRequired));
        assert_eq!(result.index(), None);
    }

    #[test]
    fn test_passphrase_request_signal_only_when_unexpected() {
        let mut transport = ScriptedTransport::new();
        transport.push_reply(&PassphraseRequest::default()).unwrap();
        let result = exchange(&mut transport, &ping(), &[ReplyKind::Success]).unwrap();
        assert_eq!(result.signal(), Signal::PasswordRequired);

        let mut transport = ScriptedTransport::new();
        transport.push_reply(&PassphraseRequest::default()).unwrap();
        let result = exchange(
            &mut transport,
            &ping(),
            &[ReplyKind::Success, ReplyKind::PassphraseRequest],
        )
        .unwrap();
        assert_eq!(result.index(), Some(1));
        assert_eq!(result.signal(), Signal::None);
    }

    #[test]
    fn test_failure_is_terminal() {
        let mut transport = ScriptedTransport::new();
        transport
            .push_reply(&Failure {
                code: Some(7),
                message: Some("PIN invalid".to_string()),
            })
            .unwrap();

        let err = exchange(&mut transport, &ping(), &[ReplyKind::Success]).unwrap_err();
        assert!(matches!(err, TrezorError::Failure(FailureKind::PinInvalid)));
    }

    #[test]
    fn test_unexpected_reply() {
        let mut transport = ScriptedTransport::new();
        transport.push_reply(&Success::default()).unwrap();

        let err = exchange(&mut transport, &ping(), &[ReplyKind::Address]).unwrap_err();
        match err {
            TrezorError::UnexpectedReply { expected, received } => {
                assert_eq!(expected, vec!["Address".to_string()]);
                assert_eq!(received, MessageType::Success.tag());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_matches_first_expected_entry() {
        let mut transport = ScriptedTransport::new();
        transport
            .push_reply(&Address {
                address: "1BoatSLRHtKNngkdXEeobR76b53LETtpyT".to_string(),
            })
            .unwrap();

        let result = exchange(
            &mut transport,
            &ping(),
            &[ReplyKind::Success, ReplyKind::Address],
        )
        .unwrap();

        assert_eq!(
            result,
            Exchanged::Matched {
                index: 1,
                reply: Reply::Address(Address {
                    address: "1BoatSLRHtKNngkdXEeobR76b53LETtpyT".to_string()
                }),
            }
        );
    }

    #[test]
    fn test_corrupt_reply_is_framing_error() {
        let mut transport = ScriptedTransport::new();
        let mut report = [0u8; 64];
        report[0] = 0x3f;
        report[1] = 0x42;
        transport.push_report(report);

        let err = exchange(&mut transport, &ping(), &[ReplyKind::Success]).unwrap_err();
        assert!(matches!(err, TrezorError::Framing(_)));
    }
}
