//! 解锁状态机
//!
//! 发送原始请求；设备要求 PIN 或 passphrase 时向user询问，确认后重新发送原始请求。
//! 部分固件在确认后直接继续挂起的调用并返回原始应答，这种应答直接作为最终结果。
//!
//! ```text
//! AwaitingRequest --PinRequired--> AwaitingPin --PassphraseRequest--> AwaitingPassword
//!        ^                              |                                  |
//!        +----------- Success ----------+-------------- Success -----------+
//! AwaitingRequest --matched--> Done
//! ```

use super::exchange::{exchange, Exchanged, Reply, ReplyKind, Signal};
use super::messages::{PassphraseAck, PinMatrixAck, TrezorMessage};
use super::pin_entry::{EntryKind, PinEntry};
use super::transport::Transport;
use crate::core::errors::{TrezorError, TrezorResult};
use tracing::{debug, info, warn};

/// 原始请求最多发送的次数（含 PIN 重新输入）
pub const MAX_UNLOCK_ROUNDS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockState {
    AwaitingRequest,
    AwaitingPin,
    AwaitingPassword,
    Done,
    PinAbandoned,
    PasswordAbandoned,
    PinRejected,
}

impl UnlockState {
    pub fn is_terminal(self) -> bool {
        !matches!(
            self,
            UnlockState::AwaitingRequest | UnlockState::AwaitingPin | UnlockState::AwaitingPassword
        )
    }
}

/// 输入秘密之后的下一步
enum Step {
    Next(UnlockState),
    /// 设备直接返回了原始请求的应答
    Resumed(usize, Reply),
}

/// 对一个传输和一个输入源驱动解锁流程
pub struct Unlocker<'a, T: ?Sized, E: ?Sized> {
    transport: &'a mut T,
    entry: &'a mut E,
    state: UnlockState,
    rounds: usize,
}

impl<'a, T, E> Unlocker<'a, T, E>
where
    T: Transport + ?Sized,
    E: PinEntry + ?Sized,
{
    pub fn new(transport: &'a mut T, entry: &'a mut E) -> Self {
        Self {
            transport,
            entry,
            state: UnlockState::AwaitingRequest,
            rounds: 0,
        }
    }

    pub fn state(&self) -> UnlockState {
        self.state
    }

    /// 发送请求直到得到 `expected` 中的一个应答
    ///
    /// 返回匹配项在 `expected` 中的位置和解码后的应答。
    pub fn call<M: TrezorMessage>(
        &mut self,
        request: &M,
        expected: &[ReplyKind],
    ) -> TrezorResult<(usize, Reply)> {
        self.state = UnlockState::AwaitingRequest;
        self.rounds = 0;

        loop {
            debug!("解锁状态: {:?}", self.state);
            let step = match self.state {
                UnlockState::AwaitingRequest => {
                    self.next_round()?;
                    match exchange(&mut *self.transport, request, expected)? {
                        Exchanged::Matched { index, reply } => Step::Resumed(index, reply),
                        Exchanged::Signal(Signal::PinRequired) => {
                            Step::Next(UnlockState::AwaitingPin)
                        }
                        Exchanged::Signal(Signal::PasswordRequired) => {
                            Step::Next(UnlockState::AwaitingPassword)
                        }
                        Exchanged::Signal(Signal::None) => {
                            return Err(TrezorError::Protocol(
                                "exchange returned neither a reply nor a signal".to_string(),
                            ));
                        }
                    }
                }
                UnlockState::AwaitingPin => self.submit_pin(expected)?,
                UnlockState::AwaitingPassword => self.submit_passphrase(expected)?,
                terminal => {
                    return Err(TrezorError::Protocol(format!(
                        "unlock machine already finished in state {:?}",
                        terminal
                    )));
                }
            };

            match step {
                Step::Next(state) => self.state = state,
                Step::Resumed(index, reply) => {
                    self.state = UnlockState::Done;
                    return Ok((index, reply));
                }
            }
        }
    }

    fn next_round(&mut self) -> TrezorResult<()> {
        if self.rounds >= MAX_UNLOCK_ROUNDS {
            warn!("⚠️ 解锁超过 {} 轮仍未完成", MAX_UNLOCK_ROUNDS);
            return Err(TrezorError::Protocol(format!(
                "device still locked after {} rounds",
                MAX_UNLOCK_ROUNDS
            )));
        }
        self.rounds += 1;
        Ok(())
    }

    fn submit_pin(&mut self, expected: &[ReplyKind]) -> TrezorResult<Step> {
        info!("🔐 设备需要 PIN");
        let pin = self.entry.ask(EntryKind::Pin);
        if pin.is_empty() {
            self.state = UnlockState::PinAbandoned;
            return Err(TrezorError::SecretAbandoned(EntryKind::Pin));
        }

        let ack = PinMatrixAck { pin };
        let ack_expected = with_extra(
            expected,
            &[ReplyKind::Success, ReplyKind::PassphraseRequest],
        );
        let outcome = match exchange(&mut *self.transport, &ack, &ack_expected) {
            Err(e) if e.is_pin_rejected() => {
                warn!("⚠️ PIN 被设备拒绝: {}", e);
                self.state = UnlockState::PinRejected;
                return Err(e);
            }
            other => other?,
        };

        Ok(match outcome {
            Exchanged::Matched { index, reply } if index < expected.len() => {
                Step::Resumed(index, reply)
            }
            Exchanged::Matched {
                reply: Reply::PassphraseRequest(_),
                ..
            }
            | Exchanged::Signal(Signal::PasswordRequired) => {
                Step::Next(UnlockState::AwaitingPassword)
            }
            Exchanged::Matched { .. } => {
                info!("✅ PIN 已确认");
                Step::Next(UnlockState::AwaitingRequest)
            }
            Exchanged::Signal(Signal::PinRequired) => {
                self.next_round()?;
                Step::Next(UnlockState::AwaitingPin)
            }
            Exchanged::Signal(Signal::None) => Step::Next(UnlockState::AwaitingRequest),
        })
    }

    fn submit_passphrase(&mut self, expected: &[ReplyKind]) -> TrezorResult<Step> {
        info!("🔐 设备需要 passphrase");
        let passphrase = self.entry.ask(EntryKind::Passphrase);
        if passphrase.is_empty() {
            self.state = UnlockState::PasswordAbandoned;
            return Err(TrezorError::SecretAbandoned(EntryKind::Passphrase));
        }

        let ack = PassphraseAck {
            passphrase: Some(passphrase),
            on_device: None,
        };
        let ack_expected = with_extra(expected, &[ReplyKind::Success]);

        match exchange(&mut *self.transport, &ack, &ack_expected)? {
            Exchanged::Matched { index, reply } if index < expected.len() => {
                Ok(Step::Resumed(index, reply))
            }
            Exchanged::Matched { .. } => {
                info!("✅ passphrase 已确认");
                Ok(Step::Next(UnlockState::AwaitingRequest))
            }
            Exchanged::Signal(signal) => Err(TrezorError::Protocol(format!(
                "unexpected {:?} after passphrase acknowledgement",
                signal
            ))),
        }
    }
}

/// 原始期望列表在前（保持下标），追加尚未包含的类型
fn with_extra(expected: &[ReplyKind], extra: &[ReplyKind]) -> Vec<ReplyKind> {
    let mut kinds = expected.to_vec();
    for kind in extra {
        if !kinds.contains(kind) {
            kinds.push(*kind);
        }
    }
    kinds
}
