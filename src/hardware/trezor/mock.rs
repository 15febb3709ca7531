//! 脚本化的传输与输入，用于无硬件测试
//!
//! `ScriptedTransport` 按顺序回放预先排好的设备应答，并记录主机写出的所有报告。

use super::framing::{self, RawMessage, Report, ReportDecoder, REPORT_SIZE};
use super::messages::TrezorMessage;
use super::pin_entry::{EntryKind, PinEntry};
use super::transport::Transport;
use crate::core::errors::TrezorResult;
use std::collections::VecDeque;
use zeroize::Zeroizing;

/// 回放设备应答的传输
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: VecDeque<Report>,
    written: Vec<Report>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 排入一条设备应答
    pub fn push_reply<M: TrezorMessage>(&mut self, message: &M) -> TrezorResult<()> {
        let payload = message.to_bytes()?;
        self.push_raw(M::MESSAGE_TYPE.tag(), payload);
        Ok(())
    }

    /// 排入任意类型标签的应答
    pub fn push_raw(&mut self, msg_type: u16, payload: Vec<u8>) {
        self.replies.extend(framing::encode(msg_type, &payload));
    }

    /// 排入原始报告（用于构造损坏的帧）
    pub fn push_report(&mut self, report: Report) {
        self.replies.push_back(report);
    }

    /// 尚未被读取的报告数
    pub fn pending_reports(&self) -> usize {
        self.replies.len()
    }

    /// 主机写出的原始报告
    pub fn written_reports(&self) -> &[Report] {
        &self.written
    }

    /// 把主机写出的报告重组为消息
    pub fn written_messages(&self) -> Vec<RawMessage> {
        let mut decoder = ReportDecoder::new();
        self.written
            .iter()
            .filter_map(|report| decoder.push(report).ok().flatten())
            .collect()
    }

    /// 主机写出的消息类型序列
    pub fn written_types(&self) -> Vec<u16> {
        self.written_messages()
            .into_iter()
            .map(|m| m.msg_type)
            .collect()
    }
}

impl Transport for ScriptedTransport {
    /// 脚本用尽时返回 0，相当于读超时
    fn read(&mut self, report: &mut Report) -> TrezorResult<usize> {
        match self.replies.pop_front() {
            Some(next) => {
                *report = next;
                Ok(REPORT_SIZE)
            }
            None => Ok(0),
        }
    }

    fn write(&mut self, report: &Report) -> TrezorResult<usize> {
        self.written.push(*report);
        Ok(REPORT_SIZE)
    }
}

/// 回放预设答案的输入；答案用尽后返回空字符串（放弃）
#[derive(Debug, Default)]
pub struct ScriptedEntry {
    answers: VecDeque<String>,
    asked: Vec<EntryKind>,
}

impl ScriptedEntry {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// 被询问过的秘密类型，按顺序
    pub fn asked(&self) -> &[EntryKind] {
        &self.asked
    }
}

impl PinEntry for ScriptedEntry {
    fn ask(&mut self, kind: EntryKind) -> Zeroizing<String> {
        self.asked.push(kind);
        Zeroizing::new(self.answers.pop_front().unwrap_or_default())
    }
}
