//! Trezor USB 帧编解码
//!
//! 每个 USB 报告固定 64 字节：report ID `0x3f` + 63 字节数据。
//! 消息的第一个报告带 8 字节头：`0x23 0x23 | type (u16 BE) | len (u32 BE)`，
//! 所以第一个报告最多携带 55 字节 payload，后续报告每个 63 字节。

use crate::core::errors::{TrezorError, TrezorResult};
use tracing::trace;

/// USB 报告大小
pub const REPORT_SIZE: usize = 64;

/// Trezor 报告 ID
pub const REPORT_ID: u8 = 0x3f;

/// 消息头魔术字节
pub const HEADER_MAGIC: [u8; 2] = [0x23, 0x23];

/// 消息头长度（魔术 + 类型 + 长度）
pub const HEADER_LEN: usize = 8;

/// 每个报告的数据部分
const CHUNK_SIZE: usize = REPORT_SIZE - 1;

/// 预分配上限，避免设备声明的超大长度直接触发大内存分配
const MAX_PREALLOC: usize = 64 * 1024;

pub type Report = [u8; REPORT_SIZE];

/// 一条完整的消息（类型 + protobuf payload）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub msg_type: u16,
    pub payload: Vec<u8>,
}

impl RawMessage {
    pub fn new(msg_type: u16, payload: Vec<u8>) -> Self {
        Self { msg_type, payload }
    }
}

/// 编码为 USB 报告序列
///
/// 空 payload 也会产生一个只带头的报告。
pub fn encode(msg_type: u16, payload: &[u8]) -> Vec<Report> {
    let mut data = Vec::with_capacity(HEADER_LEN + payload.len());
    data.extend_from_slice(&HEADER_MAGIC);
    data.extend_from_slice(&msg_type.to_be_bytes());
    data.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    data.extend_from_slice(payload);

    let reports: Vec<Report> = data
        .chunks(CHUNK_SIZE)
        .map(|chunk| {
            let mut report = [0u8; REPORT_SIZE];
            report[0] = REPORT_ID;
            report[1..1 + chunk.len()].copy_from_slice(chunk);
            report
        })
        .collect();

    trace!(
        "编码消息 type={} len={} -> {} 个报告",
        msg_type,
        payload.len(),
        reports.len()
    );
    reports
}

/// 增量解码器：每次喂入一个报告，凑齐声明长度后返回完整消息
#[derive(Debug, Default)]
pub struct ReportDecoder {
    msg_type: u16,
    expected_len: usize,
    payload: Vec<u8>,
    started: bool,
}

impl ReportDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 是否已经收到第一个报告
    pub fn in_progress(&self) -> bool {
        self.started
    }

    /// 喂入一个报告
    ///
    /// 消息完整时返回 `Some`，解码器随即复位，可以解下一条消息。
    pub fn push(&mut self, report: &Report) -> TrezorResult<Option<RawMessage>> {
        if report[0] != REPORT_ID {
            return Err(TrezorError::Framing(format!(
                "invalid report id {:#04x}",
                report[0]
            )));
        }

        let data = if self.started {
            &report[1..]
        } else {
            if report[1..3] != HEADER_MAGIC {
                return Err(TrezorError::Framing(format!(
                    "invalid header magic {}",
                    hex::encode(&report[1..3])
                )));
            }
            self.msg_type = u16::from_be_bytes([report[3], report[4]]);
            self.expected_len =
                u32::from_be_bytes([report[5], report[6], report[7], report[8]]) as usize;
            self.payload = Vec::with_capacity(self.expected_len.min(MAX_PREALLOC));
            self.started = true;
            &report[1 + HEADER_LEN..]
        };

        let needed = self.expected_len - self.payload.len();
        self.payload.extend_from_slice(&data[..needed.min(data.len())]);

        if self.payload.len() < self.expected_len {
            return Ok(None);
        }

        self.started = false;
        Ok(Some(RawMessage {
            msg_type: self.msg_type,
            payload: std::mem::take(&mut self.payload),
        }))
    }
}

/// 从完整的报告序列解码一条消息
///
/// 报告用尽而长度未满时返回 `Framing` error。多余的报告被忽略。
pub fn decode<'a, I>(reports: I) -> TrezorResult<RawMessage>
where
    I: IntoIterator<Item = &'a Report>,
{
    let mut decoder = ReportDecoder::new();
    for report in reports {
        if let Some(message) = decoder.push(report)? {
            return Ok(message);
        }
    }
    Err(TrezorError::Framing(if decoder.in_progress() {
        "report stream ended before the declared length".to_string()
    } else {
        "empty report stream".to_string()
    }))
}
