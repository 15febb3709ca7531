//! Trezor 传输层
//!
//! 协议引擎只依赖 [`Transport`]：一次读/写一个 64 字节报告。
//! USB 实现见 [`UsbTransport`]（`usb` feature，基于 libusb）。

use super::framing::{self, RawMessage, Report, ReportDecoder, REPORT_SIZE};
use crate::core::errors::{TrezorError, TrezorResult};
use tracing::{debug, trace};

#[cfg(feature = "usb")]
use rusb::{Context, Device, DeviceDescriptor, DeviceHandle, UsbContext};
#[cfg(feature = "usb")]
use std::time::Duration;
#[cfg(feature = "usb")]
use tracing::info;

/// Trezor USB 参数（Trezor One 新固件 / Model T）
pub const TREZOR_VENDOR_ID: u16 = 0x1209;
pub const TREZOR_PRODUCT_ID: u16 = 0x53c1;

/// 报告级别的双工通道
pub trait Transport {
    /// 读取一个报告，返回读到的字节数
    fn read(&mut self, report: &mut Report) -> TrezorResult<usize>;

    /// 写入一个报告，返回写入的字节数
    fn write(&mut self, report: &Report) -> TrezorResult<usize>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn read(&mut self, report: &mut Report) -> TrezorResult<usize> {
        (**self).read(report)
    }

    fn write(&mut self, report: &Report) -> TrezorResult<usize> {
        (**self).write(report)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn read(&mut self, report: &mut Report) -> TrezorResult<usize> {
        (**self).read(report)
    }

    fn write(&mut self, report: &Report) -> TrezorResult<usize> {
        (**self).write(report)
    }
}

/// 发送一条消息（所有报告按顺序写出）
pub fn write_message<T: Transport + ?Sized>(
    transport: &mut T,
    msg_type: u16,
    payload: &[u8],
) -> TrezorResult<()> {
    let reports = framing::encode(msg_type, payload);

    debug!(
        "发送 Trezor 消息: type={}, 长度: {}, 报告数: {}",
        msg_type,
        payload.len(),
        reports.len()
    );

    for (i, report) in reports.iter().enumerate() {
        trace!("-> 报告 {}/{}: {}", i + 1, reports.len(), hex::encode(report));
        let written = transport.write(report)?;
        if written != REPORT_SIZE {
            return Err(TrezorError::Transport(format!(
                "short write: {} of {} bytes",
                written, REPORT_SIZE
            )));
        }
    }

    Ok(())
}

/// 接收一条完整消息
pub fn read_message<T: Transport + ?Sized>(transport: &mut T) -> TrezorResult<RawMessage> {
    let mut decoder = ReportDecoder::new();

    loop {
        let mut report = [0u8; REPORT_SIZE];
        let read_len = transport.read(&mut report)?;

        if read_len == 0 {
            return Err(TrezorError::Transport("接收超时".to_string()));
        }
        if read_len < REPORT_SIZE {
            return Err(TrezorError::Transport(format!(
                "short read: {} of {} bytes",
                read_len, REPORT_SIZE
            )));
        }
        trace!("<- 报告: {}", hex::encode(report));

        if let Some(message) = decoder.push(&report)? {
            debug!(
                "接收 Trezor 消息: type={}, 长度: {}",
                message.msg_type,
                message.payload.len()
            );
            return Ok(message);
        }
    }
}

/// libusb 上的 Trezor 接口参数
#[cfg(feature = "usb")]
const CONFIG_ID: u8 = 0;
#[cfg(feature = "usb")]
const INTERFACE: u8 = 0;
#[cfg(feature = "usb")]
const INTERFACE_DESCRIPTOR: u8 = 0;
#[cfg(feature = "usb")]
const LIBUSB_CLASS_VENDOR_SPEC: u8 = 0xff;
#[cfg(feature = "usb")]
const ENDPOINT_IN: u8 = 0x81;
#[cfg(feature = "usb")]
const ENDPOINT_OUT: u8 = 0x01;

/// Trezor USB 传输（interface 0 上的中断端点）
#[cfg(feature = "usb")]
pub struct UsbTransport {
    handle: DeviceHandle<Context>,
    timeout: Option<Duration>,
}

#[cfg(feature = "usb")]
impl UsbTransport {
    /// 打开唯一连接的 Trezor 设备
    ///
    /// 没有设备返回 `NoDevice`，多于一个返回 `TooManyDevices`。
    pub fn open_unique(vendor: u16, product: u16) -> TrezorResult<Self> {
        info!("正在连接 Trezor 设备...");

        let context = Context::new()?;
        let mut candidates = Vec::new();
        for device in context.devices()?.iter() {
            let descriptor = match device.device_descriptor() {
                Ok(descriptor) => descriptor,
                Err(e) => {
                    debug!("跳过无法读取描述符的 USB 设备: {}", e);
                    continue;
                }
            };
            if descriptor.vendor_id() == vendor
                && descriptor.product_id() == product
                && has_wire_interface(&device, &descriptor)
            {
                candidates.push(device);
            }
        }

        let device = match candidates.len() {
            0 => return Err(TrezorError::NoDevice { vendor, product }),
            1 => candidates.remove(0),
            many => return Err(TrezorError::TooManyDevices(many)),
        };

        let mut handle = device.open()?;
        // Linux 上接口可能被内核驱动占用
        if let Ok(true) = handle.kernel_driver_active(INTERFACE) {
            handle.detach_kernel_driver(INTERFACE)?;
        }
        handle.claim_interface(INTERFACE)?;

        info!(
            "✅ 已连接到 Trezor 设备: bus {} address {}",
            device.bus_number(),
            device.address()
        );

        Ok(Self {
            handle,
            timeout: None,
        })
    }

    /// 设置读取超时；`None` 表示一直阻塞（等待user确认）
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }
}

/// 设备的 interface 0 是否为厂商自定义类（Trezor 协议接口）
#[cfg(feature = "usb")]
fn has_wire_interface(device: &Device<Context>, descriptor: &DeviceDescriptor) -> bool {
    if descriptor.num_configurations() <= CONFIG_ID {
        return false;
    }
    let config = match device.config_descriptor(CONFIG_ID) {
        Ok(config) => config,
        Err(_) => return false,
    };
    config
        .interfaces()
        .filter(|interface| interface.number() == INTERFACE)
        .flat_map(|interface| interface.descriptors())
        .any(|d| {
            d.setting_number() == INTERFACE_DESCRIPTOR
                && d.class_code() == LIBUSB_CLASS_VENDOR_SPEC
        })
}

/// libusb 以 0 表示不限时
#[cfg(feature = "usb")]
fn libusb_timeout(timeout: Option<Duration>) -> Duration {
    timeout.unwrap_or(Duration::ZERO)
}

/// 读超时按 0 字节处理，由 `read_message` 报告
#[cfg(feature = "usb")]
fn read_outcome(result: rusb::Result<usize>) -> TrezorResult<usize> {
    match result {
        Err(rusb::Error::Timeout) => Ok(0),
        other => Ok(other?),
    }
}

#[cfg(feature = "usb")]
impl Transport for UsbTransport {
    fn read(&mut self, report: &mut Report) -> TrezorResult<usize> {
        let result = self
            .handle
            .read_interrupt(ENDPOINT_IN, report, libusb_timeout(self.timeout));
        read_outcome(result)
    }

    fn write(&mut self, report: &Report) -> TrezorResult<usize> {
        Ok(self
            .handle
            .write_interrupt(ENDPOINT_OUT, report, libusb_timeout(self.timeout))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::trezor::mock::ScriptedTransport;
    use pretty_assertions::assert_eq;

    /// 每次读只返回部分字节
    struct ShortReads;

    impl Transport for ShortReads {
        fn read(&mut self, _report: &mut Report) -> TrezorResult<usize> {
            Ok(10)
        }

        fn write(&mut self, _report: &Report) -> TrezorResult<usize> {
            Ok(3)
        }
    }

    #[test]
    fn test_vendor_and_product_ids() {
        assert_eq!(TREZOR_VENDOR_ID, 0x1209);
        assert_eq!(TREZOR_PRODUCT_ID, 0x53c1);
    }

    #[cfg(feature = "usb")]
    #[test]
    fn test_wire_interface_endpoints() {
        assert_eq!(INTERFACE, 0);
        assert_eq!(ENDPOINT_IN, 0x81);
        assert_eq!(ENDPOINT_OUT, 0x01);
        assert_eq!(LIBUSB_CLASS_VENDOR_SPEC, 0xff);
    }

    #[cfg(feature = "usb")]
    #[test]
    fn test_no_timeout_blocks_forever() {
        assert_eq!(libusb_timeout(None), Duration::ZERO);
        assert_eq!(
            libusb_timeout(Some(Duration::from_millis(1500))),
            Duration::from_millis(1500)
        );
    }

    #[cfg(feature = "usb")]
    #[test]
    fn test_usb_read_timeout_is_empty_read() {
        assert_eq!(read_outcome(Err(rusb::Error::Timeout)).unwrap(), 0);
        assert_eq!(read_outcome(Ok(64)).unwrap(), 64);

        let err = read_outcome(Err(rusb::Error::NoDevice)).unwrap_err();
        assert!(matches!(err, TrezorError::Transport(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_write_then_read_message() {
        let mut transport = ScriptedTransport::new();
        transport.push_raw(30, vec![0x0A, 0x01, b'x']);

        write_message(&mut transport, 29, &[0x08, 0x01]).unwrap();
        let reply = read_message(&mut transport).unwrap();

        assert_eq!(reply, RawMessage::new(30, vec![0x0A, 0x01, b'x']));
        assert_eq!(
            transport.written_messages(),
            vec![RawMessage::new(29, vec![0x08, 0x01])]
        );
    }

    #[test]
    fn test_empty_transport_read_times_out() {
        let mut transport = ScriptedTransport::new();
        let err = read_message(&mut transport).unwrap_err();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_short_reads_and_writes_are_transport_errors() {
        assert!(matches!(
            read_message(&mut ShortReads),
            Err(TrezorError::Transport(_))
        ));
        assert!(matches!(
            write_message(&mut ShortReads, 1, &[]),
            Err(TrezorError::Transport(_))
        ));
    }
}
