//! Trezor 协议集成测试
//!
//! 使用脚本化传输模拟设备应答，不需要实际的 Trezor 设备

use pretty_assertions::assert_eq;
use trezor_link::hardware::trezor::messages::{
    Address, ButtonRequest, EthereumAddress, Failure, Features, MessageType, PassphraseRequest,
    PinMatrixAck, PinMatrixRequest, PublicKey, Success, TrezorMessage,
};
use trezor_link::hardware::trezor::mock::{ScriptedEntry, ScriptedTransport};
use trezor_link::{EntryKind, FailureKind, TrezorDevice, TrezorError};

fn features() -> Features {
    Features {
        vendor: Some("trezor.io".to_string()),
        major_version: Some(1),
        minor_version: Some(11),
        patch_version: Some(2),
        label: Some("Savings".to_string()),
        initialized: Some(true),
        pin_protection: Some(true),
        ..Default::default()
    }
}

/// 已完成握手的脚本化传输
fn scripted() -> ScriptedTransport {
    let mut transport = ScriptedTransport::new();
    transport.push_reply(&features()).unwrap();
    transport
}

fn tags(types: &[MessageType]) -> Vec<u16> {
    types.iter().map(|t| t.tag()).collect()
}

#[test]
fn test_open_reads_firmware_and_label() {
    let mut transport = scripted();
    let device = TrezorDevice::from_transport(&mut transport, ScriptedEntry::default()).unwrap();

    assert_eq!(device.firmware(), [1, 11, 2]);
    assert_eq!(device.label(), "Savings");
    device.close();

    assert_eq!(transport.pending_reports(), 0);
}

#[test]
fn test_button_confirmation_is_transparent() {
    let mut transport = scripted();
    transport.push_reply(&ButtonRequest { code: Some(8) }).unwrap();
    transport
        .push_reply(&Address {
            address: "1BoatSLRHtKNngkdXEeobR76b53LETtpyT".to_string(),
        })
        .unwrap();

    let mut entry = ScriptedEntry::default();
    {
        let mut device = TrezorDevice::from_transport(&mut transport, &mut entry).unwrap();
        let address = device.get_address("m/44'/0'/0'/0/0", "btc", "P2PKH").unwrap();
        assert_eq!(address, "1BoatSLRHtKNngkdXEeobR76b53LETtpyT");
    }

    assert!(entry.asked().is_empty());
    assert_eq!(
        transport.written_types(),
        tags(&[
            MessageType::Initialize,
            MessageType::GetAddress,
            MessageType::ButtonAck
        ])
    );
}

#[test]
fn test_empty_pin_stops_everything() {
    let mut transport = scripted();
    transport.push_reply(&PinMatrixRequest::default()).unwrap();

    let err = {
        let mut device =
            TrezorDevice::from_transport(&mut transport, ScriptedEntry::new([""])).unwrap();
        device.get_xpub("m/44'/0'/0'", "btc", "").unwrap_err()
    };

    assert!(matches!(err, TrezorError::SecretAbandoned(EntryKind::Pin)));
    assert!(err.is_user_abort());
    assert_eq!(
        transport.written_types(),
        tags(&[MessageType::Initialize, MessageType::GetPublicKey])
    );
}

#[test]
fn test_pin_unlock_reissues_request() {
    let mut transport = scripted();
    transport.push_reply(&PinMatrixRequest::default()).unwrap();
    transport.push_reply(&Success::default()).unwrap();
    transport
        .push_reply(&PublicKey {
            xpub: "xpub6BosfCnifzxcFwrSzQiqu2DBVTshkCXacvNsWGYJVVhhawA7d4R5WSWGFNbi8Aw6ZRc1brxMyWMzG3DSSSSoekkudhUd9yLb6qx39T9nMdj".to_string(),
        })
        .unwrap();

    let mut entry = ScriptedEntry::new(["7391"]);
    {
        let mut device = TrezorDevice::from_transport(&mut transport, &mut entry).unwrap();
        let xpub = device.get_xpub("m/44'/0'/0'", "btc", "").unwrap();
        assert!(xpub.starts_with("xpub6Bosf"));
    }

    assert_eq!(entry.asked(), &[EntryKind::Pin]);

    let written = transport.written_messages();
    assert_eq!(
        written.iter().map(|m| m.msg_type).collect::<Vec<_>>(),
        tags(&[
            MessageType::Initialize,
            MessageType::GetPublicKey,
            MessageType::PinMatrixAck,
            MessageType::GetPublicKey,
        ])
    );
    let ack = PinMatrixAck::from_bytes(&written[2].payload).unwrap();
    assert_eq!(ack.pin.as_str(), "7391");
    assert_eq!(written[1], written[3]);
}

#[test]
fn test_wrong_pin_is_reported() {
    let mut transport = scripted();
    transport.push_reply(&PinMatrixRequest::default()).unwrap();
    transport
        .push_reply(&Failure {
            code: Some(7),
            message: Some("PIN invalid".to_string()),
        })
        .unwrap();

    let mut device =
        TrezorDevice::from_transport(&mut transport, ScriptedEntry::new(["1111"])).unwrap();
    let err = device.unlock().unwrap_err();

    assert!(matches!(err, TrezorError::Failure(FailureKind::PinInvalid)));
    assert!(err.is_pin_rejected());
}

#[test]
fn test_passphrase_flow() {
    let mut transport = scripted();
    transport.push_reply(&PassphraseRequest::default()).unwrap();
    transport.push_reply(&Success::default()).unwrap();
    transport
        .push_reply(&EthereumAddress {
            old_address: None,
            address: Some("0x9858EfFD232B4033E47d90003D41EC34EcaEda94".to_string()),
        })
        .unwrap();

    let mut entry = ScriptedEntry::new(["TREZOR"]);
    {
        let mut device = TrezorDevice::from_transport(&mut transport, &mut entry).unwrap();
        let address = device.get_address("m/44'/60'/0'/0/0", "eth", "").unwrap();
        assert_eq!(address, "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");
    }

    assert_eq!(entry.asked(), &[EntryKind::Passphrase]);
    assert_eq!(
        transport.written_types(),
        tags(&[
            MessageType::Initialize,
            MessageType::EthereumGetAddress,
            MessageType::PassphraseAck,
            MessageType::EthereumGetAddress,
        ])
    );
}

#[test]
fn test_bitcoin_cash_prefix_stripped_only_at_start() {
    let mut transport = scripted();
    transport
        .push_reply(&Address {
            address: "bitcoincash:qr95sy3j9xwd2ap32xkykttr4cvcu7as4y0qverfuy".to_string(),
        })
        .unwrap();
    transport
        .push_reply(&Address {
            address: "qr95bitcoincash:sy3j9".to_string(),
        })
        .unwrap();

    let mut device =
        TrezorDevice::from_transport(&mut transport, ScriptedEntry::default()).unwrap();

    let first = device.get_address("m/44'/145'/0'/0/0", "bch", "").unwrap();
    assert_eq!(first, "qr95sy3j9xwd2ap32xkykttr4cvcu7as4y0qverfuy");

    let second = device.get_address("m/44'/145'/0'/0/1", "bch", "").unwrap();
    assert_eq!(second, "qr95bitcoincash:sy3j9");
}

#[test]
fn test_unknown_coin_never_reaches_device() {
    let mut transport = scripted();
    {
        let mut device =
            TrezorDevice::from_transport(&mut transport, ScriptedEntry::default()).unwrap();
        let err = device.get_address("m/44'/0'/0'/0/0", "BTC", "").unwrap_err();
        assert!(matches!(err, TrezorError::UnknownCoin(_)));
    }
    assert_eq!(transport.written_types(), tags(&[MessageType::Initialize]));
}

#[test]
fn test_unexpected_reply_is_error() {
    let mut transport = scripted();
    transport.push_reply(&Success::default()).unwrap();

    let mut device =
        TrezorDevice::from_transport(&mut transport, ScriptedEntry::default()).unwrap();
    let err = device.get_address("m/44'/0'/0'/0/0", "btc", "").unwrap_err();

    assert_eq!(err.to_string(), "expected reply types [\"Address\"], got Success");
}

#[test]
fn test_device_gone_is_retryable() {
    let mut transport = scripted();
    let mut device =
        TrezorDevice::from_transport(&mut transport, ScriptedEntry::default()).unwrap();

    // 脚本用尽，相当于读超时
    let err = device.ping("hello").unwrap_err();
    assert!(err.is_retryable());
}
