//! Property tests for validation and decoding

use airq_protocol::{decode, validate, ErrorKind, Frame, ProtocolVariant, Variant, M702, N702B};
use proptest::prelude::*;

/// Build a well-formed frame for `protocol` with the given field bytes
fn build_frame(protocol: &ProtocolVariant, fill: &[u8]) -> Vec<u8> {
    let mut frame = vec![0u8; protocol.frame_len];
    frame[..protocol.header.len()].copy_from_slice(protocol.header);
    for (slot, &b) in frame[protocol.header.len()..protocol.checksum.covered]
        .iter_mut()
        .zip(fill)
    {
        *slot = b;
    }
    if let Some(trailer) = protocol.trailer {
        frame[protocol.frame_len - 1] = trailer;
    }
    protocol.checksum.write(&mut frame);
    frame
}

fn variant() -> impl Strategy<Value = Variant> {
    prop_oneof![Just(Variant::M702), Just(Variant::N702B)]
}

proptest! {
    #[test]
    fn short_sequences_are_length_mismatch(
        variant in variant(),
        bytes in prop::collection::vec(any::<u8>(), 0..17),
    ) {
        let protocol = variant.protocol();
        prop_assume!(bytes.len() < protocol.frame_len);
        prop_assert_eq!(validate(protocol, &bytes), Err(ErrorKind::LengthMismatch));
    }

    #[test]
    fn well_formed_frames_validate(
        variant in variant(),
        fill in prop::collection::vec(any::<u8>(), 14),
    ) {
        let protocol = variant.protocol();
        let frame = build_frame(protocol, &fill);
        prop_assert_eq!(validate(protocol, &frame), Ok(()));
    }

    #[test]
    fn corrupted_checksum_is_rejected(
        variant in variant(),
        fill in prop::collection::vec(any::<u8>(), 14),
        flip in 1u8..=255,
    ) {
        let protocol = variant.protocol();
        let mut frame = build_frame(protocol, &fill);
        frame[protocol.checksum.offset] ^= flip;
        prop_assert_eq!(validate(protocol, &frame), Err(ErrorKind::ChecksumMismatch));
    }

    #[test]
    fn decode_is_deterministic(
        variant in variant(),
        fill in prop::collection::vec(any::<u8>(), 14),
    ) {
        let protocol = variant.protocol();
        let bytes = build_frame(protocol, &fill);
        let a = decode(&Frame::new(&bytes, 0).unwrap().validate(protocol).unwrap());
        let b = decode(&Frame::new(&bytes, 99).unwrap().validate(protocol).unwrap());
        prop_assert_eq!(a, b);
        prop_assert_eq!(a.len(), 7);
    }

    #[test]
    fn n702b_tenths_scale(temp in -400i16..=850, humidity in 0u16..=1000) {
        let mut fill = [0u8; 14];
        fill[10..12].copy_from_slice(&temp.to_be_bytes());
        fill[12..14].copy_from_slice(&humidity.to_be_bytes());
        let bytes = build_frame(&N702B, &fill);
        let reading = decode(&Frame::new(&bytes, 0).unwrap().validate(&N702B).unwrap());

        let t = reading.get(airq_protocol::Quantity::Temperature).unwrap();
        let h = reading.get(airq_protocol::Quantity::Humidity).unwrap();
        prop_assert!((t - temp as f32 / 10.0).abs() < 1e-4);
        prop_assert!((h - humidity as f32 / 10.0).abs() < 1e-4);
    }
}

#[test]
fn m702_checksum_is_byte_sum() {
    // eCO2 400, O3 10, TVOC 100, PM2.5 12, PM10 20, 23.45 °C, 48.05 %
    let fill = [
        0x01, 0x90, 0x00, 0x0A, 0x00, 0x64, 0x00, 0x0C, 0x00, 0x14, 0x17, 0x2D, 0x30, 0x05,
    ];
    let bytes = build_frame(&M702, &fill);
    assert_eq!(bytes.len(), 17);
    assert_eq!(bytes[16], bytes[..16].iter().fold(0u8, |a, &b| a.wrapping_add(b)));
    assert_eq!(validate(&M702, &bytes), Ok(()));
}
