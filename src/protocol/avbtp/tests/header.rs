use crate::protocol::avbtp::{AvbtpDecodeError, AvbtpHeader};

fn sample_header() -> AvbtpHeader<[u8; 24]> {
    let mut header = AvbtpHeader::zeroed();
    header.set_subtype(0x02);
    header.set_sv(true);
    header.set_tv(true);
    header.set_sequence_number(0xAB);
    header.set_stream_id(0x0011_2233_4455_6677);
    header.set_timestamp(0xDEAD_BEEF);
    header.set_format_specific(0x0250_0820);
    header.set_stream_data_length(48);
    header
}

#[test]
fn test_field_layout() {
    let bytes = sample_header().encode();

    assert_eq!(bytes[0], 0x02);
    assert_eq!(bytes[1], 0x81);
    assert_eq!(bytes[2], 0xAB);
    assert_eq!(
        &bytes[4..12],
        &[0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77]
    );
    assert_eq!(&bytes[12..16], &[0xDE, 0xAD, 0xBE, 0xEF]);
    assert_eq!(&bytes[16..20], &[0x02, 0x50, 0x08, 0x20]);
    assert_eq!(&bytes[20..22], &[0x00, 0x30]);
}

#[test]
fn test_decode_reads_fields() {
    let decoded = AvbtpHeader::decode(&sample_header().encode()).unwrap();

    assert_eq!(decoded.subtype(), 0x02);
    assert!(decoded.sv());
    assert!(decoded.tv());
    assert!(!decoded.mr());
    assert!(!decoded.gv());
    assert!(!decoded.tu());
    assert_eq!(decoded.version(), 0);
    assert_eq!(decoded.sequence_number(), 0xAB);
    assert_eq!(decoded.stream_id(), 0x0011_2233_4455_6677);
    assert_eq!(decoded.timestamp(), 0xDEAD_BEEF);
    assert_eq!(decoded.format_specific(), 0x0250_0820);
    assert_eq!(decoded.stream_data_length(), 48);
    assert_eq!(decoded.protocol_specific(), 0);
}

#[test]
fn test_flags_are_independent() {
    let mut header = AvbtpHeader::zeroed();
    header.set_mr(true);
    header.set_gv(true);
    header.set_version(5);
    header.set_tu(true);

    assert!(header.mr());
    assert!(header.gv());
    assert!(!header.sv());
    assert!(!header.tv());
    assert_eq!(header.version(), 5);
    assert!(header.tu());

    header.set_gv(false);
    header.set_version(0);
    assert!(header.mr());
    assert!(!header.gv());
    assert_eq!(header.version(), 0);
}

#[test]
fn test_version_is_three_bits() {
    let mut header = AvbtpHeader::zeroed();
    header.set_sv(true);
    header.set_version(0xFF);
    assert_eq!(header.version(), 7);
    assert!(header.sv());
}

#[test]
fn test_stream_id_low_keeps_high_half() {
    let mut header = AvbtpHeader::zeroed();
    header.set_stream_id(0x1111_2222_3333_4444);
    header.set_stream_id_low(0x5555_6666);
    assert_eq!(header.stream_id(), 0x1111_2222_5555_6666);
}

#[test]
fn test_decode_too_short() {
    assert_eq!(
        AvbtpHeader::decode(&[0u8; 23]),
        Err(AvbtpDecodeError::TooShort {
            needed: 24,
            have: 23
        })
    );
}

#[test]
fn test_view_over_longer_buffer() {
    let mut buf = vec![0u8; 64];
    let mut view = AvbtpHeader::new_checked(&mut buf[..]).unwrap();
    view.set_sequence_number(9);
    view.set_stream_data_length(40);

    assert_eq!(buf[2], 9);
    assert_eq!(buf[21], 40);
    assert!(buf[24..].iter().all(|&b| b == 0));
}

#[test]
fn test_conformance() {
    let mut header = sample_header();
    assert!(header.check_conformance().is_ok());

    header.set_version(1);
    assert_eq!(
        header.check_conformance(),
        Err(AvbtpDecodeError::UnsupportedVersion(1))
    );

    header.set_version(0);
    header.set_sv(false);
    assert_eq!(
        header.check_conformance(),
        Err(AvbtpDecodeError::StreamIdNotValid)
    );
}
