use crate::protocol::avbtp::{AvbtpDecodeError, CipHeader};

#[test]
fn test_markers_and_fields() {
    let mut buf = [0u8; 8];
    let mut cip = CipHeader::new_checked(&mut buf[..]).unwrap();
    cip.init_markers();
    cip.set_sid(0x3F);
    cip.set_dbs(8);
    cip.set_dbc(0xF0);
    cip.set_fmt(0x10);
    cip.set_fdf(0x02);
    cip.set_syt(0xFFFF);

    assert_eq!(buf, [0x3F, 0x08, 0x00, 0xF0, 0x90, 0x02, 0xFF, 0xFF]);

    let cip = CipHeader::new_checked(&buf[..]).unwrap();
    assert_eq!(cip.sid(), 0x3F);
    assert_eq!(cip.dbs(), 8);
    assert_eq!(cip.dbc(), 0xF0);
    assert_eq!(cip.fmt(), 0x10);
    assert_eq!(cip.fdf(), 0x02);
    assert_eq!(cip.syt(), 0xFFFF);
    assert_eq!(cip.fraction_number(), 0);
    assert_eq!(cip.qpc(), 0);
    assert!(!cip.sph());
}

#[test]
fn test_byte_two_fields() {
    let buf = [0u8, 0, 0b1010_1100, 0, 0, 0, 0, 0];
    let cip = CipHeader::new_checked(&buf[..]).unwrap();
    assert_eq!(cip.fraction_number(), 2);
    assert_eq!(cip.qpc(), 5);
    assert!(cip.sph());
}

#[test]
fn test_setters_keep_marker_bits() {
    let mut buf = [0xFFu8; 8];
    let mut cip = CipHeader::new_checked(&mut buf[..]).unwrap();
    cip.set_sid(0);
    cip.set_fmt(0);
    assert_eq!(buf[0], 0xC0);
    assert_eq!(buf[4], 0xC0);
}

#[test]
fn test_too_short() {
    assert_eq!(
        CipHeader::new_checked(&[0u8; 7][..]).unwrap_err(),
        AvbtpDecodeError::TooShort { needed: 8, have: 7 }
    );
}
