use crate::protocol::avbtp::{AafFormat, nsr_for_rate, rate_for_nsr};

#[test]
fn test_nsr_table() {
    assert_eq!(rate_for_nsr(5), 48_000);
    assert_eq!(rate_for_nsr(7), 96_000);
    assert_eq!(rate_for_nsr(9), 192_000);
    assert_eq!(rate_for_nsr(4), 44_100);
    assert_eq!(rate_for_nsr(0), 0);
    assert_eq!(rate_for_nsr(0xF), 0);

    assert_eq!(nsr_for_rate(48_000), Some(5));
    assert_eq!(nsr_for_rate(176_400), Some(8));
    assert_eq!(nsr_for_rate(22_050), None);
}

#[test]
fn test_format_word() {
    let format = AafFormat::int32(5, 8);
    assert_eq!(format.to_word(), 0x0250_0820);
    assert_eq!(AafFormat::from_word(0x0250_0820), format);
    assert_eq!(format.rate(), 48_000);
}

#[test]
fn test_reserved_bits_ignored() {
    let format = AafFormat::from_word(0x027F_0220);
    assert_eq!(format.nsr, 7);
    assert_eq!(format.channels_per_frame, 0x302);
    assert_eq!(format.bit_depth, 0x20);
}
