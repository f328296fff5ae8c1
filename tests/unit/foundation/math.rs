use super::*;

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn pow2_detection() {
    assert!(is_pow2(1));
    assert!(is_pow2(64));
    assert!(!is_pow2(0));
    assert!(!is_pow2(96));
}

#[test]
fn unit_to_u8_clamps() {
    assert_eq!(unit_to_u8(-1.0), 0);
    assert_eq!(unit_to_u8(0.5), 128);
    assert_eq!(unit_to_u8(3.0), 255);
}
