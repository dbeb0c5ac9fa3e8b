use super::*;

#[test]
fn strided_copy_drops_row_padding() {
    // 2x2 image, 12-byte stride (4 bytes of padding per row).
    let mut src = Vec::new();
    src.extend_from_slice(&[1, 1, 1, 1, 2, 2, 2, 2, 0xEE, 0xEE, 0xEE, 0xEE]);
    src.extend_from_slice(&[3, 3, 3, 3, 4, 4, 4, 4]);

    let buf = PixelBuffer::from_strided(2, 2, 12, &src).unwrap();
    assert_eq!(buf.stride(), 8);
    assert_eq!(
        buf.as_bytes(),
        &[1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4]
    );
}

#[test]
fn strided_copy_rejects_short_stride_and_short_input() {
    assert!(PixelBuffer::from_strided(4, 1, 8, &[0; 16]).is_err());
    assert!(PixelBuffer::from_strided(2, 2, 8, &[0; 15]).is_err());
    assert!(PixelBuffer::from_strided(0, 0, 0, &[]).is_ok());
}

#[test]
fn pixel_packing_is_rrggbbaa() {
    let mut buf = PixelBuffer::new(2, 1).unwrap();
    assert!(buf.set_pixel(1, 0x1122_33FF));
    assert_eq!(&buf.as_bytes()[4..8], &[0x11, 0x22, 0x33, 0xFF]);
    assert_eq!(buf.pixel(1), Some(0x1122_33FF));
    assert_eq!(buf.pixel(2), None);
    assert!(!buf.set_pixel(2, 0));
}

#[test]
fn replace_bytes_requires_exact_length() {
    let mut buf = PixelBuffer::new(1, 1).unwrap();
    assert!(buf.replace_bytes(&[1, 2, 3]).is_err());
    buf.replace_bytes(&[9, 8, 7, 6]).unwrap();
    assert_eq!(buf.as_bytes(), &[9, 8, 7, 6]);
}
