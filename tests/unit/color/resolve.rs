use super::*;

#[test]
fn keywords_ignore_case() {
    assert_eq!(resolve("RED"), Rgba8::new(255, 0, 0, 255));
    assert_eq!(resolve("red"), resolve("RED"));
    assert_eq!(resolve("RebeccaPurple"), Rgba8::new(0x66, 0x33, 0x99, 255));
    assert_eq!(resolve("grey"), resolve("gray"));
}

#[test]
fn rgba_alpha_rounds() {
    assert_eq!(resolve("rgba(10,20,30,0.5)"), Rgba8::new(10, 20, 30, 128));
    assert_eq!(resolve("rgba(1, 2, 3, 1.0)"), Rgba8::new(1, 2, 3, 255));
    assert_eq!(resolve("rgba(1,2,3,0)").a, 0);
}

#[test]
fn rgb_is_opaque_and_tolerates_spaces() {
    assert_eq!(resolve("rgb(1,2,3)"), Rgba8::new(1, 2, 3, 255));
    assert_eq!(resolve(" rgb( 40 , 50 , 60 ) "), Rgba8::new(40, 50, 60, 255));
}

#[test]
fn hex_forms() {
    assert_eq!(resolve("#112233"), Rgba8::new(0x11, 0x22, 0x33, 255));
    assert_eq!(resolve("#11223344"), Rgba8::new(0x11, 0x22, 0x33, 0x44));
    assert_eq!(resolve("#f0a"), Rgba8::new(0xff, 0x00, 0xaa, 255));
    assert_eq!(resolve("#ABCDEF"), Rgba8::new(0xab, 0xcd, 0xef, 255));
}

#[test]
fn unmatched_input_is_transparent() {
    assert_eq!(resolve("not-a-color"), Rgba8::TRANSPARENT);
    assert_eq!(resolve(""), Rgba8::TRANSPARENT);
    assert_eq!(resolve("#12"), Rgba8::TRANSPARENT);
    assert_eq!(resolve("#+12345"), Rgba8::TRANSPARENT);
    assert_eq!(resolve("rgb(1,2)"), Rgba8::TRANSPARENT);
    assert_eq!(resolve("#ééé"), Rgba8::TRANSPARENT);
}

#[test]
fn packed_and_hex_readback() {
    let c = Rgba8::from_packed(0x1122_3380);
    assert_eq!(c, Rgba8::new(0x11, 0x22, 0x33, 0x80));
    assert_eq!(c.to_packed(), 0x1122_3380);
    assert_eq!(c.to_hex_rgb(), "#112233");
}

#[test]
fn keyword_table_is_sorted_and_complete() {
    assert!(NAMED_COLORS.windows(2).all(|w| w[0].0 < w[1].0));
    assert!(NAMED_COLORS.len() >= 140);
}
