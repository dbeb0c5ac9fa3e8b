use super::*;

fn px(s: &mut DrawingSurface, x: u32, y: u32) -> [u8; 4] {
    let w = s.width();
    let p = s.pixels().unwrap().pixel((y * w + x) as usize).unwrap();
    p.to_be_bytes()
}

#[test]
fn save_restore_round_trips_state() {
    let mut s = DrawingSurface::new(4, 4).unwrap();
    let before = (s.line_width(), s.fill_color(), s.transform());

    s.save();
    s.set_line_width(3.0);
    s.set_fill_style("blue");
    s.translate(5.0, 6.0);
    s.restore();

    assert_eq!((s.line_width(), s.fill_color(), s.transform()), before);

    s.save();
    s.restore();
    assert_eq!((s.line_width(), s.fill_color(), s.transform()), before);
}

#[test]
fn restore_without_save_is_noop() {
    let mut s = DrawingSurface::new(1, 1).unwrap();
    s.set_line_width(4.0);
    s.restore();
    assert_eq!(s.line_width(), 4.0);
}

#[test]
fn defaults_match_canvas_host() {
    let s = DrawingSurface::new(1, 1).unwrap();
    assert_eq!(s.fill_color(), Rgba8::WHITE);
    assert_eq!(s.stroke_color(), Rgba8::WHITE);
    assert_eq!(s.line_width(), 10.0);
    assert_eq!(s.line_cap(), LineCap::Butt);
    assert_eq!(s.line_join(), LineJoin::Miter);
    assert_eq!(s.global_alpha(), 1.0);
    assert_eq!(s.font().to_string(), "10px sans-serif");
}

#[test]
fn fill_style_readback_is_hex_rgb() {
    let mut s = DrawingSurface::new(1, 1).unwrap();
    s.set_fill_style("#112233");
    assert_eq!(s.fill_color().to_hex_rgb(), "#112233");
    s.set_stroke_style("rgba(255,0,0,0.5)");
    assert_eq!(s.stroke_color().to_hex_rgb(), "#ff0000");
}

#[test]
fn fill_rect_covers_only_its_rectangle() {
    let mut s = DrawingSurface::new(10, 10).unwrap();
    s.set_fill_style("red");
    s.fill_rect(2.0, 2.0, 4.0, 4.0);
    assert_eq!(px(&mut s, 3, 3), [255, 0, 0, 255]);
    assert_eq!(px(&mut s, 8, 8), [0, 0, 0, 0]);
    assert_eq!(px(&mut s, 0, 0), [0, 0, 0, 0]);
}

#[test]
fn fill_rect_leaves_current_path_alone() {
    let mut s = DrawingSurface::new(6, 6).unwrap();
    s.begin_path();
    s.set_fill_style("red");
    s.fill_rect(0.0, 0.0, 6.0, 6.0);
    s.set_fill_style("blue");
    s.fill();
    assert_eq!(px(&mut s, 3, 3), [255, 0, 0, 255]);
}

#[test]
fn path_persists_after_fill() {
    let mut s = DrawingSurface::new(8, 8).unwrap();
    s.rect(0.0, 0.0, 8.0, 8.0);
    s.set_fill_style("red");
    s.fill();
    s.set_fill_style("#0000ff");
    s.fill();
    assert_eq!(px(&mut s, 4, 4), [0, 0, 255, 255]);

    s.begin_path();
    s.set_fill_style("lime");
    s.fill();
    assert_eq!(px(&mut s, 4, 4), [0, 0, 255, 255]);
}

#[test]
fn transform_moves_geometry() {
    let mut s = DrawingSurface::new(10, 4).unwrap();
    s.set_fill_style("white");
    s.translate(5.0, 0.0);
    s.fill_rect(0.0, 0.0, 2.0, 2.0);
    assert_eq!(px(&mut s, 6, 1)[3], 255);
    assert_eq!(px(&mut s, 1, 1)[3], 0);
}

#[test]
fn clear_rect_replaces_with_transparent() {
    let mut s = DrawingSurface::new(10, 10).unwrap();
    s.set_fill_style("red");
    s.fill_rect(0.0, 0.0, 10.0, 10.0);
    s.clear_rect(0.0, 0.0, 5.0, 10.0).unwrap();
    assert_eq!(px(&mut s, 2, 5), [0, 0, 0, 0]);
    assert_eq!(px(&mut s, 7, 5), [255, 0, 0, 255]);
}

#[test]
fn stroke_draws_along_the_path() {
    let mut s = DrawingSurface::new(10, 10).unwrap();
    s.set_line_width(2.0);
    s.begin_path();
    s.move_to(1.0, 5.0);
    s.line_to(9.0, 5.0);
    s.stroke();
    assert!(px(&mut s, 5, 5)[3] > 0);
    assert_eq!(px(&mut s, 5, 0)[3], 0);
}

#[test]
fn draw_image_placement_scales_each_axis() {
    let p = ImagePlacement::new(10, 10, 0.0, 0.0, 20.0, 5.0).unwrap();
    assert_eq!(p.scale_x, 2.0);
    assert_eq!(p.scale_y, 0.5);

    let p = ImagePlacement::new(10, 10, 4.0, 3.0, 20.0, 5.0).unwrap();
    assert_eq!((p.origin_x, p.origin_y), (2.0, 6.0));
    let mapped = p.transform() * Point::new(10.0, 10.0);
    assert_eq!((mapped.x, mapped.y), (24.0, 8.0));

    assert!(ImagePlacement::new(0, 10, 0.0, 0.0, 1.0, 1.0).is_none());
    assert!(ImagePlacement::new(10, 10, 0.0, 0.0, 0.0, 1.0).is_none());
}

#[test]
fn draw_image_scaled_fills_target_box() {
    let mut src = DrawingSurface::new(10, 10).unwrap();
    src.set_fill_style("red");
    src.fill_rect(0.0, 0.0, 10.0, 10.0);
    let src_px = src.snapshot().unwrap();

    let mut dst = DrawingSurface::new(20, 20).unwrap();
    dst.draw_image(
        ImageRef {
            width: 10,
            height: 10,
            data: src_px.as_bytes(),
        },
        0.0,
        0.0,
        20.0,
        5.0,
    )
    .unwrap();
    let inside = px(&mut dst, 10, 2);
    assert!(inside[3] > 200 && inside[0] > 200);
    assert_eq!(px(&mut dst, 10, 10), [0, 0, 0, 0]);
}

#[test]
fn draw_image_at_one_to_one_copies_exactly() {
    let mut src = PixelBuffer::new(2, 2).unwrap();
    src.set_pixel(0, 0x1020_30FF);
    src.set_pixel(3, 0x4050_6070);

    let mut dst = DrawingSurface::new(3, 3).unwrap();
    dst.draw_image(
        ImageRef {
            width: 2,
            height: 2,
            data: src.as_bytes(),
        },
        1.0,
        1.0,
        2.0,
        2.0,
    )
    .unwrap();
    let out = dst.pixels().unwrap();
    assert_eq!(out.pixel(4), Some(0x1020_30FF));
    assert_eq!(out.pixel(8), Some(0x4050_6070));
    assert_eq!(out.pixel(0), Some(0));
}

#[test]
fn global_alpha_ignores_out_of_range() {
    let mut s = DrawingSurface::new(1, 1).unwrap();
    s.set_global_alpha(0.5);
    s.set_global_alpha(1.5);
    s.set_global_alpha(f64::NAN);
    assert_eq!(s.global_alpha(), 0.5);
}

#[test]
fn global_alpha_scales_paint() {
    let mut s = DrawingSurface::new(4, 4).unwrap();
    s.set_global_alpha(0.0);
    s.fill_rect(0.0, 0.0, 4.0, 4.0);
    assert_eq!(px(&mut s, 2, 2), [0, 0, 0, 0]);

    s.set_global_alpha(0.5);
    s.fill_rect(0.0, 0.0, 4.0, 4.0);
    let a = px(&mut s, 2, 2)[3];
    assert!((100..=155).contains(&a), "alpha {a}");
}

#[test]
fn line_style_keywords_fail_soft() {
    assert_eq!(LineCap::parse("ROUND"), LineCap::Round);
    assert_eq!(LineCap::parse("square"), LineCap::Square);
    assert_eq!(LineCap::parse("pointy"), LineCap::Butt);
    assert_eq!(LineJoin::parse("bevel"), LineJoin::Bevel);
    assert_eq!(LineJoin::parse("zigzag"), LineJoin::Miter);
    assert_eq!(LineJoin::Round.as_str(), "round");
}

#[test]
fn bad_font_keeps_previous() {
    let mut s = DrawingSurface::new(1, 1).unwrap();
    assert!(s.set_font("24px 'Open Sans'"));
    assert_eq!(s.font().family, "Open Sans");
    assert_eq!(s.font().size_px, 24.0);
    assert!(!s.set_font("huge"));
    assert!(!s.set_font("0px serif"));
    assert!(!s.set_font("12pt serif"));
    assert_eq!(s.font().to_string(), "24px Open Sans");
}

#[test]
fn text_without_fonts_is_noop() {
    let mut fonts = Typesetter::new(FontBook::empty());
    let mut s = DrawingSurface::new(8, 8).unwrap();
    s.fill_text(&mut fonts, "hi", 0.0, 6.0).unwrap();
    s.stroke_text(&mut fonts, "hi", 0.0, 6.0).unwrap();
    assert!(s.pixels().unwrap().as_bytes().iter().all(|&b| b == 0));
}

#[test]
fn arc_sweep_follows_direction() {
    assert_eq!(arc_sweep(0.0, TAU, false), TAU);
    assert_eq!(arc_sweep(0.0, 3.0 * TAU, false), TAU);
    assert!((arc_sweep(1.0, 0.5, false) - (TAU - 0.5)).abs() < 1e-12);
    assert!((arc_sweep(0.0, 1.0, true) + (TAU - 1.0)).abs() < 1e-12);
    assert_eq!(arc_sweep(TAU, 0.0, true), -TAU);
    assert_eq!(arc_sweep(1.0, 1.0, false), 0.0);
    assert_eq!(arc_sweep(0.0, TAU, true), -TAU);
    assert_eq!(arc_sweep(TAU, 0.0, false), TAU);
}

#[test]
fn full_arc_fills_a_disc() {
    let mut s = DrawingSurface::new(20, 20).unwrap();
    s.begin_path();
    s.arc(10.0, 10.0, 8.0, 0.0, TAU);
    s.fill();
    assert_eq!(px(&mut s, 10, 10)[3], 255);
    assert_eq!(px(&mut s, 0, 0)[3], 0);
}

#[test]
fn empty_surface_accepts_every_call() {
    let mut s = DrawingSurface::new(0, 0).unwrap();
    s.fill_rect(0.0, 0.0, 5.0, 5.0);
    s.rect(0.0, 0.0, 1.0, 1.0);
    s.stroke();
    s.clear_rect(0.0, 0.0, 1.0, 1.0).unwrap();
    assert!(s.pixels().unwrap().as_bytes().is_empty());
}

#[test]
fn oversized_surface_is_rejected() {
    assert!(DrawingSurface::new(70_000, 1).is_err());
}
