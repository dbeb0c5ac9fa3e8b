use std::cell::RefCell;
use std::rc::Rc;

use rhai::Engine;

use crate::bridge::{Arena, ClassRegistry, Handle, ParamType, Value};
use crate::color::{self, Rgba8};
use crate::foundation::config::HostConfig;
use crate::foundation::error::HostResult;
use crate::frame::{Frame, pixel_view};
use crate::surface::{DrawingSurface, ImageRef, LineCap, LineJoin, Typesetter};

/// Script name of the frame class.
pub const FRAME_CLASS: &str = "VideoFrame";

/// Installs `VideoFrame` into a script engine.
pub struct FrameBinding {
    arena: Rc<RefCell<Arena<Frame>>>,
    typesetter: Rc<RefCell<Typesetter>>,
    default_font: String,
    max_dimension: u32,
}

impl FrameBinding {
    /// Binding whose frames live in `arena` and draw text with `typesetter`.
    pub fn new(
        arena: Rc<RefCell<Arena<Frame>>>,
        typesetter: Rc<RefCell<Typesetter>>,
        config: &HostConfig,
    ) -> Self {
        Self {
            arena,
            typesetter,
            default_font: config.default_font.clone(),
            max_dimension: config.max_frame_dimension,
        }
    }

    /// Register the class, its pixel view and every frame method with `engine`.
    pub fn install(&self, engine: &mut Engine) {
        self.class().install(engine);
        pixel_view::install(engine, &self.arena);
    }

    fn class(&self) -> ClassRegistry<Frame> {
        use ParamType::{Double, Int, Object};

        let mut class = ClassRegistry::new(FRAME_CLASS, Rc::clone(&self.arena));

        let font = self.default_font.clone();
        class.constructor(&[], move |arena, _| {
            let frame = new_frame(0, 0, 0.0, &font)?;
            Some(arena.insert(frame))
        });
        let (font, max) = (self.default_font.clone(), self.max_dimension);
        class.constructor(&[Int, Int, Double], move |arena, args| {
            let frame = construct(args, &font, max)?;
            Some(arena.insert(frame))
        });
        let (font, max) = (self.default_font.clone(), self.max_dimension);
        class.constructor(&[Int, Int, Double, Object], move |arena, args| {
            let mut frame = construct(args, &font, max)?;
            if let Value::Object(src) = args[3]
                && let Some(source) = arena.get_mut(src)
            {
                soft("VideoFrame", copy_from(frame.surface_mut(), source));
            }
            Some(arena.insert(frame))
        });

        class
            .getter("width", |f: &Frame| f.width())
            .getter("height", |f: &Frame| f.height())
            .getter("pad", |f: &Frame| f.pad())
            .property("pts", |f: &Frame| f.pts(), |f: &mut Frame, v: f64| f.set_pts(v))
            .property("timestamp", |f: &Frame| f.pts(), |f: &mut Frame, v: f64| f.set_pts(v))
            .property(
                "globalAlpha",
                |f: &Frame| f.surface.global_alpha(),
                |f: &mut Frame, v: f64| f.surface.set_global_alpha(v),
            )
            .property(
                "lineWidth",
                |f: &Frame| f.surface.line_width(),
                |f: &mut Frame, v: f64| f.surface.set_line_width(v),
            )
            .property(
                "miterLimit",
                |f: &Frame| f.surface.miter_limit(),
                |f: &mut Frame, v: f64| f.surface.set_miter_limit(v),
            )
            .property(
                "fillStyle",
                |f: &Frame| f.surface.fill_color().to_hex_rgb(),
                |f: &mut Frame, v: Value| {
                    if let Some(c) = style_color(&v) {
                        f.surface.set_fill_color(c);
                    }
                },
            )
            .property(
                "strokeStyle",
                |f: &Frame| f.surface.stroke_color().to_hex_rgb(),
                |f: &mut Frame, v: Value| {
                    if let Some(c) = style_color(&v) {
                        f.surface.set_stroke_color(c);
                    }
                },
            )
            .property(
                "font",
                |f: &Frame| f.surface.font().to_string(),
                |f: &mut Frame, v: String| {
                    f.surface.set_font(&v);
                },
            )
            .property(
                "lineCap",
                |f: &Frame| f.surface.line_cap().as_str(),
                |f: &mut Frame, v: String| f.surface.set_line_cap(LineCap::parse(&v)),
            )
            .property(
                "lineJoin",
                |f: &Frame| f.surface.line_join().as_str(),
                |f: &mut Frame, v: String| f.surface.set_line_join(LineJoin::parse(&v)),
            );

        class
            .method("save", |f: &mut Frame| f.surface.save())
            .method("restore", |f: &mut Frame| f.surface.restore())
            .method("beginPath", |f: &mut Frame| f.surface.begin_path())
            .method("closePath", |f: &mut Frame| f.surface.close_path())
            .method("moveTo", |f: &mut Frame, x: f64, y: f64| f.surface.move_to(x, y))
            .method("lineTo", |f: &mut Frame, x: f64, y: f64| f.surface.line_to(x, y))
            .method(
                "bezierCurveTo",
                |f: &mut Frame, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64| {
                    f.surface.bezier_curve_to(c1x, c1y, c2x, c2y, x, y)
                },
            )
            .method("arc", |f: &mut Frame, cx: f64, cy: f64, r: f64, a0: f64, a1: f64| {
                f.surface.arc(cx, cy, r, a0, a1)
            })
            .method(
                "arc",
                |f: &mut Frame, cx: f64, cy: f64, r: f64, a0: f64, a1: f64, ccw: bool| {
                    f.surface.arc_dir(cx, cy, r, a0, a1, ccw)
                },
            )
            .method("rect", |f: &mut Frame, x: f64, y: f64, w: f64, h: f64| {
                f.surface.rect(x, y, w, h)
            })
            .method("fill", |f: &mut Frame| f.surface.fill())
            .method("stroke", |f: &mut Frame| f.surface.stroke())
            .method("fillRect", |f: &mut Frame, x: f64, y: f64, w: f64, h: f64| {
                f.surface.fill_rect(x, y, w, h)
            })
            .method("strokeRect", |f: &mut Frame, x: f64, y: f64, w: f64, h: f64| {
                f.surface.stroke_rect(x, y, w, h)
            })
            .method("clearRect", |f: &mut Frame, x: f64, y: f64, w: f64, h: f64| {
                soft("clearRect", f.surface.clear_rect(x, y, w, h))
            })
            .method("translate", |f: &mut Frame, x: f64, y: f64| f.surface.translate(x, y))
            .method("rotate", |f: &mut Frame, angle: f64| f.surface.rotate(angle))
            .method("scale", |f: &mut Frame, x: f64, y: f64| f.surface.scale(x, y))
            .method("setFillStyle", |f: &mut Frame, r: u8, g: u8, b: u8, a: u8| {
                f.surface.set_fill_color(Rgba8::new(r, g, b, a))
            })
            .method("setStrokeStyle", |f: &mut Frame, r: u8, g: u8, b: u8, a: u8| {
                f.surface.set_stroke_color(Rgba8::new(r, g, b, a))
            })
            .method("flush", |f: &mut Frame| soft("flush", f.surface.flush()));

        let fonts = Rc::clone(&self.typesetter);
        class.method("fillText", move |f: &mut Frame, text: String, x: f64, y: f64| {
            match fonts.try_borrow_mut() {
                Ok(mut fonts) => soft("fillText", f.surface.fill_text(&mut fonts, &text, x, y)),
                Err(_) => tracing::warn!("fillText: typesetter busy"),
            }
        });
        let fonts = Rc::clone(&self.typesetter);
        class.method("strokeText", move |f: &mut Frame, text: String, x: f64, y: f64| {
            match fonts.try_borrow_mut() {
                Ok(mut fonts) => soft("strokeText", f.surface.stroke_text(&mut fonts, &text, x, y)),
                Err(_) => tracing::warn!("strokeText: typesetter busy"),
            }
        });

        for name in ["drawImage", "draw"] {
            class
                .method_raw(name, &[Object, Double, Double], draw_frame)
                .method_raw(name, &[Object, Double, Double, Double, Double], draw_frame);
        }

        class
    }
}

fn soft(op: &str, result: HostResult<()>) {
    if let Err(e) = result {
        tracing::warn!(op, error = %e, "frame operation failed");
    }
}

fn style_color(v: &Value) -> Option<Rgba8> {
    match v {
        Value::Str(s) => Some(color::resolve(s)),
        v if v.is_number() => Some(Rgba8::from_packed(v.as_u32())),
        _ => None,
    }
}

fn new_frame(width: u32, height: u32, pts: f64, font: &str) -> Option<Frame> {
    match Frame::new(width, height, pts) {
        Ok(mut frame) => {
            frame.surface.set_font(font);
            Some(frame)
        }
        Err(e) => {
            tracing::warn!(error = %e, "VideoFrame allocation failed");
            None
        }
    }
}

fn construct(args: &[Value], font: &str, max_dimension: u32) -> Option<Frame> {
    let width = args[0].as_i32().max(0) as u32;
    let height = args[1].as_i32().max(0) as u32;
    if width > max_dimension || height > max_dimension {
        tracing::warn!(width, height, max_dimension, "VideoFrame exceeds max_frame_dimension");
        return None;
    }
    new_frame(width, height, args[2].as_f64(), font)
}

fn copy_from(dst: &mut DrawingSurface, source: &mut Frame) -> HostResult<()> {
    let (w, h) = (source.width(), source.height());
    let pixels = source.surface.pixels()?;
    dst.draw_image(
        ImageRef {
            width: w,
            height: h,
            data: pixels.as_bytes(),
        },
        0.0,
        0.0,
        f64::from(w),
        f64::from(h),
    )
}

/// `drawImage(src, x, y[, w, h])`; without a size the source is drawn at its natural size.
fn draw_frame(arena: &mut Arena<Frame>, this: Handle, args: &[Value]) -> Option<Value> {
    let Value::Object(src) = args[0] else {
        return None;
    };
    let (x, y) = (args[1].as_f64(), args[2].as_f64());
    let source = arena.get(src)?;
    let (sw, sh) = (source.width(), source.height());
    let (w, h) = match args.get(3..5) {
        Some([w, h]) => (w.as_f64(), h.as_f64()),
        _ => (f64::from(sw), f64::from(sh)),
    };

    let result = if src == this {
        let frame = arena.get_mut(this)?;
        frame.surface.snapshot().and_then(|snap| {
            frame.surface.draw_image(
                ImageRef {
                    width: sw,
                    height: sh,
                    data: snap.as_bytes(),
                },
                x,
                y,
                w,
                h,
            )
        })
    } else {
        let (dst, source) = arena.get_pair_mut(this, src)?;
        source.surface.pixels().and_then(|pixels| {
            dst.surface.draw_image(
                ImageRef {
                    width: sw,
                    height: sh,
                    data: pixels.as_bytes(),
                },
                x,
                y,
                w,
                h,
            )
        })
    };
    soft("drawImage", result);
    Some(Value::Void)
}
