//! Canvas-like drawing surface bound one-to-one to a [`PixelBuffer`].
//!
//! Geometry is appended in device space (points pass through the current transform as they are
//! added), rasterized with `vello_cpu` in deferred batches, and composited source-over onto the
//! premultiplied RGBA8 buffer whenever pixels are observed.

pub(crate) mod composite;
mod raster;
mod state;
pub(crate) mod text;

use std::f64::consts::TAU;

use kurbo::{Affine, BezPath, Point, Rect, Shape};

use crate::color::{self, Rgba8};
use crate::foundation::config::MAX_RASTER_DIMENSION;
use crate::foundation::error::{HostError, HostResult};
use crate::foundation::pixels::PixelBuffer;
use composite::{Blit, blit_over, erase_in_place, over_in_place};
use raster::{Raster, affine_to_cpu, bezpath_to_cpu, image_paint};
use state::DrawingState;

pub use state::{FontSpec, LineCap, LineJoin};
pub use text::{FontBook, SystemFonts, Typesetter};

const ARC_TOLERANCE: f64 = 0.1;

/// Borrowed premultiplied RGBA8 image used as a `draw_image` source.
#[derive(Clone, Copy, Debug)]
pub struct ImageRef<'a> {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Tightly packed premultiplied RGBA8 bytes.
    pub data: &'a [u8],
}

/// Where `draw_image` puts a source image.
///
/// The source is scaled independently per axis from its natural size to the requested size and
/// painted at the requested position divided by that scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImagePlacement {
    /// Horizontal scale factor (`w / src_width`).
    pub scale_x: f64,
    /// Vertical scale factor (`h / src_height`).
    pub scale_y: f64,
    /// Paint origin in the scaled space (`x / scale_x`).
    pub origin_x: f64,
    /// Paint origin in the scaled space (`y / scale_y`).
    pub origin_y: f64,
}

impl ImagePlacement {
    /// Placement of a `src_width`×`src_height` image into the box `(x, y, w, h)`.
    ///
    /// `None` when either size is empty or the box is not finite.
    pub fn new(src_width: u32, src_height: u32, x: f64, y: f64, w: f64, h: f64) -> Option<Self> {
        if src_width == 0 || src_height == 0 {
            return None;
        }
        if ![x, y, w, h].iter().all(|v| v.is_finite()) || w == 0.0 || h == 0.0 {
            return None;
        }
        let scale_x = w / f64::from(src_width);
        let scale_y = h / f64::from(src_height);
        Some(Self {
            scale_x,
            scale_y,
            origin_x: x / scale_x,
            origin_y: y / scale_y,
        })
    }

    /// Source-pixel to user-space transform.
    pub fn transform(&self) -> Affine {
        Affine::scale_non_uniform(self.scale_x, self.scale_y)
            * Affine::translate((self.origin_x, self.origin_y))
    }
}

/// Stateful 2D rasterization context owning one pixel buffer.
pub struct DrawingSurface {
    pixels: PixelBuffer,
    state: DrawingState,
    stack: Vec<DrawingState>,
    path: BezPath,
    current: Option<Point>,
    subpath_start: Option<Point>,
    raster: Option<Raster>,
}

impl DrawingSurface {
    /// Create a transparent surface.
    pub fn new(width: u32, height: u32) -> HostResult<Self> {
        Self::from_pixels(PixelBuffer::new(width, height)?)
    }

    /// Wrap existing pixels.
    pub fn from_pixels(pixels: PixelBuffer) -> HostResult<Self> {
        if pixels.width() > MAX_RASTER_DIMENSION || pixels.height() > MAX_RASTER_DIMENSION {
            return Err(HostError::validation(format!(
                "surface {}x{} exceeds {MAX_RASTER_DIMENSION} pixels per side",
                pixels.width(),
                pixels.height()
            )));
        }
        Ok(Self {
            pixels,
            state: DrawingState::default(),
            stack: Vec::new(),
            path: BezPath::new(),
            current: None,
            subpath_start: None,
            raster: None,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    // ---- pixel access -------------------------------------------------------------------------

    /// Composite any recorded drawing into the pixel buffer.
    pub fn flush(&mut self) -> HostResult<()> {
        let Self { raster, pixels, .. } = self;
        match raster {
            Some(r) if r.is_pending() => r.resolve(|src| over_in_place(pixels.as_bytes_mut(), src)),
            _ => Ok(()),
        }
    }

    /// Flushed view of the pixels.
    pub fn pixels(&mut self) -> HostResult<&PixelBuffer> {
        self.flush()?;
        Ok(&self.pixels)
    }

    /// Flushed mutable view of the pixels.
    pub fn pixels_mut(&mut self) -> HostResult<&mut PixelBuffer> {
        self.flush()?;
        Ok(&mut self.pixels)
    }

    // ---- state --------------------------------------------------------------------------------

    /// Push the drawing state.
    pub fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    /// Pop the drawing state. Without a matching `save` this does nothing.
    pub fn restore(&mut self) {
        if let Some(s) = self.stack.pop() {
            self.state = s;
        }
    }

    /// Current transform.
    pub fn transform(&self) -> Affine {
        self.state.transform
    }

    /// Post-multiply a translation.
    pub fn translate(&mut self, tx: f64, ty: f64) {
        self.state.transform *= Affine::translate((tx, ty));
    }

    /// Post-multiply a rotation (radians).
    pub fn rotate(&mut self, angle: f64) {
        self.state.transform *= Affine::rotate(angle);
    }

    /// Post-multiply a per-axis scale.
    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.state.transform *= Affine::scale_non_uniform(sx, sy);
    }

    /// Fill colour.
    pub fn fill_color(&self) -> Rgba8 {
        self.state.fill
    }

    /// Stroke colour.
    pub fn stroke_color(&self) -> Rgba8 {
        self.state.stroke
    }

    /// Set the fill colour from a style string.
    pub fn set_fill_style(&mut self, style: &str) {
        self.state.fill = color::resolve(style);
    }

    /// Set the stroke colour from a style string.
    pub fn set_stroke_style(&mut self, style: &str) {
        self.state.stroke = color::resolve(style);
    }

    /// Set the fill colour directly.
    pub fn set_fill_color(&mut self, c: Rgba8) {
        self.state.fill = c;
    }

    /// Set the stroke colour directly.
    pub fn set_stroke_color(&mut self, c: Rgba8) {
        self.state.stroke = c;
    }

    /// Line width in user units.
    pub fn line_width(&self) -> f64 {
        self.state.line_width
    }

    /// Set the line width. Non-positive or non-finite widths are ignored.
    pub fn set_line_width(&mut self, w: f64) {
        if w.is_finite() && w > 0.0 {
            self.state.line_width = w;
        }
    }

    /// Line cap.
    pub fn line_cap(&self) -> LineCap {
        self.state.line_cap
    }

    /// Set the line cap.
    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.state.line_cap = cap;
    }

    /// Line join.
    pub fn line_join(&self) -> LineJoin {
        self.state.line_join
    }

    /// Set the line join.
    pub fn set_line_join(&mut self, join: LineJoin) {
        self.state.line_join = join;
    }

    /// Miter limit.
    pub fn miter_limit(&self) -> f64 {
        self.state.miter_limit
    }

    /// Set the miter limit. Non-positive or non-finite limits are ignored.
    pub fn set_miter_limit(&mut self, limit: f64) {
        if limit.is_finite() && limit > 0.0 {
            self.state.miter_limit = limit;
        }
    }

    /// Global alpha in `[0, 1]`.
    pub fn global_alpha(&self) -> f64 {
        f64::from(self.state.global_alpha)
    }

    /// Set global alpha. Values outside `[0, 1]` are ignored.
    pub fn set_global_alpha(&mut self, alpha: f64) {
        if (0.0..=1.0).contains(&alpha) {
            self.state.global_alpha = alpha as f32;
        }
    }

    /// Current font.
    pub fn font(&self) -> &FontSpec {
        &self.state.font
    }

    /// Select a font from `"<size>px <family>"`. Returns `false` and keeps the previous font
    /// when the string does not parse.
    pub fn set_font(&mut self, font: &str) -> bool {
        match FontSpec::parse(font) {
            Some(spec) => {
                self.state.font = spec;
                true
            }
            None => {
                tracing::debug!(font, "ignoring unparseable font");
                false
            }
        }
    }

    // ---- path ---------------------------------------------------------------------------------

    /// Discard the current path.
    pub fn begin_path(&mut self) {
        self.path = BezPath::new();
        self.current = None;
        self.subpath_start = None;
    }

    /// Start a new subpath.
    pub fn move_to(&mut self, x: f64, y: f64) {
        let p = self.state.transform * Point::new(x, y);
        self.path.move_to(p);
        self.current = Some(p);
        self.subpath_start = Some(p);
    }

    /// Straight segment to `(x, y)`. Starts a subpath when there is no current point.
    pub fn line_to(&mut self, x: f64, y: f64) {
        if self.current.is_none() {
            self.move_to(x, y);
            return;
        }
        let p = self.state.transform * Point::new(x, y);
        self.path.line_to(p);
        self.current = Some(p);
    }

    /// Cubic Bézier segment.
    pub fn bezier_curve_to(&mut self, cp1x: f64, cp1y: f64, cp2x: f64, cp2y: f64, x: f64, y: f64) {
        if self.current.is_none() {
            self.move_to(cp1x, cp1y);
        }
        let t = self.state.transform;
        let p = t * Point::new(x, y);
        self.path
            .curve_to(t * Point::new(cp1x, cp1y), t * Point::new(cp2x, cp2y), p);
        self.current = Some(p);
    }

    /// Circular arc clockwise from `start` to `end` (radians).
    pub fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64) {
        self.arc_dir(cx, cy, radius, start, end, false);
    }

    /// Circular arc in either direction. Joins the current point with a straight segment.
    pub fn arc_dir(
        &mut self,
        cx: f64,
        cy: f64,
        radius: f64,
        start: f64,
        end: f64,
        anticlockwise: bool,
    ) {
        if !(radius.is_finite() && radius >= 0.0)
            || ![cx, cy, start, end].iter().all(|v| v.is_finite())
        {
            return;
        }
        let t = self.state.transform;
        let sweep = arc_sweep(start, end, anticlockwise);
        let p0 = t * Point::new(cx + radius * start.cos(), cy + radius * start.sin());
        if self.current.is_some() {
            self.path.line_to(p0);
        } else {
            self.path.move_to(p0);
            self.subpath_start = Some(p0);
        }

        let arc = kurbo::Arc::new((cx, cy), (radius, radius), start, sweep, 0.0);
        for el in arc.append_iter(ARC_TOLERANCE) {
            self.path.push(t * el);
        }
        let end_angle = start + sweep;
        self.current = Some(t * Point::new(cx + radius * end_angle.cos(), cy + radius * end_angle.sin()));
    }

    /// Close the current subpath.
    pub fn close_path(&mut self) {
        if self.current.is_none() {
            return;
        }
        self.path.close_path();
        self.current = self.subpath_start;
    }

    /// Append a closed rectangle subpath.
    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.move_to(x, y);
        self.line_to(x + w, y);
        self.line_to(x + w, y + h);
        self.line_to(x, y + h);
        self.close_path();
        self.move_to(x, y);
    }

    // ---- painting -----------------------------------------------------------------------------

    /// Fill the current path (non-zero winding). The path is kept.
    pub fn fill(&mut self) {
        let path = self.path.clone();
        self.fill_device_path(&path);
    }

    /// Stroke the current path. The path is kept.
    pub fn stroke(&mut self) {
        let path = self.path.clone();
        self.stroke_device_path(&path);
    }

    /// Fill a rectangle without touching the current path.
    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let path = self.device_rect(x, y, w, h);
        self.fill_device_path(&path);
    }

    /// Stroke a rectangle without touching the current path.
    pub fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let path = self.device_rect(x, y, w, h);
        self.stroke_device_path(&path);
    }

    /// Replace the rectangle with transparent black.
    pub fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) -> HostResult<()> {
        if ![x, y, w, h].iter().all(|v| v.is_finite()) || w == 0.0 || h == 0.0 {
            return Ok(());
        }
        self.flush()?;
        let path = bezpath_to_cpu(&self.device_rect(x, y, w, h));
        let Self { raster, pixels, .. } = self;
        let Some(raster) = ensure_raster(raster, pixels) else {
            return Ok(());
        };
        let ctx = raster.record();
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
        ctx.fill_path(&path);
        raster.resolve(|mask| erase_in_place(pixels.as_bytes_mut(), mask))
    }

    /// Composite `source` into the box `(x, y, w, h)`.
    pub fn draw_image(
        &mut self,
        source: ImageRef<'_>,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    ) -> HostResult<()> {
        let Some(placement) = ImagePlacement::new(source.width, source.height, x, y, w, h) else {
            return Ok(());
        };
        let alpha = self.state.global_alpha;
        let transform = self.state.transform * placement.transform();

        if let Some((dx, dy)) = integer_offset(transform) {
            self.flush()?;
            let (dst_w, dst_h) = (self.width(), self.height());
            return blit_over(
                self.pixels.as_bytes_mut(),
                dst_w,
                dst_h,
                Blit {
                    src: source.data,
                    src_width: source.width,
                    src_height: source.height,
                    dx,
                    dy,
                    opacity: alpha,
                },
            );
        }

        let paint = image_paint(source.data, source.width, source.height)?;
        let bounds = vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(source.width),
            f64::from(source.height),
        );
        self.paint_layer(|ctx| {
            ctx.set_transform(affine_to_cpu(transform));
            ctx.set_paint(paint);
            ctx.fill_rect(&bounds);
        });
        Ok(())
    }

    /// Copy of the flushed pixels, for drawing a surface onto itself.
    pub fn snapshot(&mut self) -> HostResult<PixelBuffer> {
        Ok(self.pixels()?.clone())
    }

    /// Fill `text` with its alphabetic baseline starting at `(x, y)`.
    pub fn fill_text(&mut self, fonts: &mut Typesetter, text: &str, x: f64, y: f64) -> HostResult<()> {
        self.draw_text(fonts, text, x, y, false)
    }

    /// Stroke glyph outlines of `text` with its alphabetic baseline starting at `(x, y)`.
    pub fn stroke_text(
        &mut self,
        fonts: &mut Typesetter,
        text: &str,
        x: f64,
        y: f64,
    ) -> HostResult<()> {
        self.draw_text(fonts, text, x, y, true)
    }

    fn draw_text(
        &mut self,
        fonts: &mut Typesetter,
        text: &str,
        x: f64,
        y: f64,
        outline: bool,
    ) -> HostResult<()> {
        if !x.is_finite() || !y.is_finite() || self.width() == 0 || self.height() == 0 {
            return Ok(());
        }
        let Some(shaped) = fonts.shape(&self.state.font, text)? else {
            return Ok(());
        };
        let transform = affine_to_cpu(self.state.transform * Affine::translate((x, y)));
        let color = if outline {
            self.state.stroke
        } else {
            self.state.fill
        };
        let stroke = self.state.stroke_style();
        self.paint_layer(|ctx| {
            ctx.set_transform(transform);
            ctx.set_paint(solid(color));
            if outline {
                ctx.set_stroke(stroke);
            }
            for run in shaped.runs {
                let builder = ctx.glyph_run(&shaped.font).font_size(run.size_px);
                if outline {
                    builder.stroke_glyphs(run.glyphs.into_iter());
                } else {
                    builder.fill_glyphs(run.glyphs.into_iter());
                }
            }
        });
        Ok(())
    }

    fn device_rect(&self, x: f64, y: f64, w: f64, h: f64) -> BezPath {
        let rect = Rect::new(x, y, x + w, y + h);
        self.state.transform * rect.to_path(ARC_TOLERANCE)
    }

    fn fill_device_path(&mut self, path: &BezPath) {
        if path.elements().is_empty() {
            return;
        }
        let path = bezpath_to_cpu(path);
        let color = self.state.fill;
        self.paint_layer(|ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(solid(color));
            ctx.fill_path(&path);
        });
    }

    fn stroke_device_path(&mut self, path: &BezPath) {
        if path.elements().is_empty() {
            return;
        }
        // Stroke in user space so the pen follows the current transform.
        let t = self.state.transform;
        if t.determinant().abs() < f64::EPSILON {
            return;
        }
        let user = bezpath_to_cpu(&(t.inverse() * path.clone()));
        let color = self.state.stroke;
        let stroke = self.state.stroke_style();
        self.paint_layer(|ctx| {
            ctx.set_transform(affine_to_cpu(t));
            ctx.set_stroke(stroke);
            ctx.set_paint(solid(color));
            ctx.stroke_path(&user);
        });
    }

    fn paint_layer(&mut self, draw: impl FnOnce(&mut vello_cpu::RenderContext)) {
        let alpha = self.state.global_alpha;
        if alpha <= 0.0 {
            return;
        }
        let Self { raster, pixels, .. } = self;
        let Some(raster) = ensure_raster(raster, pixels) else {
            return;
        };
        let ctx = raster.record();
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        if alpha < 1.0 {
            ctx.push_opacity_layer(alpha);
        }
        draw(ctx);
        if alpha < 1.0 {
            ctx.pop_layer();
        }
    }
}

fn ensure_raster<'a>(raster: &'a mut Option<Raster>, pixels: &PixelBuffer) -> Option<&'a mut Raster> {
    let (w, h) = (pixels.width(), pixels.height());
    if w == 0 || h == 0 {
        return None;
    }
    let w = u16::try_from(w).ok()?;
    let h = u16::try_from(h).ok()?;
    Some(raster.get_or_insert_with(|| Raster::new(w, h)))
}

fn solid(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

/// Signed sweep for an arc, following canvas direction rules.
pub(crate) fn arc_sweep(start: f64, end: f64, anticlockwise: bool) -> f64 {
    if anticlockwise {
        if start - end >= TAU {
            -TAU
        } else if start < end {
            // A reversed whole turn still draws the full circle.
            -(TAU - (end - start) % TAU)
        } else {
            end - start
        }
    } else if end - start >= TAU {
        TAU
    } else if start > end {
        TAU - (start - end) % TAU
    } else {
        end - start
    }
}

/// `Some((dx, dy))` when `t` is a pure whole-pixel translation.
fn integer_offset(t: Affine) -> Option<(i64, i64)> {
    let [a, b, c, d, e, f] = t.as_coeffs();
    if a != 1.0 || b != 0.0 || c != 0.0 || d != 1.0 {
        return None;
    }
    if e.fract() != 0.0 || f.fract() != 0.0 || e.abs() > 1e9 || f.abs() > 1e9 {
        return None;
    }
    Some((e as i64, f as i64))
}

#[cfg(test)]
#[path = "../../tests/unit/surface/surface.rs"]
mod tests;
