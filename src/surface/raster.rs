use std::sync::Arc;

use kurbo::{Affine, BezPath, PathEl};

use crate::foundation::error::{HostError, HostResult};

/// Deferred vello_cpu work for one surface.
///
/// Drawing calls are recorded into the render context and only rasterized when the surface
/// needs its pixels. The scratch pixmap receives the rendered batch on a transparent background
/// and is then composited onto the frame buffer by the caller.
pub(crate) struct Raster {
    ctx: vello_cpu::RenderContext,
    scratch: vello_cpu::Pixmap,
    pending: bool,
}

impl Raster {
    pub(crate) fn new(width: u16, height: u16) -> Self {
        Self {
            ctx: vello_cpu::RenderContext::new(width, height),
            scratch: vello_cpu::Pixmap::new(width, height),
            pending: false,
        }
    }

    /// Borrow the render context for recording. Marks the batch as pending.
    pub(crate) fn record(&mut self) -> &mut vello_cpu::RenderContext {
        self.pending = true;
        &mut self.ctx
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending
    }

    /// Rasterize the pending batch and hand the premultiplied result to `apply`.
    pub(crate) fn resolve(
        &mut self,
        apply: impl FnOnce(&[u8]) -> HostResult<()>,
    ) -> HostResult<()> {
        if !self.pending {
            return Ok(());
        }
        self.ctx.flush();
        self.scratch.data_as_u8_slice_mut().fill(0);
        self.ctx.render_to_pixmap(&mut self.scratch);
        self.ctx.reset();
        self.pending = false;
        apply(self.scratch.data_as_u8_slice())
    }
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    let pt = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

/// Wrap premultiplied RGBA8 bytes as an image paint.
pub(crate) fn image_paint(bytes: &[u8], width: u32, height: u32) -> HostResult<vello_cpu::Image> {
    let w: u16 = width
        .try_into()
        .map_err(|_| HostError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| HostError::render("image height exceeds u16"))?;
    if bytes.len() != width as usize * height as usize * 4 {
        return Err(HostError::render("image byte len mismatch"));
    }
    let pixels: Vec<vello_cpu::peniko::color::PremulRgba8> = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect();
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}
