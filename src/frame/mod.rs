//! The `VideoFrame` script type: a drawing surface plus frame metadata.

mod binding;
mod pixel_view;

pub use binding::{FrameBinding, FRAME_CLASS};
pub use pixel_view::PixelView;

use crate::foundation::error::HostResult;
use crate::foundation::pixels::PixelBuffer;
use crate::surface::DrawingSurface;

/// A video frame as seen by scripts.
pub struct Frame {
    surface: DrawingSurface,
    pts: f64,
    pad: Option<u32>,
}

impl Frame {
    /// Transparent `width`×`height` frame created by a script.
    pub fn new(width: u32, height: u32, pts: f64) -> HostResult<Self> {
        Ok(Self {
            surface: DrawingSurface::new(width, height)?,
            pts,
            pad: None,
        })
    }

    /// Frame delivered on `pad`, taking ownership of already-copied pixels.
    pub fn from_pixels(pixels: PixelBuffer, pts: f64, pad: u32) -> HostResult<Self> {
        Ok(Self {
            surface: DrawingSurface::from_pixels(pixels)?,
            pts,
            pad: Some(pad),
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    /// Presentation timestamp.
    pub fn pts(&self) -> f64 {
        self.pts
    }

    /// Set the presentation timestamp.
    pub fn set_pts(&mut self, pts: f64) {
        self.pts = pts;
    }

    /// Input pad the frame arrived on; `None` for script-created frames.
    pub fn pad(&self) -> Option<u32> {
        self.pad
    }

    /// Drawing surface.
    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }

    /// Drawing surface, mutably.
    pub fn surface_mut(&mut self) -> &mut DrawingSurface {
        &mut self.surface
    }

    /// Flushed, tightly packed copy of the pixels.
    pub fn to_bytes(&mut self) -> HostResult<Vec<u8>> {
        Ok(self.surface.pixels()?.as_bytes().to_vec())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frame/frame.rs"]
mod tests;
