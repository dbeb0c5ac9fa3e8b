//! framescript lets Rhai scripts transform live video frames.
//!
//! An embedding pipeline loads one script into a [`PipelineHost`], delivers raw premultiplied
//! RGBA8 frames with [`PipelineHost::deliver`], and receives whatever the script emits through a
//! [`FrameSink`]. Scripts draw on frames with a Canvas-like API:
//!
//! ```rhai
//! make_pads(1);
//! let frames = 0;
//!
//! fn receive_video_frame(frame) {
//!     this.frames += 1;
//!     frame.fillStyle = "rgba(0, 0, 0, 0.5)";
//!     frame.fillRect(0, 0, frame.width, 40);
//!     frame.fillStyle = "white";
//!     frame.font = "24px sans-serif";
//!     frame.fillText(`frame ${this.frames}`, 10, 30);
//!     send_video_frame(frame);
//! }
//! ```
//!
//! The crate is layered: [`color`] resolves style strings, [`surface`] rasterizes onto a pixel
//! buffer, [`bridge`] exposes native closures and objects to the script engine, [`frame`] binds
//! the surface as the `VideoFrame` script type, and [`host`] drives the whole thing.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Script ↔ native value marshalling and object registries.
pub mod bridge;
/// CSS-style colour parsing.
pub mod color;
/// The `VideoFrame` script type.
pub mod frame;
/// Script loading, frame delivery and emission.
pub mod host;
/// Canvas-like drawing over a pixel buffer.
pub mod surface;

pub use crate::foundation::config::{HostConfig, MAX_RASTER_DIMENSION};
pub use crate::foundation::error::{HostError, HostResult};
pub use crate::foundation::pixels::{PixelBuffer, rgba8_len};

pub use crate::color::Rgba8;
pub use crate::frame::{Frame, PixelView};
pub use crate::host::{
    FATAL_EXIT_CODE, FrameSink, HostState, InMemorySink, InputFrame, LogSink, OutputFrame,
    PipelineHost, ScriptPlatform, ScriptSource,
};
pub use crate::surface::{DrawingSurface, ImagePlacement, ImageRef};
