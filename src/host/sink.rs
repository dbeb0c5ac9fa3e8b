use std::cell::RefCell;
use std::rc::Rc;

use crate::foundation::error::HostResult;

/// A frame emitted by the script, owning a tightly packed copy of its pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputFrame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Presentation timestamp.
    pub pts: f64,
    /// Output pad index chosen by the script.
    pub pad: u32,
    /// Premultiplied RGBA8, `width * height * 4` bytes.
    pub data: Vec<u8>,
}

/// Sink contract for frames the script emits.
///
/// Ordering contract: `frame_received` is called in emission order, synchronously from inside the
/// script callback that emitted the frame.
pub trait FrameSink {
    /// Consume one emitted frame. An error aborts the script call that emitted it.
    fn frame_received(&mut self, frame: OutputFrame) -> HostResult<()>;
}

impl<F> FrameSink for F
where
    F: FnMut(OutputFrame) -> HostResult<()>,
{
    fn frame_received(&mut self, frame: OutputFrame) -> HostResult<()> {
        self(frame)
    }
}

/// In-memory sink for tests and debugging.
///
/// Clones share storage, so one clone can be handed to the host and another inspected.
#[derive(Clone, Debug, Default)]
pub struct InMemorySink {
    frames: Rc<RefCell<Vec<OutputFrame>>>,
}

impl InMemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the captured frames, in emission order.
    pub fn frames(&self) -> Vec<OutputFrame> {
        self.frames.borrow().clone()
    }

    /// Number of captured frames.
    pub fn len(&self) -> usize {
        self.frames.borrow().len()
    }

    /// `true` when nothing has been emitted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove and return the captured frames.
    pub fn take(&self) -> Vec<OutputFrame> {
        std::mem::take(&mut *self.frames.borrow_mut())
    }
}

impl FrameSink for InMemorySink {
    fn frame_received(&mut self, frame: OutputFrame) -> HostResult<()> {
        self.frames.borrow_mut().push(frame);
        Ok(())
    }
}
