use std::cell::RefCell;
use std::rc::Rc;

use rhai::{Blob, Dynamic, Engine, INT};

use crate::bridge::{Arena, ScriptObject};
use crate::foundation::pixels::PixelBuffer;
use crate::frame::Frame;

/// Live view of a frame's pixels, returned by `frame.data`.
///
/// `view[i]` reads or writes pixel `i` as `0xRRGGBBAA` of the stored (premultiplied) bytes.
/// Reads and writes see pending drawing, which is flushed first.
#[derive(Clone, Debug)]
pub struct PixelView {
    frame: ScriptObject<Frame>,
}

type SharedArena = Rc<RefCell<Arena<Frame>>>;

fn with_pixels<R>(
    arena: &SharedArena,
    frame: &ScriptObject<Frame>,
    f: impl FnOnce(&mut PixelBuffer) -> R,
) -> Option<R> {
    let mut arena = arena.try_borrow_mut().ok()?;
    let frame = arena.get_mut(frame.handle())?;
    match frame.surface.pixels_mut() {
        Ok(pixels) => Some(f(pixels)),
        Err(e) => {
            tracing::warn!(error = %e, "pixel access failed");
            None
        }
    }
}

pub(crate) fn install(engine: &mut Engine, arena: &SharedArena) {
    engine.register_type_with_name::<PixelView>("PixelView");

    engine.register_get("data", |f: &mut ScriptObject<Frame>| PixelView { frame: f.clone() });

    let a = Rc::clone(arena);
    engine.register_set("data", move |f: &mut ScriptObject<Frame>, value: Dynamic| {
        if value.is::<PixelView>() {
            // `frame.data[i] = v` writes back the view it already edited in place.
            return;
        }
        let Some(bytes) = value.try_cast::<Blob>() else {
            tracing::warn!("frame.data accepts only a blob of width*height*4 bytes");
            return;
        };
        if let Some(Err(e)) = with_pixels(&a, f, |pixels| pixels.replace_bytes(&bytes)) {
            tracing::warn!(error = %e, "frame.data assignment ignored");
        }
    });

    let a = Rc::clone(arena);
    let len = move |v: &mut PixelView| -> INT {
        with_pixels(&a, &v.frame, |pixels| pixels.pixel_count() as INT).unwrap_or(0)
    };
    engine.register_get("len", len.clone());
    engine.register_fn("len", len);

    let a = Rc::clone(arena);
    engine.register_indexer_get(move |v: &mut PixelView, index: INT| -> Dynamic {
        let Ok(index) = usize::try_from(index) else {
            return Dynamic::UNIT;
        };
        with_pixels(&a, &v.frame, |pixels| pixels.pixel(index))
            .flatten()
            .map(|px| Dynamic::from(INT::from(px)))
            .unwrap_or(Dynamic::UNIT)
    });

    let a = Rc::clone(arena);
    engine.register_indexer_set(move |v: &mut PixelView, index: INT, value: INT| {
        let Ok(index) = usize::try_from(index) else {
            return;
        };
        with_pixels(&a, &v.frame, |pixels| pixels.set_pixel(index, value as u32));
    });

    let a = Rc::clone(arena);
    engine.register_fn("to_blob", move |v: &mut PixelView| -> Blob {
        with_pixels(&a, &v.frame, |pixels| pixels.as_bytes().to_vec()).unwrap_or_default()
    });
}
