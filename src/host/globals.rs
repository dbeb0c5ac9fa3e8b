use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rhai::{Blob, Dynamic, Engine, EvalAltResult, FLOAT, Map};

use crate::bridge::{Arena, FunctionRegistry, Handle, ParamType, ScriptObject, Value};
use crate::bridge::value::from_dynamic;
use crate::foundation::config::HostConfig;
use crate::foundation::pixels::rgba8_len;
use crate::frame::{FRAME_CLASS, Frame};
use crate::host::HostState;
use crate::host::log::{LEVEL_DEBUG, LEVEL_FATAL, LEVEL_INFO, LEVEL_WARNING, Logger};
use crate::host::sink::{FrameSink, OutputFrame};

/// Exit status used when a script emits a frame whose byte length does not match its size.
pub const FATAL_EXIT_CODE: i32 = 70;

/// State reachable from both the host and the natives installed into its engine.
pub(crate) struct HostShared {
    pub(crate) state: Cell<HostState>,
    pub(crate) pads: Cell<u32>,
    pub(crate) sink: RefCell<Box<dyn FrameSink>>,
    pub(crate) logger: Logger,
    pub(crate) arena: Rc<RefCell<Arena<Frame>>>,
}

pub(crate) fn install(engine: &mut Engine, shared: &Rc<HostShared>, config: &HostConfig) {
    let s = Rc::clone(shared);
    engine.on_print(move |text| s.logger.log(LEVEL_INFO, text));
    let s = Rc::clone(shared);
    engine.on_debug(move |text, source, pos| match source {
        Some(source) => s.logger.log(LEVEL_DEBUG, &format!("{source} @ {pos:?} | {text}")),
        None => s.logger.log(LEVEL_DEBUG, &format!("{pos:?} | {text}")),
    });

    let mut natives = FunctionRegistry::new();
    let s = Rc::clone(shared);
    let default_level = config.default_log_level;
    natives.variadic("log", &[], ParamType::Any, move |args| {
        log_values(&s.logger, default_level, args);
        None
    });
    let s = Rc::clone(shared);
    natives.function("make_pads", move |count: i32| {
        if s.state.get() != HostState::Uninitialized {
            s.logger.log(LEVEL_WARNING, "make_pads() is only honoured while the script loads");
            return;
        }
        s.pads.set(count.max(1) as u32);
    });
    natives.install(engine);

    // Shadows the math package's `log(FLOAT)` and `log(FLOAT, FLOAT)`.
    let s = Rc::clone(shared);
    engine.register_fn("log", move |x: FLOAT| {
        log_values(&s.logger, default_level, &[Value::Double(x)]);
    });
    let s = Rc::clone(shared);
    engine.register_fn("log", move |x: FLOAT, y: FLOAT| {
        log_values(&s.logger, default_level, &[Value::Double(x), Value::Double(y)]);
    });

    let s = Rc::clone(shared);
    engine.register_fn(
        "send_video_frame",
        move |target: Dynamic| -> Result<(), Box<EvalAltResult>> { emit(&s, &target, 0) },
    );
    let s = Rc::clone(shared);
    engine.register_fn(
        "send_video_frame",
        move |target: Dynamic, pad: Dynamic| -> Result<(), Box<EvalAltResult>> {
            let pad = from_dynamic(&pad, ParamType::Int, &no_object).as_i32();
            let pad = u32::try_from(pad)
                .map_err(|_| format!("send_video_frame: pad index {pad} is negative"))?;
            emit(&s, &target, pad)
        },
    );
    engine.register_fn("send_video_frame", || ());
}

fn no_object(_: &Dynamic) -> Option<Handle> {
    None
}

/// `log(level?, values...)`: a leading number selects the level, the rest is concatenated.
fn log_values(logger: &Logger, default_level: i32, args: &[Value]) {
    let (level, rest) = match args.split_first() {
        None => return,
        Some((first, rest)) if first.is_number() => (first.as_i32(), rest),
        Some(_) => (default_level, args),
    };
    let message: String = rest.iter().map(Value::to_text).collect();
    logger.log(level, &message);
}

fn emit(shared: &HostShared, target: &Dynamic, pad: u32) -> Result<(), Box<EvalAltResult>> {
    let frame = if let Some(obj) = target.read_lock::<ScriptObject<Frame>>() {
        let mut arena = shared
            .arena
            .try_borrow_mut()
            .map_err(|_| "send_video_frame: frame storage is busy")?;
        let frame = arena
            .get_mut(obj.handle())
            .ok_or("send_video_frame: frame has been released")?;
        OutputFrame {
            width: frame.width(),
            height: frame.height(),
            pts: frame.pts(),
            pad,
            data: frame.to_bytes().map_err(|e| e.to_string())?,
        }
    } else if let Some(map) = target.read_lock::<Map>() {
        map_frame(&map, pad)
    } else {
        return Err(format!(
            "send_video_frame expects a {FRAME_CLASS} or a frame map, got {}",
            target.type_name()
        )
        .into());
    };

    if let Some(reason) = emission_error(&frame) {
        fatal(&shared.logger, &reason);
    }
    let mut sink = shared
        .sink
        .try_borrow_mut()
        .map_err(|_| "send_video_frame: frame sink is busy")?;
    sink.frame_received(frame).map_err(|e| e.to_string().into())
}

fn map_frame(map: &Map, pad: u32) -> OutputFrame {
    let number = |key: &str, ty: ParamType| {
        map.get(key)
            .map(|v| from_dynamic(v, ty, &no_object))
            .unwrap_or(Value::Void)
    };
    let pts = number("pts", ParamType::Double).as_f64();
    OutputFrame {
        width: number("width", ParamType::Int).as_i32().max(0) as u32,
        height: number("height", ParamType::Int).as_i32().max(0) as u32,
        pts: if pts.is_finite() { pts } else { 0.0 },
        pad,
        data: map
            .get("data")
            .and_then(|v| v.clone().try_cast::<Blob>())
            .unwrap_or_default(),
    }
}

/// Why an emitted frame is malformed, if it is.
pub(crate) fn emission_error(frame: &OutputFrame) -> Option<String> {
    match rgba8_len(frame.width, frame.height) {
        Ok(0) => Some(format!(
            "emitted {}x{} frame is empty",
            frame.width, frame.height
        )),
        Ok(expected) if expected == frame.data.len() => None,
        Ok(expected) => Some(format!(
            "emitted {}x{} frame carries {} bytes, expected {expected}",
            frame.width,
            frame.height,
            frame.data.len()
        )),
        Err(e) => Some(e.to_string()),
    }
}

fn fatal(logger: &Logger, reason: &str) -> ! {
    logger.log(LEVEL_FATAL, reason);
    tracing::error!(exit_code = FATAL_EXIT_CODE, "{reason}");
    std::process::exit(FATAL_EXIT_CODE)
}

#[cfg(test)]
#[path = "../../tests/unit/host/globals.rs"]
mod tests;
