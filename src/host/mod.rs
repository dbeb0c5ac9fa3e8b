//! The pipeline host: loads one script and drives it frame by frame.
//!
//! Lifecycle: [`PipelineHost::init`] (or [`PipelineHost::with_config`]) compiles the script and
//! runs its top-level code once, which is the only time `make_pads(n)` is honoured. Each
//! [`PipelineHost::deliver`] copies the caller's pixels into a fresh `VideoFrame` and calls the
//! script's `receive_video_frame(frame)` or `receive_video_frame(frame, pad)`. Frames the script
//! passes to `send_video_frame` reach the [`FrameSink`] synchronously.
//!
//! Top-level variables are copied into an object map that every hook call sees as `this`, so
//! scripts keep state across frames with `this.name`.

mod globals;
/// Log levels and sinks.
pub mod log;
mod platform;
mod sink;

pub use globals::FATAL_EXIT_CODE;
pub use log::LogSink;
pub use platform::ScriptPlatform;
pub use sink::{FrameSink, InMemorySink, OutputFrame};

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use rhai::{AST, CallFnOptions, Dynamic, Engine, INT, Map, Scope};

use crate::bridge::{Arena, ScriptObject};
use crate::foundation::config::HostConfig;
use crate::foundation::error::{HostError, HostResult};
use crate::foundation::pixels::PixelBuffer;
use crate::frame::{Frame, FrameBinding};
use crate::surface::{FontBook, SystemFonts, Typesetter};
use globals::HostShared;
use log::{LEVEL_ERROR, Logger};

/// Name of the optional per-frame script callback.
pub const FRAME_HOOK: &str = "receive_video_frame";

/// Host lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostState {
    /// Script top-level code is running.
    Uninitialized,
    /// Script loaded; no frame delivered yet.
    Loaded,
    /// At least one frame delivered.
    Running,
    /// Disposed; every call fails.
    Disposed,
}

/// Where the script text comes from.
#[derive(Clone, Debug)]
pub enum ScriptSource {
    /// A `.rhai` file.
    Path(PathBuf),
    /// Script text held in memory; `name` labels diagnostics.
    Inline {
        /// Label used in error messages.
        name: String,
        /// Script text.
        code: String,
    },
}

impl ScriptSource {
    /// In-memory script.
    pub fn inline(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Inline {
            name: name.into(),
            code: code.into(),
        }
    }

    fn read(&self) -> HostResult<(String, String)> {
        match self {
            Self::Path(path) => {
                let code = std::fs::read_to_string(path).map_err(|e| {
                    HostError::script(format!("read script '{}': {e}", path.display()))
                })?;
                Ok((path.display().to_string(), code))
            }
            Self::Inline { name, code } => Ok((name.clone(), code.clone())),
        }
    }
}

/// One raw frame handed to the host.
#[derive(Clone, Copy, Debug)]
pub struct InputFrame<'a> {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Bytes between the starts of consecutive rows; at least `width * 4`.
    pub stride: usize,
    /// Presentation timestamp.
    pub pts: f64,
    /// Premultiplied RGBA8 rows.
    pub pixels: &'a [u8],
    /// Input pad the frame arrived on.
    pub pad: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HookArity {
    Frame,
    FrameAndPad,
}

struct ScriptRuntime {
    engine: Engine,
    ast: AST,
    this: Dynamic,
    hook: Option<HookArity>,
}

impl ScriptRuntime {
    fn call_hook(
        &mut self,
        hook: HookArity,
        frame: ScriptObject<Frame>,
        pad: u32,
    ) -> Result<(), Box<rhai::EvalAltResult>> {
        let mut scope = Scope::new();
        let options = CallFnOptions::new()
            .eval_ast(false)
            .rewind_scope(true)
            .bind_this_ptr(&mut self.this);
        let frame = Dynamic::from(frame);
        match hook {
            HookArity::Frame => self.engine.call_fn_with_options::<Dynamic>(
                options,
                &mut scope,
                &self.ast,
                FRAME_HOOK,
                (frame,),
            ),
            HookArity::FrameAndPad => self.engine.call_fn_with_options::<Dynamic>(
                options,
                &mut scope,
                &self.ast,
                FRAME_HOOK,
                (frame, INT::from(pad)),
            ),
        }
        .map(drop)
    }
}

/// A loaded script bound to a frame sink.
///
/// Not `Send`: a host and everything its script touches stay on the thread that created it.
pub struct PipelineHost {
    shared: Rc<HostShared>,
    script: Option<ScriptRuntime>,
    config: HostConfig,
    platform: Option<Arc<ScriptPlatform>>,
}

impl PipelineHost {
    /// Load the script at `path` with configuration taken from the environment.
    ///
    /// `log` receives script and host messages; `None` writes them to standard error.
    #[tracing::instrument(skip_all, fields(script = %path.as_ref().display()))]
    pub fn init(
        path: impl AsRef<Path>,
        sink: impl FrameSink + 'static,
        log: Option<Box<dyn LogSink>>,
    ) -> HostResult<Self> {
        let config = HostConfig::from_env()?;
        Self::with_config(ScriptSource::Path(path.as_ref().to_path_buf()), sink, log, config)
    }

    /// Load `source` with an explicit configuration.
    pub fn with_config(
        source: ScriptSource,
        sink: impl FrameSink + 'static,
        log: Option<Box<dyn LogSink>>,
        config: HostConfig,
    ) -> HostResult<Self> {
        config.validate()?;
        let (name, code) = source.read()?;

        let platform = ScriptPlatform::acquire();
        let shared = Rc::new(HostShared {
            state: Cell::new(HostState::Uninitialized),
            pads: Cell::new(1),
            sink: RefCell::new(Box::new(sink)),
            logger: Logger::new(log),
            arena: Rc::new(RefCell::new(Arena::new())),
        });

        let system: Option<SystemFonts> = config.system_fonts.then(|| {
            let platform = Arc::clone(&platform);
            Box::new(move || platform.system_fonts()) as SystemFonts
        });
        let typesetter = Typesetter::new(FontBook::new(config.font_dirs.clone(), system));

        let mut engine = Engine::new();
        globals::install(&mut engine, &shared, &config);
        FrameBinding::new(
            Rc::clone(&shared.arena),
            Rc::new(RefCell::new(typesetter)),
            &config,
        )
        .install(&mut engine);

        let load_error = |stage: &str, e: &dyn std::fmt::Display| {
            let msg = format!("{name}: {stage} failed: {e}");
            shared.logger.log(LEVEL_ERROR, &msg);
            HostError::script(msg)
        };
        let ast = engine.compile(&code).map_err(|e| load_error("compile", &e))?;
        let mut scope = Scope::new();
        engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(|e| load_error("run", &e))?;
        let hook = resolve_hook(&ast).map_err(|e| load_error("load", &e))?;

        let mut state = Map::new();
        for (var, _, value) in scope.iter() {
            state.insert(var.into(), value);
        }
        drop(scope);
        shared.arena.borrow_mut().sweep();
        shared.state.set(HostState::Loaded);
        tracing::debug!(pads = shared.pads.get(), ?hook, "script loaded");

        Ok(Self {
            shared,
            script: Some(ScriptRuntime {
                engine,
                ast,
                this: Dynamic::from_map(state),
                hook,
            }),
            config,
            platform: Some(platform),
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> HostState {
        self.shared.state.get()
    }

    /// Number of input pads the script declared (at least 1).
    pub fn input_pad_count(&self) -> u32 {
        self.shared.pads.get()
    }

    /// Effective configuration.
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Hand one frame to the script.
    ///
    /// Fails on malformed input, an out-of-range pad, a script runtime error, or after
    /// [`PipelineHost::dispose`].
    #[tracing::instrument(skip_all, fields(width = input.width, height = input.height, pad = input.pad))]
    pub fn deliver(&mut self, input: InputFrame<'_>) -> HostResult<()> {
        let Some(runtime) = self.script.as_mut() else {
            return Err(HostError::Disposed);
        };
        let pads = self.shared.pads.get();
        if input.pad >= pads {
            return Err(HostError::validation(format!(
                "pad {} out of range; script declared {pads}",
                input.pad
            )));
        }
        let max = self.config.max_frame_dimension;
        if input.width > max || input.height > max {
            return Err(HostError::validation(format!(
                "frame {}x{} exceeds max_frame_dimension {max}",
                input.width, input.height
            )));
        }
        let pixels = PixelBuffer::from_strided(input.width, input.height, input.stride, input.pixels)?;
        self.shared.state.set(HostState::Running);

        let result = match runtime.hook {
            Some(hook) => {
                let frame = Frame::from_pixels(pixels, input.pts, input.pad)?;
                let frame = self.shared.arena.borrow_mut().insert(frame);
                runtime.call_hook(hook, frame, input.pad).map_err(|e| {
                    let msg = format!("{FRAME_HOOK}: {e}");
                    self.shared.logger.log(LEVEL_ERROR, &msg);
                    HostError::script(msg)
                })
            }
            None if self.config.forward_unhandled => {
                let frame = OutputFrame {
                    width: input.width,
                    height: input.height,
                    pts: input.pts,
                    pad: input.pad,
                    data: pixels.as_bytes().to_vec(),
                };
                let mut sink = self.shared.sink.borrow_mut();
                sink.frame_received(frame)
            }
            None => Ok(()),
        };

        let freed = self.shared.arena.borrow_mut().sweep();
        tracing::trace!(freed, live = self.shared.arena.borrow().len(), "frames swept");
        result
    }

    /// Release the script and every frame it holds. Idempotent; also runs on drop.
    pub fn dispose(&mut self) {
        if self.state() == HostState::Disposed {
            return;
        }
        self.script = None;
        if let Ok(mut arena) = self.shared.arena.try_borrow_mut() {
            arena.clear();
        }
        self.platform = None;
        self.shared.state.set(HostState::Disposed);
        tracing::debug!("host disposed");
    }
}

impl Drop for PipelineHost {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn resolve_hook(ast: &AST) -> HostResult<Option<HookArity>> {
    let mut hook = None;
    for f in ast.iter_functions().filter(|f| f.name == FRAME_HOOK) {
        match f.params.len() {
            1 => hook = hook.or(Some(HookArity::Frame)),
            2 => hook = Some(HookArity::FrameAndPad),
            n => {
                return Err(HostError::script(format!(
                    "{FRAME_HOOK} must take (frame) or (frame, pad), found {n} parameters"
                )));
            }
        }
    }
    Ok(hook)
}

#[cfg(test)]
#[path = "../../tests/unit/host/host.rs"]
mod tests;
