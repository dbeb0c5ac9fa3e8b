//! Script ↔ native bridge.
//!
//! Native closures are registered in a [`FunctionRegistry`] or, for object types, a
//! [`ClassRegistry`], then installed into a Rhai [`rhai::Engine`]. Arguments are converted
//! positionally into [`Value`]s by the declared [`ParamType`] of each parameter. A call that
//! supplies fewer arguments than a function expects evaluates to unit without running it.
//!
//! Native objects never cross into the script by pointer: they live in an [`Arena`] and scripts
//! hold [`ScriptObject`] handles. Dropping the last handle queues the slot for [`Arena::sweep`].

pub(crate) mod arena;
pub(crate) mod native;
pub(crate) mod registry;
pub(crate) mod value;

pub use arena::{Arena, Handle, ScriptObject};
pub use native::{NativeFn, NativeMethod};
pub use registry::{ClassRegistry, FunctionRegistry, MAX_SURPLUS_ARGS, MAX_VARIADIC_ARGS};
pub use value::{FromValue, IntoValue, ParamType, Value};
