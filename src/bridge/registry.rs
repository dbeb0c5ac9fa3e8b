use std::any::TypeId;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use rhai::{Dynamic, Engine, EvalAltResult};

use crate::bridge::arena::{Arena, Handle, ScriptObject};
use crate::bridge::native::{NativeFn, NativeMethod};
use crate::bridge::value::{FromValue, IntoValue, ParamType, Value, from_dynamic};

/// Extra arguments a variadic function accepts beyond its fixed ones.
pub const MAX_VARIADIC_ARGS: usize = 12;

/// Surplus arguments tolerated (and dropped) past the widest overload of a name.
pub const MAX_SURPLUS_ARGS: usize = 4;

type Invoker = Rc<dyn Fn(&[Value]) -> Option<Value>>;
type MethodInvoker<T> = Rc<dyn Fn(&mut Arena<T>, Handle, &[Value]) -> Option<Value>>;
type Constructor<T> = Rc<dyn Fn(&mut Arena<T>, &[Value]) -> Option<ScriptObject<T>>>;
type Getter<T> = Rc<dyn Fn(&T) -> Value>;
type Setter<T> = Rc<dyn Fn(&mut T, &Value)>;

fn param_at(params: &[ParamType], rest: Option<ParamType>, i: usize) -> ParamType {
    params
        .get(i)
        .copied()
        .or(rest)
        .unwrap_or(ParamType::Any)
}

fn no_object(_: &Dynamic) -> Option<Handle> {
    None
}

fn object_of<T: 'static>(d: &Dynamic) -> Option<Handle> {
    d.read_lock::<ScriptObject<T>>().map(|o| o.handle())
}

fn arities_of(params: usize, rest: Option<ParamType>) -> std::ops::RangeInclusive<usize> {
    match rest {
        Some(_) => params..=params + MAX_VARIADIC_ARGS,
        None => params..=params,
    }
}

/// Widest declared arity per name.
fn widest_arities<'a>(
    declared: impl Iterator<Item = (&'a str, usize)>,
) -> BTreeMap<&'a str, usize> {
    let mut widest = BTreeMap::new();
    for (name, arity) in declared {
        let w = widest.entry(name).or_insert(arity);
        *w = (*w).max(arity);
    }
    widest
}

/// Arities above `top` that forward to it, when it is the widest overload of its name.
fn surplus(top: usize, widest: Option<usize>) -> std::ops::RangeInclusive<usize> {
    if widest == Some(top) {
        top + 1..=top + MAX_SURPLUS_ARGS
    } else {
        1..=0
    }
}

/// Register a no-op overload for every arity below the largest one that has no overload.
#[allow(deprecated)]
fn install_stubs(engine: &mut Engine, arities: &BTreeMap<String, BTreeSet<usize>>, receiver: Option<TypeId>) {
    for (name, set) in arities {
        let Some(&max) = set.last() else {
            continue;
        };
        for arity in (0..max).filter(|a| !set.contains(a)) {
            let mut types: Vec<TypeId> = receiver.into_iter().collect();
            types.extend(std::iter::repeat_n(TypeId::of::<Dynamic>(), arity));
            engine.register_raw_fn(name.as_str(), types, |_ctx, _args| Ok(Dynamic::UNIT));
        }
    }
}

struct FunctionBinding {
    name: String,
    params: Vec<ParamType>,
    rest: Option<ParamType>,
    invoke: Invoker,
}

/// Global native functions exposed to scripts.
#[derive(Default)]
pub struct FunctionRegistry {
    bindings: Vec<FunctionBinding>,
}

impl FunctionRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expose a typed closure under `name`. Registering the same name with another arity adds an
    /// overload.
    pub fn function<Args, F: NativeFn<Args>>(&mut self, name: &str, f: F) -> &mut Self {
        self.bindings.push(FunctionBinding {
            name: name.to_string(),
            params: F::param_types(),
            rest: None,
            invoke: Rc::new(move |args| f.invoke(args)),
        });
        self
    }

    /// Expose a closure taking `fixed` parameters followed by any number of `rest` ones.
    pub fn variadic(
        &mut self,
        name: &str,
        fixed: &[ParamType],
        rest: ParamType,
        f: impl Fn(&[Value]) -> Option<Value> + 'static,
    ) -> &mut Self {
        self.bindings.push(FunctionBinding {
            name: name.to_string(),
            params: fixed.to_vec(),
            rest: Some(rest),
            invoke: Rc::new(f),
        });
        self
    }

    /// Register every binding with `engine`.
    #[allow(deprecated)]
    pub fn install(&self, engine: &mut Engine) {
        let widest = widest_arities(
            self.bindings
                .iter()
                .map(|b| (b.name.as_str(), *arities_of(b.params.len(), b.rest).end())),
        );
        let mut arities: BTreeMap<String, BTreeSet<usize>> = BTreeMap::new();
        for b in &self.bindings {
            let declared = arities_of(b.params.len(), b.rest);
            let top = *declared.end();
            for arity in declared.chain(surplus(top, widest.get(b.name.as_str()).copied())) {
                let params = b.params.clone();
                let rest = b.rest;
                let invoke = Rc::clone(&b.invoke);
                engine.register_raw_fn(
                    b.name.as_str(),
                    vec![TypeId::of::<Dynamic>(); arity],
                    move |_ctx, args| {
                        let values: Vec<Value> = args
                            .iter()
                            .take(top)
                            .enumerate()
                            .map(|(i, d)| from_dynamic(d, param_at(&params, rest, i), &no_object))
                            .collect();
                        Ok(invoke(&values).map(Value::into_dynamic).unwrap_or(Dynamic::UNIT))
                    },
                );
                if arity <= top {
                    arities.entry(b.name.clone()).or_default().insert(arity);
                }
            }
        }
        install_stubs(engine, &arities, None);
    }
}

struct MethodBinding<T> {
    name: String,
    params: Vec<ParamType>,
    invoke: MethodInvoker<T>,
}

struct AccessorBinding<T> {
    name: String,
    get: Getter<T>,
    set: Option<(ParamType, Setter<T>)>,
}

/// A native type exposed to scripts as a class: constructor overloads, methods and properties.
pub struct ClassRegistry<T: 'static> {
    name: String,
    arena: Rc<RefCell<Arena<T>>>,
    constructors: Vec<(Vec<ParamType>, Constructor<T>)>,
    methods: Vec<MethodBinding<T>>,
    accessors: Vec<AccessorBinding<T>>,
}

impl<T: 'static> ClassRegistry<T> {
    /// New class named `name` whose objects live in `arena`.
    pub fn new(name: &str, arena: Rc<RefCell<Arena<T>>>) -> Self {
        Self {
            name: name.to_string(),
            arena,
            constructors: Vec::new(),
            methods: Vec::new(),
            accessors: Vec::new(),
        }
    }

    /// Script-visible class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Constructor overload taking `params`. Returning `None` hands unit to the script.
    pub fn constructor(
        &mut self,
        params: &[ParamType],
        f: impl Fn(&mut Arena<T>, &[Value]) -> Option<ScriptObject<T>> + 'static,
    ) -> &mut Self {
        self.constructors.push((params.to_vec(), Rc::new(f)));
        self
    }

    /// Typed method: `f(&mut this, args..)`.
    pub fn method<Args, F: NativeMethod<T, Args>>(&mut self, name: &str, f: F) -> &mut Self {
        self.methods.push(MethodBinding {
            name: name.to_string(),
            params: F::param_types(),
            invoke: Rc::new(move |arena, this, args| f.invoke(arena.get_mut(this)?, args)),
        });
        self
    }

    /// Method with access to the whole arena, for operations spanning several objects.
    pub fn method_raw(
        &mut self,
        name: &str,
        params: &[ParamType],
        f: impl Fn(&mut Arena<T>, Handle, &[Value]) -> Option<Value> + 'static,
    ) -> &mut Self {
        self.methods.push(MethodBinding {
            name: name.to_string(),
            params: params.to_vec(),
            invoke: Rc::new(f),
        });
        self
    }

    /// Read-only property.
    pub fn getter<R: IntoValue>(&mut self, name: &str, get: impl Fn(&T) -> R + 'static) -> &mut Self {
        self.accessors.push(AccessorBinding {
            name: name.to_string(),
            get: Rc::new(move |t| get(t).into_value()),
            set: None,
        });
        self
    }

    /// Read-write property.
    pub fn property<R: IntoValue, A: FromValue>(
        &mut self,
        name: &str,
        get: impl Fn(&T) -> R + 'static,
        set: impl Fn(&mut T, A) + 'static,
    ) -> &mut Self {
        let setter: Setter<T> = Rc::new(move |t, v| {
            if let Some(a) = A::from_value(v) {
                set(t, a);
            }
        });
        self.accessors.push(AccessorBinding {
            name: name.to_string(),
            get: Rc::new(move |t| get(t).into_value()),
            set: Some((A::TYPE, setter)),
        });
        self
    }

    /// Register the type, its constructors, methods and properties with `engine`.
    #[allow(deprecated)]
    pub fn install(&self, engine: &mut Engine) {
        engine.register_type_with_name::<ScriptObject<T>>(&self.name);
        let class = self.name.clone();
        engine.register_fn("to_string", move |o: &mut ScriptObject<T>| {
            format!("[{class} #{}]", o.handle().index())
        });

        let widest_ctor = self.constructors.iter().map(|(params, _)| params.len()).max();
        let mut constructor_arities = BTreeMap::new();
        for (params, ctor) in &self.constructors {
            let top = params.len();
            for arity in (top..=top).chain(surplus(top, widest_ctor)) {
                let params = params.clone();
                let ctor = Rc::clone(ctor);
                let arena = Rc::clone(&self.arena);
                let class = self.name.clone();
                engine.register_raw_fn(
                    self.name.as_str(),
                    vec![TypeId::of::<Dynamic>(); arity],
                    move |_ctx, args| {
                        let values: Vec<Value> = args
                            .iter()
                            .take(top)
                            .enumerate()
                            .map(|(i, d)| {
                                from_dynamic(d, param_at(&params, None, i), &object_of::<T>)
                            })
                            .collect();
                        let mut arena = arena.try_borrow_mut().map_err(|_| busy(&class))?;
                        Ok(ctor(&mut arena, &values).map(Dynamic::from).unwrap_or(Dynamic::UNIT))
                    },
                );
            }
            constructor_arities
                .entry(self.name.clone())
                .or_insert_with(BTreeSet::new)
                .insert(top);
        }
        install_stubs(engine, &constructor_arities, None);

        let widest = widest_arities(self.methods.iter().map(|m| (m.name.as_str(), m.params.len())));
        let mut method_arities: BTreeMap<String, BTreeSet<usize>> = BTreeMap::new();
        for m in &self.methods {
            let top = m.params.len();
            for arity in (top..=top).chain(surplus(top, widest.get(m.name.as_str()).copied())) {
                let params = m.params.clone();
                let invoke = Rc::clone(&m.invoke);
                let arena = Rc::clone(&self.arena);
                let label = format!("{}.{}", self.name, m.name);
                let mut types = vec![TypeId::of::<ScriptObject<T>>()];
                types.extend(std::iter::repeat_n(TypeId::of::<Dynamic>(), arity));
                engine.register_raw_fn(m.name.as_str(), types, move |_ctx, args| {
                    let Some((this, rest)) = args.split_first() else {
                        return Ok(Dynamic::UNIT);
                    };
                    let Some(this) = object_of::<T>(this) else {
                        return Ok(Dynamic::UNIT);
                    };
                    let values: Vec<Value> = rest
                        .iter()
                        .take(top)
                        .enumerate()
                        .map(|(i, d)| from_dynamic(d, param_at(&params, None, i), &object_of::<T>))
                        .collect();
                    let mut arena = arena.try_borrow_mut().map_err(|_| busy(&label))?;
                    Ok(invoke(&mut arena, this, &values)
                        .map(Value::into_dynamic)
                        .unwrap_or(Dynamic::UNIT))
                });
            }
            method_arities.entry(m.name.clone()).or_default().insert(top);
        }
        install_stubs(engine, &method_arities, Some(TypeId::of::<ScriptObject<T>>()));

        for a in &self.accessors {
            let get = Rc::clone(&a.get);
            let arena = Rc::clone(&self.arena);
            engine.register_get(a.name.as_str(), move |o: &mut ScriptObject<T>| -> Dynamic {
                let Ok(arena) = arena.try_borrow() else {
                    return Dynamic::UNIT;
                };
                arena
                    .get(o.handle())
                    .map(|t| get(t).into_dynamic())
                    .unwrap_or(Dynamic::UNIT)
            });
            if let Some((ty, set)) = &a.set {
                let (ty, set) = (*ty, Rc::clone(set));
                let arena = Rc::clone(&self.arena);
                engine.register_set(a.name.as_str(), move |o: &mut ScriptObject<T>, value: Dynamic| {
                    let v = from_dynamic(&value, ty, &object_of::<T>);
                    if let Ok(mut arena) = arena.try_borrow_mut()
                        && let Some(t) = arena.get_mut(o.handle())
                    {
                        set(t, &v);
                    }
                });
            }
        }
    }
}

fn busy(what: &str) -> Box<EvalAltResult> {
    format!("{what}: object storage is busy").into()
}

#[cfg(test)]
#[path = "../../tests/unit/bridge/registry.rs"]
mod tests;
