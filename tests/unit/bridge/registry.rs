use super::*;
use std::cell::Cell;

#[derive(Default)]
struct Counter {
    count: i32,
    label: String,
}

fn counter_class(arena: &Rc<RefCell<Arena<Counter>>>) -> ClassRegistry<Counter> {
    let mut class = ClassRegistry::new("Counter", Rc::clone(arena));
    class
        .constructor(&[], |arena, _| Some(arena.insert(Counter::default())))
        .constructor(&[ParamType::Int, ParamType::Str], |arena, args| {
            if args[0].as_i32() < 0 {
                return None;
            }
            Some(arena.insert(Counter {
                count: args[0].as_i32(),
                label: args[1].to_text(),
            }))
        })
        .method("add", |c: &mut Counter, n: i32| c.count += n)
        .method("add_twice", |c: &mut Counter, a: i32, b: i32| {
            c.count += a + b;
            c.count
        })
        .method_raw("absorb", &[ParamType::Object], |arena, this, args| {
            let Value::Object(other) = args[0] else {
                return None;
            };
            let (me, them) = arena.get_pair_mut(this, other)?;
            me.count += them.count;
            them.count = 0;
            Some(Value::Int(me.count))
        })
        .getter("count", |c: &Counter| c.count)
        .property("label", |c: &Counter| c.label.clone(), |c: &mut Counter, v: String| c.label = v);
    class
}

fn engine_with_counter() -> (Engine, Rc<RefCell<Arena<Counter>>>) {
    let arena = Rc::new(RefCell::new(Arena::new()));
    let mut engine = Engine::new();
    counter_class(&arena).install(&mut engine);
    (engine, arena)
}

#[test]
fn functions_marshal_arguments_and_results() {
    let mut engine = Engine::new();
    let mut reg = FunctionRegistry::new();
    reg.function("half", |x: f64| x / 2.0)
        .function("shout", |s: String| s.to_uppercase())
        .function("wrap", |x: i32| x);
    reg.install(&mut engine);

    assert_eq!(engine.eval::<f64>("half(5)").unwrap(), 2.5);
    assert_eq!(engine.eval::<String>(r#"shout("hey")"#).unwrap(), "HEY");
    assert_eq!(engine.eval::<i64>("wrap(4294967298)").unwrap(), 2);
    assert_eq!(engine.eval::<String>("shout(12)").unwrap(), "12");
}

#[test]
fn missing_arguments_yield_unit_without_calling() {
    let calls = Rc::new(Cell::new(0));
    let seen = Rc::clone(&calls);
    let mut engine = Engine::new();
    let mut reg = FunctionRegistry::new();
    reg.function("pair", move |a: i32, b: i32| {
        seen.set(seen.get() + 1);
        a + b
    });
    reg.install(&mut engine);

    assert!(engine.eval::<Dynamic>("pair(1)").unwrap().is_unit());
    assert!(engine.eval::<Dynamic>("pair()").unwrap().is_unit());
    assert_eq!(calls.get(), 0);
    assert_eq!(engine.eval::<i64>("pair(1, 2)").unwrap(), 3);
    assert_eq!(calls.get(), 1);
}

#[test]
fn variadic_functions_take_any_tail() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let mut engine = Engine::new();
    let mut reg = FunctionRegistry::new();
    reg.variadic("collect", &[], ParamType::Any, move |args| {
        sink.borrow_mut().push(args.to_vec());
        Some(Value::Int(args.len() as i32))
    });
    reg.install(&mut engine);

    assert_eq!(engine.eval::<i64>(r#"collect(1, "a", true, 2.5)"#).unwrap(), 4);
    assert_eq!(engine.eval::<i64>("collect()").unwrap(), 0);
    assert_eq!(
        seen.borrow()[0],
        vec![
            Value::Int(1),
            Value::Str("a".into()),
            Value::Bool(true),
            Value::Double(2.5)
        ]
    );
}

#[test]
fn class_constructors_methods_and_properties() {
    let (engine, arena) = engine_with_counter();
    let out = engine
        .eval::<i64>(
            r#"
            let c = Counter(2, "clicks");
            c.add(3);
            c.label = "taps";
            c.add_twice(1, 1) + c.count
            "#,
        )
        .unwrap();
    assert_eq!(out, 14);
    assert_eq!(
        engine
            .eval::<String>(r#"let c = Counter(); c.label = 5; c.label"#)
            .unwrap(),
        "5"
    );
    assert!(arena.borrow().len() >= 1);
}

#[test]
fn constructor_lenient_arity_and_rejection() {
    let (engine, _arena) = engine_with_counter();
    assert!(engine.eval::<Dynamic>("Counter(1)").unwrap().is_unit());
    assert!(engine.eval::<Dynamic>(r#"Counter(-1, "x")"#).unwrap().is_unit());
}

#[test]
fn methods_with_missing_arguments_are_no_ops() {
    let (engine, _arena) = engine_with_counter();
    let out = engine
        .eval::<i64>("let c = Counter(); c.add_twice(5); c.add(); c.count")
        .unwrap();
    assert_eq!(out, 0);
}

#[test]
fn getters_without_setters_are_read_only() {
    let (engine, _arena) = engine_with_counter();
    assert!(engine.eval::<Dynamic>("let c = Counter(); c.count = 4;").is_err());
}

#[test]
fn raw_methods_see_other_objects() {
    let (engine, _arena) = engine_with_counter();
    let out = engine
        .eval::<i64>(
            r#"
            let a = Counter(1, "a");
            let b = Counter(10, "b");
            a.absorb(b);
            a.count * 100 + b.count
            "#,
        )
        .unwrap();
    assert_eq!(out, 1100);
    assert!(
        engine
            .eval::<Dynamic>(r#"let a = Counter(1, "a"); a.absorb(a)"#)
            .unwrap()
            .is_unit()
    );
}

#[test]
fn dropped_script_objects_are_swept() {
    let (engine, arena) = engine_with_counter();
    engine.run("let a = Counter(); let b = Counter(); a.add(1);").unwrap();
    assert_eq!(arena.borrow().len(), 2);
    assert_eq!(arena.borrow_mut().sweep(), 2);
    assert!(arena.borrow().is_empty());
}

#[test]
fn objects_print_with_their_class_name() {
    let (engine, _arena) = engine_with_counter();
    let s = engine.eval::<String>("let c = Counter(); `${c}`").unwrap();
    assert!(s.starts_with("[Counter #"), "{s}");
}

#[test]
fn surplus_arguments_are_dropped() {
    let mut engine = Engine::new();
    let mut reg = FunctionRegistry::new();
    reg.function("pair", |a: i32, b: i32| a + b)
        .function("pair", |a: i32| a);
    reg.install(&mut engine);
    assert_eq!(engine.eval::<i64>("pair(1, 2, 40)").unwrap(), 3);
    assert_eq!(engine.eval::<i64>(r#"pair(1, 2, "x", (), 5, 6)"#).unwrap(), 3);
    assert!(engine.eval::<Dynamic>("pair(1, 2, 3, 4, 5, 6, 7)").is_err());

    let (engine, _arena) = engine_with_counter();
    let out = engine
        .eval::<i64>(
            r#"
            let c = Counter(1, "x", 500);
            c.add(2, 100);
            c.add_twice(1, 1, 1, 1);
            c.count
            "#,
        )
        .unwrap();
    assert_eq!(out, 5);
}
