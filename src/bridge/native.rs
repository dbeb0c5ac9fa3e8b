use crate::bridge::value::{FromValue, IntoValue, ParamType, Value};

/// A Rust closure callable as a script function.
///
/// Implemented for `Fn(A1, .., An) -> R` with up to six [`FromValue`] parameters.
pub trait NativeFn<Args>: 'static {
    /// Declared parameter types, in order.
    fn param_types() -> Vec<ParamType>;
    /// Call with already-converted arguments; `None` when an argument cannot be read.
    fn invoke(&self, args: &[Value]) -> Option<Value>;
}

/// A Rust closure callable as a script method on `T`.
pub trait NativeMethod<T, Args>: 'static {
    /// Declared parameter types, receiver excluded.
    fn param_types() -> Vec<ParamType>;
    /// Call on `this` with already-converted arguments.
    fn invoke(&self, this: &mut T, args: &[Value]) -> Option<Value>;
}

macro_rules! impl_native {
    ($($arg:ident : $idx:tt),*) => {
        impl<F, R, $($arg,)*> NativeFn<($($arg,)*)> for F
        where
            F: Fn($($arg),*) -> R + 'static,
            R: IntoValue,
            $($arg: FromValue,)*
        {
            fn param_types() -> Vec<ParamType> {
                vec![$($arg::TYPE),*]
            }

            #[allow(unused_variables)]
            fn invoke(&self, args: &[Value]) -> Option<Value> {
                Some((self)($($arg::from_value(args.get($idx)?)?),*).into_value())
            }
        }

        impl<T, F, R, $($arg,)*> NativeMethod<T, ($($arg,)*)> for F
        where
            F: Fn(&mut T, $($arg),*) -> R + 'static,
            R: IntoValue,
            $($arg: FromValue,)*
        {
            fn param_types() -> Vec<ParamType> {
                vec![$($arg::TYPE),*]
            }

            #[allow(unused_variables)]
            fn invoke(&self, this: &mut T, args: &[Value]) -> Option<Value> {
                Some((self)(this, $($arg::from_value(args.get($idx)?)?),*).into_value())
            }
        }
    };
}

impl_native!();
impl_native!(A1: 0);
impl_native!(A1: 0, A2: 1);
impl_native!(A1: 0, A2: 1, A3: 2);
impl_native!(A1: 0, A2: 1, A3: 2, A4: 3);
impl_native!(A1: 0, A2: 1, A3: 2, A4: 3, A5: 4);
impl_native!(A1: 0, A2: 1, A3: 2, A4: 3, A5: 4, A6: 5);
