use rhai::{Dynamic, FLOAT, INT};

use crate::bridge::arena::Handle;

/// Native parameter type a script argument is converted to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamType {
    /// 32-bit signed integer (wrapping, like `ToInt32`).
    Int,
    /// 32-bit unsigned integer (wrapping).
    UInt,
    /// 8-bit unsigned integer (wrapping).
    Byte,
    /// Truthiness of the script value.
    Bool,
    /// 64-bit float; non-numeric input becomes NaN.
    Double,
    /// UTF-8 text; non-strings use their display form.
    Str,
    /// Handle of a script object of the class being called.
    Object,
    /// Whatever the script passed, in its closest native shape.
    Any,
}

/// Closed set of values crossing the script boundary.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// No value.
    Void,
    /// Signed integer.
    Int(i32),
    /// Unsigned integer.
    UInt(u32),
    /// Byte.
    Byte(u8),
    /// Boolean.
    Bool(bool),
    /// Float.
    Double(f64),
    /// Text.
    Str(String),
    /// Script object handle.
    Object(Handle),
}

impl Value {
    /// `true` for the numeric variants.
    pub fn is_number(&self) -> bool {
        matches!(
            self,
            Value::Int(_) | Value::UInt(_) | Value::Byte(_) | Value::Double(_)
        )
    }

    /// Numeric view; text is parsed, everything else is NaN or 0/1.
    pub fn as_f64(&self) -> f64 {
        match self {
            Value::Int(v) => f64::from(*v),
            Value::UInt(v) => f64::from(*v),
            Value::Byte(v) => f64::from(*v),
            Value::Double(v) => *v,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Str(s) => parse_number(s),
            Value::Void | Value::Object(_) => f64::NAN,
        }
    }

    /// Wrapping 32-bit signed view.
    pub fn as_i32(&self) -> i32 {
        match self {
            Value::Int(v) => *v,
            Value::UInt(v) => *v as i32,
            Value::Byte(v) => i32::from(*v),
            other => to_uint32(other.as_f64()) as i32,
        }
    }

    /// Wrapping 32-bit unsigned view.
    pub fn as_u32(&self) -> u32 {
        match self {
            Value::Int(v) => *v as u32,
            Value::UInt(v) => *v,
            Value::Byte(v) => u32::from(*v),
            other => to_uint32(other.as_f64()),
        }
    }

    /// Truthiness.
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(v) => *v != 0,
            Value::UInt(v) => *v != 0,
            Value::Byte(v) => *v != 0,
            Value::Double(v) => *v != 0.0 && !v.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Void => false,
            Value::Object(_) => true,
        }
    }

    /// Display form used for string parameters and log output.
    pub fn to_text(&self) -> String {
        match self {
            Value::Void => String::new(),
            Value::Int(v) => v.to_string(),
            Value::UInt(v) => v.to_string(),
            Value::Byte(v) => v.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Double(v) => v.to_string(),
            Value::Str(s) => s.clone(),
            Value::Object(h) => format!("[object #{}]", h.index()),
        }
    }

    pub(crate) fn into_dynamic(self) -> Dynamic {
        match self {
            Value::Int(v) => Dynamic::from(INT::from(v)),
            Value::UInt(v) => Dynamic::from(INT::from(v)),
            Value::Byte(v) => Dynamic::from(INT::from(v)),
            Value::Bool(b) => Dynamic::from(b),
            Value::Double(v) => Dynamic::from(v as FLOAT),
            Value::Str(s) => Dynamic::from(s),
            // Handles only travel inward; objects are returned by constructors.
            Value::Void | Value::Object(_) => Dynamic::UNIT,
        }
    }
}

fn parse_number(s: &str) -> f64 {
    let t = s.trim();
    if t.is_empty() {
        return 0.0;
    }
    t.parse().unwrap_or(f64::NAN)
}

fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() {
        return 0;
    }
    n.trunc().rem_euclid(4_294_967_296.0) as u32
}

fn dynamic_number(d: &Dynamic) -> f64 {
    if let Ok(i) = d.as_int() {
        return i as f64;
    }
    if let Ok(f) = d.as_float() {
        return f;
    }
    if let Ok(b) = d.as_bool() {
        return f64::from(u8::from(b));
    }
    if d.is_string() {
        return parse_number(&dynamic_text(d));
    }
    f64::NAN
}

fn dynamic_text(d: &Dynamic) -> String {
    if d.is_unit() {
        return String::new();
    }
    match d.clone().into_string() {
        Ok(s) => s,
        Err(_) => d.to_string(),
    }
}

/// Convert one script argument to `ty`.
///
/// `object` recognizes script objects of the class being called and yields their handle.
pub(crate) fn from_dynamic(
    d: &Dynamic,
    ty: ParamType,
    object: &dyn Fn(&Dynamic) -> Option<Handle>,
) -> Value {
    match ty {
        ParamType::Int => match d.as_int() {
            Ok(i) => Value::Int(i as i32),
            Err(_) => Value::Int(to_uint32(dynamic_number(d)) as i32),
        },
        ParamType::UInt => match d.as_int() {
            Ok(i) => Value::UInt(i as u32),
            Err(_) => Value::UInt(to_uint32(dynamic_number(d))),
        },
        ParamType::Byte => match d.as_int() {
            Ok(i) => Value::Byte(i as u8),
            Err(_) => Value::Byte(to_uint32(dynamic_number(d)) as u8),
        },
        ParamType::Bool => {
            let truthy = if let Ok(b) = d.as_bool() {
                b
            } else if d.is_unit() {
                false
            } else if d.is_string() {
                !dynamic_text(d).is_empty()
            } else if d.is_int() || d.is_float() {
                Value::Double(dynamic_number(d)).as_bool()
            } else {
                true
            };
            Value::Bool(truthy)
        }
        ParamType::Double => Value::Double(dynamic_number(d)),
        ParamType::Str => Value::Str(dynamic_text(d)),
        ParamType::Object => object(d).map(Value::Object).unwrap_or(Value::Void),
        ParamType::Any => {
            if let Some(h) = object(d) {
                Value::Object(h)
            } else if let Ok(i) = d.as_int() {
                i32::try_from(i)
                    .map(Value::Int)
                    .unwrap_or(Value::Double(i as f64))
            } else if let Ok(f) = d.as_float() {
                Value::Double(f)
            } else if let Ok(b) = d.as_bool() {
                Value::Bool(b)
            } else if d.is_unit() {
                Value::Void
            } else {
                Value::Str(dynamic_text(d))
            }
        }
    }
}

/// Native types a [`Value`] can be read as.
pub trait FromValue: Sized {
    /// Parameter type requested from the script side.
    const TYPE: ParamType;
    /// Read the value; `None` when it cannot represent `Self`.
    fn from_value(v: &Value) -> Option<Self>;
}

impl FromValue for i32 {
    const TYPE: ParamType = ParamType::Int;
    fn from_value(v: &Value) -> Option<Self> {
        Some(v.as_i32())
    }
}

impl FromValue for u32 {
    const TYPE: ParamType = ParamType::UInt;
    fn from_value(v: &Value) -> Option<Self> {
        Some(v.as_u32())
    }
}

impl FromValue for u8 {
    const TYPE: ParamType = ParamType::Byte;
    fn from_value(v: &Value) -> Option<Self> {
        Some(v.as_u32() as u8)
    }
}

impl FromValue for bool {
    const TYPE: ParamType = ParamType::Bool;
    fn from_value(v: &Value) -> Option<Self> {
        Some(v.as_bool())
    }
}

impl FromValue for f64 {
    const TYPE: ParamType = ParamType::Double;
    fn from_value(v: &Value) -> Option<Self> {
        Some(v.as_f64())
    }
}

impl FromValue for String {
    const TYPE: ParamType = ParamType::Str;
    fn from_value(v: &Value) -> Option<Self> {
        Some(v.to_text())
    }
}

impl FromValue for Handle {
    const TYPE: ParamType = ParamType::Object;
    fn from_value(v: &Value) -> Option<Self> {
        match v {
            Value::Object(h) => Some(*h),
            _ => None,
        }
    }
}

impl FromValue for Value {
    const TYPE: ParamType = ParamType::Any;
    fn from_value(v: &Value) -> Option<Self> {
        Some(v.clone())
    }
}

/// Native types that can be handed back to scripts.
pub trait IntoValue {
    /// Convert into a boundary value.
    fn into_value(self) -> Value;
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Void
    }
}

impl IntoValue for i32 {
    fn into_value(self) -> Value {
        Value::Int(self)
    }
}

impl IntoValue for u32 {
    fn into_value(self) -> Value {
        Value::UInt(self)
    }
}

impl IntoValue for u8 {
    fn into_value(self) -> Value {
        Value::Byte(self)
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Double(self)
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Str(self)
    }
}

impl IntoValue for &'static str {
    fn into_value(self) -> Value {
        Value::Str(self.to_string())
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        self.map(IntoValue::into_value).unwrap_or(Value::Void)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bridge/value.rs"]
mod tests;
