use super::*;

fn no_object(_: &Dynamic) -> Option<Handle> {
    None
}

fn conv(d: Dynamic, ty: ParamType) -> Value {
    from_dynamic(&d, ty, &no_object)
}

#[test]
fn ints_wrap_like_to_int32() {
    assert_eq!(conv(Dynamic::from(7_i64), ParamType::Int), Value::Int(7));
    assert_eq!(
        conv(Dynamic::from(4_294_967_297_i64), ParamType::Int),
        Value::Int(1)
    );
    assert_eq!(conv(Dynamic::from(-1.9_f64), ParamType::Int), Value::Int(-1));
    assert_eq!(conv(Dynamic::from(300_i64), ParamType::Byte), Value::Byte(44));
    assert_eq!(conv(Dynamic::from(-1_i64), ParamType::UInt), Value::UInt(u32::MAX));
}

#[test]
fn non_numeric_input_to_numbers() {
    assert!(matches!(conv(Dynamic::UNIT, ParamType::Double), Value::Double(v) if v.is_nan()));
    assert_eq!(conv(Dynamic::UNIT, ParamType::Int), Value::Int(0));
    assert_eq!(conv(Dynamic::from("12.5".to_string()), ParamType::Double), Value::Double(12.5));
    assert_eq!(conv(Dynamic::from(" 3 ".to_string()), ParamType::Int), Value::Int(3));
    assert_eq!(conv(Dynamic::from("abc".to_string()), ParamType::Int), Value::Int(0));
    assert_eq!(conv(Dynamic::from(true), ParamType::Double), Value::Double(1.0));
}

#[test]
fn strings_and_bools() {
    assert_eq!(conv(Dynamic::from(5_i64), ParamType::Str), Value::Str("5".into()));
    assert_eq!(conv(Dynamic::UNIT, ParamType::Str), Value::Str(String::new()));
    assert_eq!(conv(Dynamic::from("".to_string()), ParamType::Bool), Value::Bool(false));
    assert_eq!(conv(Dynamic::from("x".to_string()), ParamType::Bool), Value::Bool(true));
    assert_eq!(conv(Dynamic::from(0.0_f64), ParamType::Bool), Value::Bool(false));
    assert_eq!(conv(Dynamic::from(2_i64), ParamType::Bool), Value::Bool(true));
}

#[test]
fn any_keeps_the_closest_shape() {
    assert_eq!(conv(Dynamic::from(16_i64), ParamType::Any), Value::Int(16));
    assert_eq!(
        conv(Dynamic::from(0xFF00_00FF_i64), ParamType::Any),
        Value::Double(4_278_190_335.0)
    );
    assert_eq!(conv(Dynamic::from("red".to_string()), ParamType::Any), Value::Str("red".into()));
    assert_eq!(conv(Dynamic::UNIT, ParamType::Any), Value::Void);
}

#[test]
fn object_params_need_a_recognized_object() {
    assert_eq!(conv(Dynamic::from(1_i64), ParamType::Object), Value::Void);
}

#[test]
fn packed_colors_survive_double_round() {
    assert_eq!(Value::Double(4_278_190_335.0).as_u32(), 0xFF00_00FF);
    assert_eq!(Value::Int(-1).as_u32(), u32::MAX);
}

#[test]
fn into_dynamic_maps_to_script_types() {
    assert_eq!(Value::Int(3).into_dynamic().as_int(), Ok(3));
    assert_eq!(Value::UInt(u32::MAX).into_dynamic().as_int(), Ok(i64::from(u32::MAX)));
    assert_eq!(Value::Double(0.5).into_dynamic().as_float(), Ok(0.5));
    assert!(Value::Void.into_dynamic().is_unit());
    assert_eq!(
        Value::Str("hi".into()).into_dynamic().into_string().ok(),
        Some("hi".to_string())
    );
}

#[test]
fn text_forms() {
    assert_eq!(Value::Double(1.5).to_text(), "1.5");
    assert_eq!(Value::Bool(false).to_text(), "false");
    assert_eq!(Value::Void.to_text(), "");
}
