use std::collections::HashMap;

use super::*;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_are_valid() {
    let cfg = HostConfig::default();
    cfg.validate().unwrap();
    assert!(cfg.system_fonts);
    assert_eq!(cfg.default_font, "10px sans-serif");
    assert_eq!(cfg.default_log_level, 48);
}

#[test]
fn json_fields_are_optional() {
    let cfg = HostConfig::from_json(r#"{ "system_fonts": false, "forward_unhandled": true }"#)
        .unwrap();
    assert!(!cfg.system_fonts);
    assert!(cfg.forward_unhandled);
    assert_eq!(cfg.max_frame_dimension, 8192);
}

#[test]
fn json_rejects_unknown_fields_and_bad_ranges() {
    assert!(matches!(
        HostConfig::from_json(r#"{ "fonts": [] }"#),
        Err(HostError::Config(_))
    ));
    assert!(HostConfig::from_json(r#"{ "max_frame_dimension": 70000 }"#).is_err());
    assert!(HostConfig::from_json(r#"{ "default_font": "huge" }"#).is_err());
}

#[test]
fn env_overrides_apply_and_ignore_garbage() {
    let cfg = HostConfig::default()
        .with_env_overrides(env(&[
            ("FRAMESCRIPT_SYSTEM_FONTS", "off"),
            ("FRAMESCRIPT_MAX_FRAME_DIMENSION", "not-a-number"),
        ]))
        .unwrap();
    assert!(!cfg.system_fonts);
    assert_eq!(cfg.max_frame_dimension, 8192);

    let cfg = HostConfig::default()
        .with_env_overrides(env(&[("FRAMESCRIPT_MAX_FRAME_DIMENSION", "640")]))
        .unwrap();
    assert_eq!(cfg.max_frame_dimension, 640);
}

#[test]
fn env_font_dirs_split_as_path_list() {
    let joined = std::env::join_paths(["/a/fonts", "/b/fonts"]).unwrap();
    let joined = joined.to_string_lossy().into_owned();
    let cfg = HostConfig::default()
        .with_env_overrides(env(&[("FRAMESCRIPT_FONT_DIRS", joined.as_str())]))
        .unwrap();
    assert_eq!(
        cfg.font_dirs,
        vec![PathBuf::from("/a/fonts"), PathBuf::from("/b/fonts")]
    );
}

#[test]
fn missing_config_file_is_a_config_error() {
    let err = HostConfig::from_path("/nonexistent/framescript-host.json").unwrap_err();
    assert!(matches!(err, HostError::Config(_)));
}
