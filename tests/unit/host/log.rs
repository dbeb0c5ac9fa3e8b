use super::*;
use std::rc::Rc;

#[test]
fn level_bands() {
    assert_eq!(level_name(LEVEL_PANIC), "panic");
    assert_eq!(level_name(-3), "panic");
    assert_eq!(level_name(LEVEL_FATAL), "fatal");
    assert_eq!(level_name(LEVEL_ERROR + 1), "error");
    assert_eq!(level_name(LEVEL_WARNING), "warning");
    assert_eq!(level_name(LEVEL_INFO), "info");
    assert_eq!(level_name(LEVEL_VERBOSE), "verbose");
    assert_eq!(level_name(LEVEL_DEBUG), "debug");
    assert_eq!(level_name(LEVEL_TRACE), "trace");
    assert_eq!(level_name(1000), "trace");
}

#[test]
fn closures_receive_messages() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let logger = Logger::new(Some(Box::new(move |level: i32, msg: &str| {
        sink.borrow_mut().push((level, msg.to_string()));
    })));
    logger.log(LEVEL_INFO, "hello");
    logger.log(LEVEL_ERROR, "oops");
    assert_eq!(
        *seen.borrow(),
        vec![(LEVEL_INFO, "hello".to_string()), (LEVEL_ERROR, "oops".to_string())]
    );
}

#[test]
fn missing_sink_falls_back_to_stderr() {
    Logger::new(None).log(LEVEL_DEBUG, "to stderr");
}
