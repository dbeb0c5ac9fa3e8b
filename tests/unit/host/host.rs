use super::*;

fn hook_of(code: &str) -> HostResult<Option<HookArity>> {
    let ast = Engine::new().compile(code).unwrap();
    resolve_hook(&ast)
}

#[test]
fn hook_arity_is_detected() {
    assert_eq!(hook_of("let x = 1;").unwrap(), None);
    assert_eq!(
        hook_of("fn receive_video_frame(f) {}").unwrap(),
        Some(HookArity::Frame)
    );
    assert_eq!(
        hook_of("fn receive_video_frame(f, pad) {}").unwrap(),
        Some(HookArity::FrameAndPad)
    );
    assert_eq!(
        hook_of("fn receive_video_frame(f) {} fn receive_video_frame(f, p) {}").unwrap(),
        Some(HookArity::FrameAndPad)
    );
    assert!(hook_of("fn receive_video_frame() {}").is_err());
}

#[test]
fn inline_sources_read_back() {
    let (name, code) = ScriptSource::inline("demo", "1").read().unwrap();
    assert_eq!((name.as_str(), code.as_str()), ("demo", "1"));
    assert!(
        ScriptSource::Path(PathBuf::from("/nonexistent/framescript.rhai"))
            .read()
            .is_err()
    );
}

fn quiet_config() -> HostConfig {
    HostConfig {
        system_fonts: false,
        ..HostConfig::default()
    }
}

#[test]
fn state_walks_through_the_lifecycle() {
    let mut host = PipelineHost::with_config(
        ScriptSource::inline("t", "fn receive_video_frame(f) {}"),
        InMemorySink::new(),
        Some(Box::new(|_: i32, _: &str| {})),
        quiet_config(),
    )
    .unwrap();
    assert_eq!(host.state(), HostState::Loaded);

    let px = [0u8; 4];
    let frame = InputFrame {
        width: 1,
        height: 1,
        stride: 4,
        pts: 0.0,
        pixels: &px,
        pad: 0,
    };
    host.deliver(frame).unwrap();
    assert_eq!(host.state(), HostState::Running);

    host.dispose();
    host.dispose();
    assert_eq!(host.state(), HostState::Disposed);
    assert!(matches!(host.deliver(frame), Err(HostError::Disposed)));
}

#[test]
fn delivered_frames_are_swept_after_the_hook() {
    let mut host = PipelineHost::with_config(
        ScriptSource::inline("t", "fn receive_video_frame(f) { let copy = VideoFrame(1, 1, 0, f); }"),
        InMemorySink::new(),
        Some(Box::new(|_: i32, _: &str| {})),
        quiet_config(),
    )
    .unwrap();
    let px = [9u8; 4];
    host.deliver(InputFrame {
        width: 1,
        height: 1,
        stride: 4,
        pts: 0.0,
        pixels: &px,
        pad: 0,
    })
    .unwrap();
    assert!(host.shared.arena.borrow().is_empty());
}
