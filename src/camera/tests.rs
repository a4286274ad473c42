use super::mock::{solid_frame, ScriptedSource, Step};
use super::*;
use crate::config::CameraConfig;
use crate::error::{CameraError, GesturecamError};

#[test]
fn test_guard_releases_on_drop() {
    let mut source = ScriptedSource::with_frames(vec![solid_frame(0, 2, 2, [1, 2, 3])]);
    {
        let mut guard = CameraGuard::acquire(&mut source).unwrap();
        assert!(guard.read_frame().unwrap().is_some());
        assert!(guard.read_frame().unwrap().is_none());
    }
    assert_eq!(source.opens, 1);
    assert_eq!(source.releases, 1);
}

#[test]
fn test_guard_releases_when_open_fails() {
    let mut source = ScriptedSource::failing_open();
    let result = CameraGuard::acquire(&mut source).map(|_| ());
    assert!(matches!(
        result,
        Err(GesturecamError::Camera(CameraError::DeviceOpen { .. }))
    ));
    assert_eq!(source.releases, 1);
    assert_eq!(source.reads, 0);
}

#[test]
fn test_guard_releases_on_panic() {
    let mut source = ScriptedSource::default();
    source.steps.push_back(Step::Fail);

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _guard = CameraGuard::acquire(&mut source).unwrap();
        panic!("session blew up");
    }));
    assert!(outcome.is_err());
    assert_eq!(source.releases, 1);
}

#[test]
fn test_boxed_source_through_guard() {
    let mut source: Box<dyn FrameSource + Send> =
        Box::new(ScriptedSource::with_frames(vec![solid_frame(4, 1, 1, [0, 0, 0])]));
    let mut guard = CameraGuard::acquire(&mut source).unwrap();
    assert_eq!(guard.read_frame().unwrap().unwrap().id, 4);
    assert_eq!(guard.describe(), "scripted source");
}

#[test]
fn test_builder_requires_config() {
    assert!(FrameSourceBuilder::new().build().is_err());
}

#[cfg(feature = "skin_detection")]
#[test]
fn test_builder_prefers_frames_dir() {
    let config = CameraConfig {
        frames_dir: Some("recorded".to_string()),
        ..CameraConfig::default()
    };
    let source = FrameSourceBuilder::new().config(config).build().unwrap();
    assert_eq!(source.describe(), "image directory recorded");
}

#[cfg(not(all(feature = "camera", target_os = "linux")))]
#[test]
fn test_builder_without_camera_support() {
    let result = FrameSourceBuilder::new()
        .config(CameraConfig::default())
        .build();
    assert!(matches!(
        result,
        Err(GesturecamError::Camera(CameraError::Configuration { .. }))
    ));
}
