use std::path::Path;

use fleetrec::config::CaptureConfig;
use fleetrec::recorder::launcher::{resolve_output_dir, screen_args, webcam_args};

fn config() -> CaptureConfig {
    CaptureConfig::default()
}

#[test]
fn screen_args_without_audio_disable_the_audio_track() {
    let args = screen_args(&config(), Path::new("out/screen.mp4"));

    assert_eq!(args.first().map(String::as_str), Some("-y"));
    assert!(args.contains(&"-an".to_owned()));
    assert!(!args.contains(&"-map".to_owned()));
    assert!(args.contains(&"ultrafast".to_owned()));
    assert_eq!(args.last().map(String::as_str), Some("out/screen.mp4"));
}

#[test]
fn screen_args_with_audio_map_both_inputs() {
    let mut cfg = config();
    cfg.screen_audio_device = "Stereo Mix".into();
    let args = screen_args(&cfg, Path::new("out/screen.mp4"));

    assert!(args.contains(&"-map".to_owned()));
    assert!(args.contains(&"0:v".to_owned()));
    assert!(args.contains(&"1:a".to_owned()));
    assert!(args.contains(&"aac".to_owned()));
    assert!(!args.contains(&"-an".to_owned()));
}

#[test]
fn screen_args_use_the_configured_framerate() {
    let mut cfg = config();
    cfg.framerate = 60;
    let args = screen_args(&cfg, Path::new("out/screen.mp4"));

    let framerate_value = args
        .iter()
        .position(|arg| arg == "-framerate")
        .and_then(|pos| args.get(pos + 1));
    assert_eq!(framerate_value.map(String::as_str), Some("60"));
}

#[cfg(unix)]
#[test]
fn webcam_args_capture_the_configured_device() {
    let mut cfg = config();
    cfg.webcam_device = "/dev/video7".into();
    let args = webcam_args(&cfg, Path::new("out/webcam.mp4"));

    assert!(args.contains(&"v4l2".to_owned()));
    assert!(args.contains(&"/dev/video7".to_owned()));
    assert!(args.contains(&"-an".to_owned()));
    assert_eq!(args.last().map(String::as_str), Some("out/webcam.mp4"));
}

#[cfg(unix)]
#[test]
fn webcam_args_with_mic_add_an_audio_input() {
    let mut cfg = config();
    cfg.webcam_audio_device = "default".into();
    let args = webcam_args(&cfg, Path::new("out/webcam.mp4"));

    assert!(args.contains(&"pulse".to_owned()));
    assert!(args.contains(&"aac".to_owned()));
    assert!(args.contains(&"-map".to_owned()));
    assert!(!args.contains(&"-an".to_owned()));
}

#[test]
fn output_dir_is_created_on_demand() {
    let temp = tempfile::tempdir().expect("tempdir");
    let nested = temp.path().join("captures").join("today");

    let resolved = resolve_output_dir(&nested).expect("resolve");
    assert_eq!(resolved, nested);
    assert!(nested.is_dir());
}
