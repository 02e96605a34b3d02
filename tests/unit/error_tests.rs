use fleetrec::AppError;

#[test]
fn display_prefixes_each_variant() {
    assert_eq!(
        AppError::Config("bad port".into()).to_string(),
        "config: bad port"
    );
    assert_eq!(
        AppError::Spawn("ffmpeg missing".into()).to_string(),
        "spawn: ffmpeg missing"
    );
    assert_eq!(
        AppError::ShutdownTimeout("webcam".into()).to_string(),
        "shutdown timeout: webcam"
    );
    assert_eq!(
        AppError::Connection("refused".into()).to_string(),
        "connection: refused"
    );
    assert_eq!(AppError::Io("broken pipe".into()).to_string(), "io: broken pipe");
}

#[test]
fn toml_errors_convert_to_config() {
    let toml_err = toml::from_str::<toml::Value>("= nonsense").unwrap_err();
    let err: AppError = toml_err.into();
    assert!(matches!(err, AppError::Config(_)));
    assert!(err.to_string().starts_with("config:"));
}

#[test]
fn io_errors_convert_to_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
    let err: AppError = io_err.into();
    assert!(matches!(err, AppError::Io(_)));
}

#[test]
fn implements_std_error() {
    let err = AppError::Spawn("probe".into());
    let _: &dyn std::error::Error = &err;
}
