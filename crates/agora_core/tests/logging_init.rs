use agora_core::{init_logging, logging_status, LogTarget};

#[test]
fn init_logging_is_idempotent_and_rejects_reconfiguration() {
    let dir = tempfile::tempdir().expect("temp dir");
    let target = LogTarget::Directory(dir.path().join("logs"));
    let other = LogTarget::Directory(dir.path().join("other"));

    init_logging("info", target.clone()).expect("first init should succeed");
    init_logging("INFO", target.clone()).expect("same config should be idempotent");

    let level_error = init_logging("debug", target.clone()).expect_err("level switch must fail");
    assert!(level_error.contains("refusing to switch"));
    let target_error = init_logging("info", other).expect_err("target switch must fail");
    assert!(target_error.contains("refusing to switch"));
    let stderr_error = init_logging("info", LogTarget::Stderr).expect_err("stderr switch must fail");
    assert!(stderr_error.contains("refusing to switch"));

    let (level, active) = logging_status().expect("logging should be active");
    assert_eq!(level, "info");
    assert_eq!(active, target);
    assert!(dir.path().join("logs").is_dir());
}

#[test]
fn init_logging_rejects_bad_input_without_starting() {
    let err = init_logging("loud", LogTarget::Stderr).expect_err("unknown level");
    assert!(err.contains("unsupported log level"));
    let err = init_logging("info", LogTarget::Directory("relative/logs".into()))
        .expect_err("relative dir");
    assert!(err.contains("absolute"));
}
