use predicates::str::contains;
use std::path::Path;
use tempfile::tempdir;

fn cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("slack-archive");
    cmd.current_dir(home)
        .env("SLACK_ARCHIVE_HOME", home)
        .env_remove("SLACK_TOKEN")
        .env_remove("SLACK_ARCHIVE_CONFIG_PATH")
        .env_remove("SLACK_ARCHIVE_LOGS_DIR")
        .env_remove("SLACK_ARCHIVE_STORAGE")
        .env_remove("SLACK_ARCHIVE_TIMEZONE")
        .env_remove("SLACK_ARCHIVE_DRIVE_ROOT")
        .env_remove("SLACK_ARCHIVE_DRIVE_TOKEN")
        .env_remove("SLACK_ARCHIVE_DIR");
    cmd
}

#[test]
fn archive_without_token_fails_before_writing_anything() {
    let tmp = tempdir().expect("tempdir");

    cmd(tmp.path())
        .arg("archive")
        .assert()
        .failure()
        .stderr(contains("SLACK_TOKEN is not set"));

    assert!(!tmp.path().join("archive").exists());
    assert!(!tmp.path().join("logs/archive.lock").exists());
}

#[test]
fn drive_storage_requires_root_folder() {
    let tmp = tempdir().expect("tempdir");

    cmd(tmp.path())
        .env("SLACK_TOKEN", "xoxp-test")
        .args(["archive", "--storage", "drive"])
        .assert()
        .failure()
        .stderr(contains("SLACK_ARCHIVE_DRIVE_ROOT"));
}

#[test]
fn drive_storage_without_token_fails_before_taking_the_lock() {
    let tmp = tempdir().expect("tempdir");

    cmd(tmp.path())
        .env("SLACK_TOKEN", "xoxp-test")
        .env("SLACK_ARCHIVE_DRIVE_ROOT", "folder-1")
        .args(["archive", "--storage", "drive"])
        .assert()
        .failure()
        .stderr(contains("SLACK_ARCHIVE_DRIVE_TOKEN"));

    assert!(!tmp.path().join("logs/archive.lock").exists());
}

#[test]
fn unknown_storage_flag_is_rejected() {
    let tmp = tempdir().expect("tempdir");

    cmd(tmp.path())
        .args(["archive", "--storage", "s3"])
        .assert()
        .failure()
        .stderr(contains("unknown storage kind"));
}

#[test]
fn invalid_timezone_is_a_config_error() {
    let tmp = tempdir().expect("tempdir");

    cmd(tmp.path())
        .env("SLACK_TOKEN", "xoxp-test")
        .env("SLACK_ARCHIVE_TIMEZONE", "Mars/Olympus")
        .arg("archive")
        .assert()
        .failure()
        .stderr(contains("config invalid: timezone"));
}

#[test]
fn channels_without_token_fails() {
    let tmp = tempdir().expect("tempdir");

    cmd(tmp.path())
        .arg("channels")
        .assert()
        .failure()
        .stderr(contains("SLACK_TOKEN is not set"));
}
