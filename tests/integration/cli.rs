//! Behaviour of the `rombot_updater` binary.

use super::{OWNER, REPO, mount_release, zipball_path};
use assert_cmd::Command;
use assert_cmd::assert::{Assert, OutputAssertExt};
use predicates::prelude::*;
use rombot_updater::test_utils::ArchiveBuilder;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn updater_command() -> Command {
    let mut cmd = Command::cargo_bin("rombot_updater").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("GITHUB_TOKEN")
        .env_remove("ROMBOT_UPDATER_CONFIG")
        .env("ROMBOT_UPDATER_NO_PROGRESS", "1")
        .env("NO_COLOR", "1");
    cmd
}

/// Write a configuration file pointing the updater at `server`.
fn write_config(dir: &Path, server: &MockServer, install_root: &Path) -> std::path::PathBuf {
    let config_path = dir.join("rombot-updater.toml");
    let contents = format!(
        "api_base_url = '{}'\ninstall_root = '{}'\npause_after_update_secs = 0\n",
        server.uri(),
        install_root.display()
    );
    fs::write(&config_path, contents).unwrap();
    config_path
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(mut cmd: Command) -> Assert {
    tokio::task::spawn_blocking(move || cmd.output().unwrap()).await.unwrap().assert()
}

#[test]
fn test_invalid_command_exits_successfully() {
    let temp = TempDir::new().unwrap();
    let mut cmd = updater_command();
    cmd.current_dir(temp.path())
        .arg("frobnicate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Invalid command: `frobnicate`"));
}

#[test]
fn test_verbose_and_quiet_conflict() {
    let mut cmd = updater_command();
    cmd.args(["-v", "-q", "check"]).assert().failure();
}

#[test]
fn test_unreadable_config_exits_with_error() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("broken.toml");
    fs::write(&config_path, "release_list_size = [").unwrap();

    let mut cmd = updater_command();
    cmd.current_dir(temp.path())
        .arg("--config")
        .arg(&config_path)
        .arg("check")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to load updater configuration"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_check_lists_stable_releases() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/repos/{OWNER}/{REPO}/releases")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"tag_name": "v3", "draft": false, "prerelease": true},
            {"tag_name": "v2", "draft": false, "prerelease": false},
            {"tag_name": "v1", "draft": true, "prerelease": false}
        ])))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let config_path = write_config(temp.path(), &server, temp.path());

    let mut cmd = updater_command();
    cmd.current_dir(temp.path()).arg("-q").arg("-c").arg(&config_path).args(["check", "ignored"]);

    run(cmd).await.success().stdout("Recent releases:\nv2\n");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_update_installs_release() {
    let server = MockServer::start().await;
    let archive = ArchiveBuilder::new("SolarStrike-Software-rom-bot-9f8e7d")
        .file("bot.lua", b"bot v4")
        .file("cache/.keep", b"");
    mount_release(&server, "v4", &archive).await;

    let temp = TempDir::new().unwrap();
    let install_root = temp.path().join("rom");
    fs::create_dir_all(install_root.join("cache")).unwrap();
    fs::write(install_root.join("cache/texts.lua"), b"stale").unwrap();
    let config_path = write_config(temp.path(), &server, &install_root);

    let mut cmd = updater_command();
    cmd.current_dir(temp.path())
        .args(["-q", "--no-progress", "-c"])
        .arg(&config_path)
        .args(["update", "v4"]);

    run(cmd).await.success().stdout(predicate::str::contains("All files updated successfully!"));

    assert_eq!(fs::read(install_root.join("bot.lua")).unwrap(), b"bot v4");
    assert!(install_root.join("cache/.keep").exists());
    assert!(!install_root.join("cache/texts.lua").exists());
    assert!(install_root.join(".tmp/v4.zip").exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_install_dir_flag_overrides_config() {
    let server = MockServer::start().await;
    let archive = ArchiveBuilder::new("root").file("bot.lua", b"latest bot");
    mount_release(&server, "refs/heads/master", &archive).await;

    let temp = TempDir::new().unwrap();
    let from_config = temp.path().join("from-config");
    let from_flag = temp.path().join("from-flag");
    let config_path = write_config(temp.path(), &server, &from_config);

    let mut cmd = updater_command();
    cmd.current_dir(temp.path())
        .arg("-q")
        .arg("--config")
        .arg(&config_path)
        .arg("--install-dir")
        .arg(&from_flag);

    run(cmd).await.success();

    assert_eq!(fs::read(from_flag.join("bot.lua")).unwrap(), b"latest bot");
    assert!(!from_config.exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_rejected_download_prints_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(zipball_path("v9")))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/codeload/v9.zip", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/codeload/v9.zip"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let config_path = write_config(temp.path(), &server, temp.path());

    let mut cmd = updater_command();
    cmd.current_dir(temp.path()).arg("-q").arg("-c").arg(&config_path).args(["update", "v9"]);

    run(cmd).await.success().stdout(predicate::str::contains("status 404"));
    assert!(!temp.path().join(".tmp").exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_api_failure_exits_with_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(zipball_path("refs/heads/master")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let config_path = write_config(temp.path(), &server, temp.path());

    let mut cmd = updater_command();
    cmd.current_dir(temp.path()).arg("-q").arg("-c").arg(&config_path).arg("update");

    run(cmd)
        .await
        .code(1)
        .stderr(predicate::str::contains("Network error"))
        .stderr(predicate::str::contains("suggestion"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_config_file_in_working_directory_is_used() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/repos/{OWNER}/{REPO}/releases")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"tag_name": "v7", "draft": false, "prerelease": false}
        ])))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    write_config(temp.path(), &server, temp.path());

    let mut cmd = updater_command();
    cmd.current_dir(temp.path()).args(["-q", "check"]);

    run(cmd).await.success().stdout(predicate::str::contains("v7"));
}
