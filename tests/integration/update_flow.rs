use super::{OWNER, REPO, mount_release, zipball_path};
use anyhow::Result;
use rombot_updater::config::UpdaterConfig;
use rombot_updater::core::UpdaterError;
use rombot_updater::release::{GitHubReleases, ReleaseRef, ReleaseSource};
use rombot_updater::test_utils::ArchiveBuilder;
use rombot_updater::updater::{UpdateOutcome, Updater};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, install_root: &Path) -> UpdaterConfig {
    UpdaterConfig {
        api_base_url: server.uri(),
        ..UpdaterConfig::default()
    }
    .with_install_root(install_root)
}

#[tokio::test]
async fn test_latest_resolves_default_branch_redirect() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(zipball_path("refs/heads/master")))
        .and(header_exists("user-agent"))
        .and(header("accept", "application/vnd.github+json"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", "https://codeload.example/rom-bot/master.zip"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new()?;
    let source = GitHubReleases::new(&config_for(&server, temp.path()))?;

    let url = source.archive_url(&ReleaseRef::Latest).await?;
    assert_eq!(url, "https://codeload.example/rom-bot/master.zip");
    Ok(())
}

#[tokio::test]
async fn test_tag_reference_is_used_verbatim() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(zipball_path("v3.1")))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "https://codeload.example/v3.1.zip"))
        .mount(&server)
        .await;

    let temp = TempDir::new()?;
    let source = GitHubReleases::new(&config_for(&server, temp.path()))?;

    let url = source.archive_url(&ReleaseRef::Tag("v3.1".to_string())).await?;
    assert_eq!(url, "https://codeload.example/v3.1.zip");
    Ok(())
}

#[tokio::test]
async fn test_direct_archive_response_returns_request_url() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(zipball_path("v1")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"zip".to_vec()))
        .mount(&server)
        .await;

    let temp = TempDir::new()?;
    let source = GitHubReleases::new(&config_for(&server, temp.path()))?;

    let url = source.archive_url(&ReleaseRef::Tag("v1".to_string())).await?;
    assert_eq!(url, format!("{}{}", server.uri(), zipball_path("v1")));
    Ok(())
}

#[tokio::test]
async fn test_unknown_reference_is_network_error() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(zipball_path("nope")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let temp = TempDir::new()?;
    let source = GitHubReleases::new(&config_for(&server, temp.path()))?;

    let err = source.archive_url(&ReleaseRef::Tag("nope".to_string())).await.unwrap_err();
    assert!(matches!(err, UpdaterError::Network { .. }));
    Ok(())
}

#[tokio::test]
async fn test_list_releases_requests_first_page() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/repos/{OWNER}/{REPO}/releases")))
        .and(query_param("per_page", "10"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"tag_name": "v3", "draft": false, "prerelease": true},
            {"tag_name": "v2", "draft": false, "prerelease": false},
            {"tag_name": "v1", "draft": true, "prerelease": false}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new()?;
    let updater = Updater::new(
        config_for(&server, temp.path()),
        GitHubReleases::new(&config_for(&server, temp.path()))?,
    )?;

    assert_eq!(updater.check().await?, vec!["v2".to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_list_releases_server_error() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/repos/{OWNER}/{REPO}/releases")))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let temp = TempDir::new()?;
    let source = GitHubReleases::new(&config_for(&server, temp.path()))?;

    let err = source.list_releases(10).await.unwrap_err();
    assert!(matches!(err, UpdaterError::Network { .. }));
    Ok(())
}

#[tokio::test]
async fn test_full_update_over_fake_github() -> Result<()> {
    let server = MockServer::start().await;
    let archive = ArchiveBuilder::new("SolarStrike-Software-rom-bot-1a2b3c")
        .file("bot.lua", b"bot v2")
        .dir("classes")
        .file("classes/player.lua", b"Player = {}")
        .file("rombot_updater.exe", b"updater v2");
    mount_release(&server, "v2", &archive).await;

    let temp = TempDir::new()?;
    let install_root = temp.path().join("rom");
    fs::create_dir_all(install_root.join("cache"))?;
    fs::write(install_root.join("cache/texts.lua"), b"stale")?;
    fs::write(install_root.join("rombot_updater.exe"), b"updater v1")?;

    let config = config_for(&server, &install_root);
    let updater = Updater::new(config.clone(), GitHubReleases::new(&config)?)?.with_progress(false);

    let outcome = updater.update(&ReleaseRef::Tag("v2".to_string())).await?;
    let UpdateOutcome::Installed {
        summary,
        archive,
        ..
    } = outcome
    else {
        panic!("expected the release to be installed");
    };

    assert_eq!(archive, install_root.join(".tmp/v2.zip"));
    assert_eq!(summary.files, 2);
    assert!(summary.self_replaced);
    assert_eq!(fs::read(install_root.join("bot.lua"))?, b"bot v2");
    assert_eq!(fs::read(install_root.join("classes/player.lua"))?, b"Player = {}");
    assert_eq!(fs::read(install_root.join("rombot_updater.exe"))?, b"updater v2");
    assert_eq!(fs::read(install_root.join("rombot_updater.exe.old"))?, b"updater v1");
    assert!(!install_root.join("cache/texts.lua").exists());
    assert!(!install_root.join("SolarStrike-Software-rom-bot-1a2b3c").exists());
    Ok(())
}

#[tokio::test]
async fn test_rejected_download_leaves_installation_alone() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(zipball_path("refs/heads/master")))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/codeload/gone.zip", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/codeload/gone.zip"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let temp = TempDir::new()?;
    fs::create_dir_all(temp.path().join("cache"))?;
    fs::write(temp.path().join("cache/texts.lua"), b"keep")?;

    let config = config_for(&server, temp.path());
    let updater = Updater::new(config.clone(), GitHubReleases::new(&config)?)?.with_progress(false);

    let outcome = updater.update(&ReleaseRef::Latest).await?;
    assert_eq!(
        outcome,
        UpdateOutcome::DownloadRejected {
            status: 403
        }
    );
    assert!(!temp.path().join(".tmp").exists());
    assert_eq!(fs::read(temp.path().join("cache/texts.lua"))?, b"keep");
    Ok(())
}
