use anyhow::Result;
use rombot_updater::archive::extract_archive;
use rombot_updater::installer::{Installer, RenameAside, SelfReplace};
use rombot_updater::test_utils::ArchiveBuilder;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const UPDATER: &str = "rombot_updater.exe";

fn install_release(temp: &Path, install_root: &Path, name: &str, updater_bytes: &[u8]) -> Result<bool> {
    let archive = temp.join(format!("{name}.zip"));
    ArchiveBuilder::new(format!("owner-repo-{name}"))
        .file("bot.lua", name.as_bytes())
        .file(UPDATER, updater_bytes)
        .write_to(&archive)?;

    let extracted = extract_archive(&archive, &temp.join(".tmp"))?;
    let summary = Installer::new(install_root, UPDATER).install(&extracted)?;
    Ok(summary.self_replaced)
}

#[test]
fn test_update_moves_running_updater_aside() -> Result<()> {
    let temp = TempDir::new()?;
    let install_root = temp.path().join("install");
    fs::create_dir_all(&install_root)?;
    fs::write(install_root.join(UPDATER), b"updater v1")?;

    assert!(install_release(temp.path(), &install_root, "v2", b"updater v2")?);

    assert_eq!(fs::read(install_root.join(UPDATER))?, b"updater v2");
    assert_eq!(fs::read(install_root.join("rombot_updater.exe.old"))?, b"updater v1");
    assert_eq!(fs::read(install_root.join("bot.lua"))?, b"v2");
    Ok(())
}

#[test]
fn test_second_update_discards_first_aside_copy() -> Result<()> {
    let temp = TempDir::new()?;
    let install_root = temp.path().join("install");
    fs::create_dir_all(&install_root)?;
    fs::write(install_root.join(UPDATER), b"updater v1")?;

    install_release(temp.path(), &install_root, "v2", b"updater v2")?;
    install_release(temp.path(), &install_root, "v3", b"updater v3")?;

    assert_eq!(fs::read(install_root.join(UPDATER))?, b"updater v3");
    assert_eq!(fs::read(install_root.join("rombot_updater.exe.old"))?, b"updater v2");
    Ok(())
}

#[test]
fn test_fresh_install_has_no_aside_copy() -> Result<()> {
    let temp = TempDir::new()?;
    let install_root = temp.path().join("install");

    assert!(install_release(temp.path(), &install_root, "v1", b"updater v1")?);

    assert_eq!(fs::read(install_root.join(UPDATER))?, b"updater v1");
    assert!(!install_root.join("rombot_updater.exe.old").exists());
    Ok(())
}

#[test]
fn test_custom_aside_suffix() -> Result<()> {
    let temp = TempDir::new()?;
    let target = temp.path().join(UPDATER);
    let source = temp.path().join("incoming.exe");
    fs::write(&target, b"old")?;
    fs::write(&source, b"new")?;

    let replacer = RenameAside::new(".previous");
    replacer.replace_self(&target, &source)?;

    assert_eq!(fs::read(&target)?, b"new");
    assert_eq!(fs::read(temp.path().join("rombot_updater.exe.previous"))?, b"old");
    assert!(!temp.path().join("rombot_updater.exe.old").exists());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_replaced_updater_keeps_executable_bit() -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new()?;
    let install_root = temp.path().join("install");
    let archive = temp.path().join("v2.zip");
    ArchiveBuilder::new("owner-repo-v2")
        .file_with_mode(UPDATER, b"#!/bin/sh\n", 0o755)
        .write_to(&archive)?;

    let extracted = extract_archive(&archive, &temp.path().join(".tmp"))?;
    Installer::new(&install_root, UPDATER).install(&extracted)?;

    let mode = fs::metadata(install_root.join(UPDATER))?.permissions().mode();
    assert_eq!(mode & 0o777, 0o755);
    Ok(())
}
