//! The `check` action.

use crate::release::ReleaseSource;
use crate::updater::Updater;
use anyhow::Result;

pub async fn run<S: ReleaseSource>(updater: &Updater<S>) -> Result<()> {
    let tags = updater.check().await?;

    println!("Recent releases:");
    for tag in tags {
        println!("{tag}");
    }

    Ok(())
}
