//! The `update` action.

use crate::release::{ReleaseRef, ReleaseSource};
use crate::updater::{UpdateOutcome, Updater};
use anyhow::Result;
use colored::Colorize;
use std::time::Duration;

/// Install `reference` and report the result on stdout.
///
/// A download the server refuses is reported but is not an error, matching
/// the behaviour users of the updater have always seen.
pub async fn run<S: ReleaseSource>(updater: &Updater<S>, reference: &ReleaseRef) -> Result<()> {
    println!("{} {}", "Updating to".cyan(), reference.to_string().bold());

    match updater.update(reference).await? {
        UpdateOutcome::DownloadRejected {
            status,
        } => {
            println!("status {status}");
            println!("{}", "Download was rejected, nothing was changed".yellow());
        }
        UpdateOutcome::Installed {
            summary,
            ..
        } => {
            println!(
                "Installed {} files and {} directories",
                summary.files, summary.directories
            );
            if summary.self_replaced {
                println!("{}", "The updater itself was updated".cyan());
            }
            println!("{}", "All files updated successfully!".green());

            let pause = updater.config().pause_after_update_secs;
            if pause > 0 {
                tokio::time::sleep(Duration::from_secs(pause)).await;
            }
        }
    }

    Ok(())
}
