//! Cleanup of old synthesized audio files
//!
//! Off unless a retention age is configured. Only `.wav` files directly in
//! the audio directory are considered.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Delete audio files last modified more than `max_age` before `now`.
///
/// Returns the number of files removed.
pub async fn sweep_expired(dir: &Path, max_age: Duration, now: SystemTime) -> io::Result<usize> {
    let mut removed = 0;
    let mut entries = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("wav") {
            continue;
        }
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }
        let age = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .unwrap_or_default();
        if age <= max_age {
            continue;
        }
        match tokio::fs::remove_file(&path).await {
            Ok(()) => removed += 1,
            // Another sweep or an operator got there first
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }

    Ok(removed)
}

/// Run [`sweep_expired`] every `interval` until `cancel` fires
pub fn spawn_sweeper(
    dir: PathBuf,
    max_age: Duration,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    match sweep_expired(&dir, max_age, SystemTime::now()).await {
                        Ok(0) => {}
                        Ok(removed) => {
                            tracing::info!(removed, dir = %dir.display(), "Removed expired audio files");
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, dir = %dir.display(), "Audio cleanup failed");
                        }
                    }
                }
            }
        }
        tracing::debug!("Audio cleanup stopped");
    })
}
