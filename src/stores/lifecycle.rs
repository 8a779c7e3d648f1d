//! Deferred deletion of the persistent index.
//!
//! The running process keeps the SQLite file open, so `clear` cannot remove
//! the index in place. Instead a marker file is written next to the index
//! directory and the real deletion happens on the next startup, before any
//! connection is opened:
//!
//! ```text
//! ACTIVE ──clear()──► MARKED_FOR_DELETION ──startup──► DELETED
//!                                          └─────────► STUCK_LOCKED
//! ```
//!
//! The marker is consumed on both startup outcomes so a failed removal never
//! retries forever; the STUCK_LOCKED path tells the operator to remove the
//! directory by hand.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::types::RagError;

/// Marker file name, sibling of the index directory inside the data dir.
pub const DELETION_MARKER: &str = "delete_index.marker";

/// Outcome of resolving the deletion marker at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupCleanup {
    /// No marker was present; nothing to do.
    NotNeeded,
    /// Marker found and the index directory is gone.
    Cleared,
    /// Marker found but the index directory could not be removed.
    Locked { index_dir: PathBuf },
}

pub fn marker_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DELETION_MARKER)
}

/// Records the intent to delete the index on the next startup.
pub async fn mark_for_deletion(data_dir: &Path) -> Result<(), RagError> {
    fs::create_dir_all(data_dir).await?;
    fs::write(marker_path(data_dir), b"delete").await?;
    tracing::info!(marker = %marker_path(data_dir).display(), "index marked for deletion");
    Ok(())
}

/// Resolves a pending deletion. Must run before any index connection is
/// opened. The marker is removed whether or not the deletion succeeds.
pub async fn resolve_pending_deletion(
    data_dir: &Path,
    index_dir: &Path,
) -> Result<StartupCleanup, RagError> {
    let marker = marker_path(data_dir);
    if !fs::try_exists(&marker).await? {
        return Ok(StartupCleanup::NotNeeded);
    }

    if fs::try_exists(index_dir).await? {
        if let Err(err) = fs::remove_dir_all(index_dir).await {
            tracing::error!(
                index_dir = %index_dir.display(),
                error = %err,
                "could not remove index directory"
            );
        }
    }

    // Consume the marker even when removal failed, to avoid a retry loop.
    if let Err(err) = fs::remove_file(&marker).await {
        tracing::warn!(error = %err, "could not remove deletion marker");
    }

    if fs::try_exists(index_dir).await? {
        Ok(StartupCleanup::Locked {
            index_dir: index_dir.to_path_buf(),
        })
    } else {
        tracing::info!("index directory cleared on startup");
        Ok(StartupCleanup::Cleared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn no_marker_means_no_action() {
        let dir = tempdir().unwrap();
        let index_dir = dir.path().join("index");
        fs::create_dir_all(&index_dir).await.unwrap();

        let outcome = resolve_pending_deletion(dir.path(), &index_dir)
            .await
            .unwrap();
        assert_eq!(outcome, StartupCleanup::NotNeeded);
        assert!(index_dir.exists());
    }

    #[tokio::test]
    async fn marker_clears_index_and_consumes_itself() {
        let dir = tempdir().unwrap();
        let index_dir = dir.path().join("index");
        fs::create_dir_all(&index_dir).await.unwrap();
        fs::write(index_dir.join("chunks.sqlite"), b"data")
            .await
            .unwrap();

        mark_for_deletion(dir.path()).await.unwrap();
        assert!(marker_path(dir.path()).exists());

        let outcome = resolve_pending_deletion(dir.path(), &index_dir)
            .await
            .unwrap();
        assert_eq!(outcome, StartupCleanup::Cleared);
        assert!(!index_dir.exists());
        assert!(!marker_path(dir.path()).exists());
    }

    #[tokio::test]
    async fn marker_without_index_directory_still_clears() {
        let dir = tempdir().unwrap();
        let index_dir = dir.path().join("index");

        mark_for_deletion(dir.path()).await.unwrap();
        let outcome = resolve_pending_deletion(dir.path(), &index_dir)
            .await
            .unwrap();
        assert_eq!(outcome, StartupCleanup::Cleared);
        assert!(!marker_path(dir.path()).exists());
    }

    #[tokio::test]
    async fn unremovable_index_consumes_marker_and_reports_locked() {
        let dir = tempdir().unwrap();
        // A plain file where the directory is expected makes remove_dir_all
        // fail the same way a held lock does.
        let index_dir = dir.path().join("index");
        fs::write(&index_dir, b"not a directory").await.unwrap();

        mark_for_deletion(dir.path()).await.unwrap();
        let outcome = resolve_pending_deletion(dir.path(), &index_dir)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            StartupCleanup::Locked {
                index_dir: index_dir.clone()
            }
        );
        assert!(!marker_path(dir.path()).exists());
        assert!(index_dir.exists());
    }
}
