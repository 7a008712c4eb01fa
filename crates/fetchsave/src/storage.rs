//! Persistence of transformed content
//!
//! Files are written to a `.part` sibling first and renamed into place, so a
//! failed write never leaves a file under the final name.

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Suffix of the temporary file used before the final rename
pub const PARTIAL_SUFFIX: &str = ".part";

/// Create the directory and any missing ancestors
///
/// An existing directory is not an error, so concurrent callers may race.
pub async fn ensure_directory(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path).await
}

/// Write UTF-8 `content` to `path`, replacing any existing file
pub async fn write_file(path: &Path, content: &str) -> io::Result<()> {
    let partial = partial_path(path);

    if let Err(e) = fs::write(&partial, content.as_bytes()).await {
        remove_partial(&partial).await;
        return Err(e);
    }

    if let Err(e) = fs::rename(&partial, path).await {
        remove_partial(&partial).await;
        return Err(e);
    }

    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

async fn remove_partial(partial: &Path) {
    if let Err(e) = fs::remove_file(partial).await {
        if e.kind() != io::ErrorKind::NotFound {
            tracing::warn!(path = %partial.display(), error = %e, "Failed to remove partial file");
        }
    }
}
