//! Writes the run's snapshot for the website build.

use crate::error::ArtifactError;
use crate::pipeline::Aggregation;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::Path;
use tracing::info;

pub const RELEASES_FILE: &str = "releases.json";
pub const SERVERS_FILE: &str = "servers.json";

/// Replaces `dir` with a fresh directory holding `releases.json` and `servers.json`.
#[tracing::instrument(
    name = "write_artifacts",
    skip(dir, aggregation),
    fields(dir = %dir.display())
)]
pub async fn write_artifacts(dir: &Path, aggregation: &Aggregation) -> Result<(), ArtifactError> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(io_error(dir, e)),
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| io_error(dir, e))?;

    write_json(&dir.join(RELEASES_FILE), &aggregation.releases).await?;
    write_json(&dir.join(SERVERS_FILE), &aggregation.servers).await?;
    info!(
        releases = aggregation.releases.len(),
        servers = aggregation.servers.len(),
        "artifacts written"
    );
    Ok(())
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ArtifactError> {
    let bytes = serde_json::to_vec(value)?;
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, source: std::io::Error) -> ArtifactError {
    ArtifactError::Io {
        path: path.display().to_string(),
        source,
    }
}
