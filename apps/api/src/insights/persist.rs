//! Side-channel log of the most recent report. Caller-side; the pipeline never writes files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::insights::validator::InsightsReport;

/// Writes `report` as indented UTF-8 JSON. Non-ASCII text is written unescaped.
///
/// The file is written under a unique sibling name and renamed over `path`, so
/// readers and concurrent writers only ever see a complete report.
pub async fn save_insights(path: &Path, report: &InsightsReport) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(report).context("Failed to serialize insights")?;
    let tmp = temp_path(path)?;

    if let Err(e) = write_file(&tmp, &bytes).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e);
    }
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e).with_context(|| format!("Failed to replace {}", path.display()));
    }

    Ok(())
}

fn temp_path(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .with_context(|| format!("Insights log path {} has no file name", path.display()))?;
    Ok(path.with_file_name(format!(
        ".{}.{}.tmp",
        name.to_string_lossy(),
        Uuid::new_v4().simple()
    )))
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = tokio::fs::File::create(path)
        .await
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    file.flush().await?;
    file.sync_all().await?;
    Ok(())
}
