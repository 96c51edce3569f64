use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use shared_types::CapacityEdge;
use tracing::debug;

use crate::domain::{encode_edges, ExportSummary};
use crate::error::CapacityGraphError;
use crate::ports::GraphExporter;

/// Writes the pathfinder's binary edge-list snapshot.
///
/// The file is written next to the target under a temporary name and then
/// renamed over it, so a reader never sees a partial snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryEdgeExporter;

fn temp_sibling(path: &Path) -> Result<PathBuf, CapacityGraphError> {
    let file_name = path.file_name().ok_or_else(|| CapacityGraphError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
    })?;
    let mut temp_name = OsString::from(".");
    temp_name.push(file_name);
    temp_name.push(".tmp");
    Ok(path.with_file_name(temp_name))
}

#[async_trait]
impl GraphExporter for BinaryEdgeExporter {
    async fn export(
        &self,
        edges: &[CapacityEdge],
        path: &Path,
    ) -> Result<ExportSummary, CapacityGraphError> {
        let snapshot = encode_edges(edges)?;
        let temp = temp_sibling(path)?;

        tokio::fs::write(&temp, &snapshot.bytes)
            .await
            .map_err(CapacityGraphError::io(&temp))?;
        tokio::fs::rename(&temp, path)
            .await
            .map_err(CapacityGraphError::io(path))?;

        debug!(
            path = %path.display(),
            addresses = snapshot.address_count,
            edges = snapshot.edge_count,
            bytes = snapshot.bytes.len(),
            "Snapshot written"
        );

        Ok(ExportSummary {
            path: path.to_path_buf(),
            address_count: snapshot.address_count,
            edge_count: snapshot.edge_count,
            bytes_written: snapshot.bytes.len(),
        })
    }
}
