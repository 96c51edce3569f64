use async_trait::async_trait;

use crate::domain::ReloadResponse;
use crate::error::ReloadError;

/// Asks the pathfinder to reload its graph from a snapshot.
#[async_trait]
pub trait GraphReloader: Send + Sync {
    /// `snapshot_path` is the path as the pathfinder sees it.
    async fn reload(&self, snapshot_path: &str) -> Result<ReloadResponse, ReloadError>;
}
