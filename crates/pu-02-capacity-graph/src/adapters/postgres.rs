//! PostgreSQL-backed ledger store and the streaming edge reader.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use shared_types::{BlockNumber, CapacityEdge};
use tokio_postgres::config::Host;
use tokio_postgres::{Client, Config, NoTls, Row};
use tracing::{debug, warn};

use crate::domain::{edge_from_columns, CapacityEdgeBatch};
use crate::error::CapacityGraphError;
use crate::ports::{LedgerStore, QueryProvider};

/// Lazily decoded change rows.
pub type EdgeStream<'a> = BoxStream<'a, Result<CapacityEdge, CapacityGraphError>>;

/// Render a connection string without its password.
pub fn describe_connection_string(connection_string: &str) -> Result<String, CapacityGraphError> {
    let config: Config = connection_string
        .parse()
        .map_err(|e: tokio_postgres::Error| CapacityGraphError::InvalidConnectionString(e.to_string()))?;
    Ok(describe(&config))
}

fn describe(config: &Config) -> String {
    let hosts: Vec<String> = config
        .get_hosts()
        .iter()
        .map(|host| match host {
            Host::Tcp(name) => name.clone(),
            #[cfg(unix)]
            Host::Unix(path) => path.display().to_string(),
        })
        .collect();
    format!(
        "host={} user={} dbname={}",
        if hosts.is_empty() { "<default>".to_string() } else { hosts.join(",") },
        config.get_user().unwrap_or("<default>"),
        config.get_dbname().unwrap_or("<default>"),
    )
}

fn column<'r>(row: &'r Row, idx: usize) -> Result<&'r str, CapacityGraphError> {
    row.try_get::<_, &str>(idx)
        .map_err(|e| CapacityGraphError::DataIntegrity(format!("column {idx}: {e}")))
}

fn row_to_edge(row: Row) -> Result<CapacityEdge, CapacityGraphError> {
    edge_from_columns(
        column(&row, 0)?,
        column(&row, 1)?,
        column(&row, 2)?,
        column(&row, 3)?,
    )
}

/// Runs the incremental change query on one connection.
///
/// Rows are decoded as they arrive. The reader owns the client, so it must
/// outlive the stream it hands out.
pub struct CapacityEdgeReader {
    client: Client,
    sql: &'static str,
}

impl CapacityEdgeReader {
    pub fn new(client: Client, sql: &'static str) -> Self {
        Self { client, sql }
    }

    /// Issue the query. Returns once the server starts answering.
    pub async fn read_changes_since(
        &self,
        since: BlockNumber,
    ) -> Result<EdgeStream<'_>, CapacityGraphError> {
        let since = i64::try_from(since).map_err(|_| {
            CapacityGraphError::DataIntegrity(format!("block number {since} exceeds bigint"))
        })?;
        let rows = self.client.query_raw(self.sql, [since]).await?;
        Ok(rows
            .map(|row| row.map_err(CapacityGraphError::from).and_then(row_to_edge))
            .boxed())
    }
}

/// [`LedgerStore`] over PostgreSQL. Opens a fresh connection per call.
pub struct PostgresLedgerStore {
    config: Config,
    queries: Arc<dyn QueryProvider>,
}

impl PostgresLedgerStore {
    pub fn new(
        connection_string: &str,
        queries: Arc<dyn QueryProvider>,
    ) -> Result<Self, CapacityGraphError> {
        let config = connection_string
            .parse::<Config>()
            .map_err(|e| CapacityGraphError::InvalidConnectionString(e.to_string()))?;
        Ok(Self { config, queries })
    }

    /// Password-free description of the target database.
    pub fn describe(&self) -> String {
        describe(&self.config)
    }

    async fn connect(&self) -> Result<Client, CapacityGraphError> {
        let (client, connection) =
            self.config
                .connect(NoTls)
                .await
                .map_err(|source| CapacityGraphError::Connect {
                    target: self.describe(),
                    source,
                })?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!(error = %e, "Ledger store connection ended with error");
            }
        });
        Ok(client)
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    async fn latest_block_number(&self) -> Result<BlockNumber, CapacityGraphError> {
        let client = self.connect().await?;
        let row = client
            .query_one(self.queries.latest_block_number_sql(), &[])
            .await?;
        let latest: Option<i64> = row.try_get(0)?;
        let latest = latest.ok_or(CapacityGraphError::NoBlocks)?;
        BlockNumber::try_from(latest).map_err(|_| {
            CapacityGraphError::DataIntegrity(format!("negative block number {latest}"))
        })
    }

    async fn changes_since(
        &self,
        since: BlockNumber,
    ) -> Result<CapacityEdgeBatch, CapacityGraphError> {
        let reader = CapacityEdgeReader::new(self.connect().await?, self.queries.changes_since_sql());

        let total = Instant::now();
        let mut rows = reader.read_changes_since(since).await?;
        let query_duration = total.elapsed();

        let mut edges = Vec::new();
        while let Some(edge) = rows.next().await {
            edges.push(edge?);
        }
        let total_duration = total.elapsed();

        debug!(
            since_block = since,
            edges = edges.len(),
            query_ms = query_duration.as_millis() as u64,
            "Read capacity changes"
        );

        Ok(CapacityEdgeBatch {
            edges,
            query_duration,
            transfer_duration: total_duration.saturating_sub(query_duration),
            total_duration,
        })
    }
}
