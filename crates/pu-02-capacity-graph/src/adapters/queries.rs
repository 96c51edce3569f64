//! SQL for the two ledger schema versions.

use std::sync::Arc;

use shared_types::ProtocolVersion;

use crate::ports::QueryProvider;

/// blockchain-indexer schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct V1Queries;

/// nethermind plugin schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct V2Queries;

const V1_LATEST_BLOCK_NUMBER: &str = "select max(block_number) from transaction_2;";

const V1_CHANGES_SINCE: &str = r#"
    select c."from", c."to", c."token_owner", c."capacity"::text
    from crc_capacity_graph_changes c
    where c.block_number > $1;
"#;

const V2_LATEST_BLOCK_NUMBER: &str = r#"select max("blockNumber") from "System_Block";"#;

const V2_CHANGES_SINCE: &str = r#"
    select c."from", c."to", c."tokenOwner", c."capacity"::text
    from "V_CrcV2_CapacityGraphChanges" c
    where c."blockNumber" > $1;
"#;

impl QueryProvider for V1Queries {
    fn version(&self) -> ProtocolVersion {
        ProtocolVersion::V1
    }

    fn latest_block_number_sql(&self) -> &'static str {
        V1_LATEST_BLOCK_NUMBER
    }

    fn changes_since_sql(&self) -> &'static str {
        V1_CHANGES_SINCE
    }
}

impl QueryProvider for V2Queries {
    fn version(&self) -> ProtocolVersion {
        ProtocolVersion::V2
    }

    fn latest_block_number_sql(&self) -> &'static str {
        V2_LATEST_BLOCK_NUMBER
    }

    fn changes_since_sql(&self) -> &'static str {
        V2_CHANGES_SINCE
    }
}

/// Pick the query set for a protocol version.
pub fn queries_for(version: ProtocolVersion) -> Arc<dyn QueryProvider> {
    match version {
        ProtocolVersion::V1 => Arc::new(V1Queries),
        ProtocolVersion::V2 => Arc::new(V2Queries),
    }
}
