pub mod connection;
pub mod model;
pub mod operations;

use async_trait::async_trait;

use crate::error::ImporterError;
use crate::model::{BlockHeader, Transaction};

pub use connection::{create_clickhouse_connection, ClickhouseDb};

/// Target-store interface. Each call is one atomic write from the
/// pipeline's point of view; headers and transaction batches go to
/// separate tables and may become visible to readers at different times.
#[async_trait]
pub trait BlockSink: Send + Sync {
    async fn save_block_header(&self, header: &BlockHeader) -> Result<(), ImporterError>;
    async fn save_transactions(&self, transactions: &[Transaction]) -> Result<(), ImporterError>;
}
