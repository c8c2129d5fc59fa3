use async_trait::async_trait;

use super::connection::ClickhouseDb;
use super::model::{BlockRow, TransactionRow};
use super::BlockSink;
use crate::error::ImporterError;
use crate::model::{BlockHeader, Transaction};

#[async_trait]
impl BlockSink for ClickhouseDb {
    async fn save_block_header(&self, header: &BlockHeader) -> Result<(), ImporterError> {
        let mut insert = self.client.insert("blocks")?;
        insert.write(&BlockRow::from(header)).await?;
        insert.end().await?;
        log::info!("Block header saved: {}", header.hash);
        Ok(())
    }

    async fn save_transactions(&self, transactions: &[Transaction]) -> Result<(), ImporterError> {
        // one bulk insert per block batch
        let mut insert = self.client.insert("transactions")?;
        for transaction in transactions {
            insert.write(&TransactionRow::from(transaction)).await?;
        }
        insert.end().await?;
        log::info!("Transactions saved: {}", transactions.len());
        Ok(())
    }
}
