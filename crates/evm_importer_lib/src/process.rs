use serde_json::Value;
use web3::Transport;

use crate::db::BlockSink;
use crate::decode::{decode_block_timestamp, decode_receipt, decode_transaction};
use crate::error::ImporterError;
use crate::rpc::{fetch_block_by_hash, fetch_transaction_receipt};

/// Fetches the full block for a hash, enriches every transaction with its
/// receipt and persists the decoded batch in one sink call.
///
/// The batch is all-or-nothing: a failure on any transaction (receipt
/// lookup or decode) aborts the remaining work for this block and the sink
/// is never called. Returns the number of persisted transactions.
pub async fn enrich_block<T: Transport>(
    transport: &T,
    block_hash: &str,
    sink: &dyn BlockSink,
) -> Result<usize, ImporterError> {
    let block = fetch_block_by_hash(transport, block_hash).await?;
    let block_timestamp = decode_block_timestamp(&block)?;

    let raw_transactions = match block.get("transactions").and_then(Value::as_array) {
        Some(raw_transactions) if !raw_transactions.is_empty() => raw_transactions,
        _ => {
            log::info!("Block {block_hash} contains no transactions");
            return Ok(0);
        }
    };

    let mut batch = Vec::with_capacity(raw_transactions.len());
    for raw_transaction in raw_transactions {
        let tx_hash = raw_transaction
            .get("hash")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ImporterError::DecodeError(format!(
                    "Transaction without hash in block {block_hash}"
                ))
            })?;

        let raw_receipt = fetch_transaction_receipt(transport, tx_hash).await?;
        let receipt = decode_receipt(&raw_receipt)?;
        let transaction = decode_transaction(raw_transaction, block_timestamp, &receipt)?;
        batch.push(transaction);
    }

    sink.save_transactions(&batch).await?;
    Ok(batch.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{raw_block, raw_receipt, raw_transaction, MemorySink, MockTransport};
    use serde_json::json;
    use web3::types::U256;

    const BLOCK_HASH: &str = "0xaa11";

    #[tokio::test]
    async fn test_three_transactions_issue_three_receipt_calls() {
        let transport = MockTransport::new();
        let sink = MemorySink::default();

        let txs = vec![
            raw_transaction("0xt0", 0),
            raw_transaction("0xt1", 1),
            raw_transaction("0xt2", 2),
        ];
        transport.push_response(raw_block(BLOCK_HASH, "0x64b8c2f0", txs));
        transport.push_response(raw_receipt("0x5208", "0x1"));
        transport.push_response(raw_receipt("0xa410", "0x0"));
        transport.push_response(raw_receipt("0xf618", "0x1"));

        let count = enrich_block(&transport, BLOCK_HASH, &sink).await.unwrap();
        assert_eq!(count, 3);

        assert_eq!(
            transport.requests_for("eth_getBlockByHash"),
            vec![vec![json!(BLOCK_HASH), json!(true)]]
        );
        assert_eq!(
            transport.requests_for("eth_getTransactionReceipt"),
            vec![
                vec![json!("0xt0")],
                vec![json!("0xt1")],
                vec![json!("0xt2")]
            ]
        );

        let batches = sink.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        let batch = &batches[0];
        assert_eq!(batch.len(), 3);
        // node array order is preserved and each row carries its own receipt
        assert_eq!(batch[0].hash, "0xt0");
        assert_eq!(batch[0].gas_used, U256::from(21000));
        assert_eq!(batch[0].status, 1);
        assert_eq!(batch[1].hash, "0xt1");
        assert_eq!(batch[1].gas_used, U256::from(42000));
        assert_eq!(batch[1].status, 0);
        assert_eq!(batch[2].hash, "0xt2");
        assert_eq!(batch[2].gas_used, U256::from(63000));
        assert_eq!(batch[2].status, 1);
        for tx in batch.iter() {
            assert_eq!(tx.timestamp.timestamp(), 0x64b8c2f0);
        }
    }

    #[tokio::test]
    async fn test_missing_receipt_aborts_whole_batch() {
        let transport = MockTransport::new();
        let sink = MemorySink::default();

        let txs = vec![raw_transaction("0xt0", 0), raw_transaction("0xt1", 1)];
        transport.push_response(raw_block(BLOCK_HASH, "0x64b8c2f0", txs));
        transport.push_response(raw_receipt("0x5208", "0x1"));
        transport.push_response(serde_json::Value::Null);

        let result = enrich_block(&transport, BLOCK_HASH, &sink).await;
        assert!(matches!(result, Err(ImporterError::RpcError(_))));

        // zero rows written, the first transaction is not persisted alone
        assert!(sink.batches.lock().unwrap().is_empty());
        assert_eq!(transport.requests_for("eth_getTransactionReceipt").len(), 2);
    }

    #[tokio::test]
    async fn test_empty_block_is_a_no_op() {
        let transport = MockTransport::new();
        let sink = MemorySink::default();
        transport.push_response(raw_block(BLOCK_HASH, "0x64b8c2f0", vec![]));

        let count = enrich_block(&transport, BLOCK_HASH, &sink).await.unwrap();
        assert_eq!(count, 0);
        assert!(sink.batches.lock().unwrap().is_empty());
        assert_eq!(transport.requests_for("eth_getTransactionReceipt").len(), 0);
    }

    #[tokio::test]
    async fn test_missing_block_result_is_an_rpc_error() {
        let transport = MockTransport::new();
        let sink = MemorySink::default();
        transport.push_response(serde_json::Value::Null);

        let result = enrich_block(&transport, BLOCK_HASH, &sink).await;
        assert!(matches!(result, Err(ImporterError::RpcError(_))));
        assert!(sink.batches.lock().unwrap().is_empty());
    }
}
