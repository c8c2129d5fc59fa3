use serde_json::Value;
use web3::types::U256;
use web3::Transport;

use crate::error::ImporterError;
use crate::utils::hex_to_u256;

/// Resolves the network's chain id via eth_chainId. The value is invariant
/// for the lifetime of a connection; callers cache it per connection.
pub async fn resolve_chain_id<T: Transport>(transport: &T) -> Result<U256, ImporterError> {
    let result = transport.execute("eth_chainId", vec![]).await?;
    let chain_id_hex = result.as_str().ok_or_else(|| {
        ImporterError::RpcError(format!("eth_chainId returned a non-string result: {result}"))
    })?;
    Ok(hex_to_u256(chain_id_hex)?)
}

/// Fetches the full block (with embedded transaction objects) for a hash.
pub async fn fetch_block_by_hash<T: Transport>(
    transport: &T,
    block_hash: &str,
) -> Result<Value, ImporterError> {
    let result = transport
        .execute(
            "eth_getBlockByHash",
            vec![Value::String(block_hash.to_string()), Value::Bool(true)],
        )
        .await?;
    if !result.is_object() {
        return Err(ImporterError::RpcError(format!(
            "eth_getBlockByHash returned no result for block {block_hash}"
        )));
    }
    Ok(result)
}

/// Fetches the execution receipt for a transaction. A response without a
/// result object (e.g. the transaction is not indexed yet) is an error.
pub async fn fetch_transaction_receipt<T: Transport>(
    transport: &T,
    tx_hash: &str,
) -> Result<Value, ImporterError> {
    let result = transport
        .execute(
            "eth_getTransactionReceipt",
            vec![Value::String(tx_hash.to_string())],
        )
        .await?;
    if !result.is_object() {
        return Err(ImporterError::RpcError(format!(
            "No receipt found for transaction {tx_hash}"
        )));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{raw_receipt, MockTransport};
    use serde_json::json;

    #[tokio::test]
    async fn test_resolve_chain_id() {
        let transport = MockTransport::new();
        transport.push_response(json!("0x89"));
        let chain_id = resolve_chain_id(&transport).await.unwrap();
        assert_eq!(chain_id, U256::from(137));
        assert_eq!(transport.requests_for("eth_chainId"), vec![Vec::<Value>::new()]);
    }

    #[tokio::test]
    async fn test_resolve_chain_id_rejects_non_string_result() {
        let transport = MockTransport::new();
        transport.push_response(json!(137));
        assert!(resolve_chain_id(&transport).await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_transaction_receipt_without_result_fails() {
        let transport = MockTransport::new();
        transport.push_response(Value::Null);
        let err = fetch_transaction_receipt(&transport, "0xabc").await;
        assert!(matches!(err, Err(ImporterError::RpcError(_))));
    }

    #[tokio::test]
    async fn test_fetch_transaction_receipt() {
        let transport = MockTransport::new();
        transport.push_response(raw_receipt("0x5208", "0x1"));
        let receipt = fetch_transaction_receipt(&transport, "0xabc").await.unwrap();
        assert_eq!(receipt["gasUsed"], json!("0x5208"));
        assert_eq!(
            transport.requests_for("eth_getTransactionReceipt"),
            vec![vec![json!("0xabc")]]
        );
    }
}
