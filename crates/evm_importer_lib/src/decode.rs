use chrono::{DateTime, Utc};
use serde_json::Value;
use std::str::FromStr;
use web3::types::{Address, U256};

use crate::error::ImporterError;
use crate::model::{BlockHeader, Receipt, Transaction};
use crate::utils::{derive_chain_id, epoch_to_time_utc, hex_to_ascii, hex_to_u256};

fn str_field<'a>(raw: &'a Value, key: &str) -> Option<&'a str> {
    raw.get(key).and_then(Value::as_str)
}

fn required_str<'a>(raw: &'a Value, key: &str) -> Result<&'a str, ImporterError> {
    str_field(raw, key)
        .ok_or_else(|| ImporterError::DecodeError(format!("Missing required field: {key}")))
}

// Absent numeric fields decode to zero; malformed hex is an error.
fn u256_field(raw: &Value, key: &str) -> Result<U256, ImporterError> {
    match str_field(raw, key) {
        Some(hex) => hex_to_u256(hex)
            .map_err(|err| ImporterError::DecodeError(format!("Field {key}: {err}"))),
        None => Ok(U256::zero()),
    }
}

/// Decodes the block timestamp (hex epoch seconds) into UTC time.
pub fn decode_block_timestamp(raw: &Value) -> Result<DateTime<Utc>, ImporterError> {
    let seconds = hex_to_u256(required_str(raw, "timestamp")?)
        .map_err(|err| ImporterError::DecodeError(format!("Field timestamp: {err}")))?;
    if seconds > U256::from(i64::MAX as u64) {
        return Err(ImporterError::DecodeError(format!(
            "Block timestamp out of range: {seconds}"
        )));
    }
    Ok(epoch_to_time_utc(seconds.low_u64() as i64)?)
}

/// Maps a raw newHeads header object (flat map of hex fields) into a
/// BlockHeader. Pure; the chain id comes from the caller's connection state.
pub fn decode_block_header(raw: &Value, chain_id: U256) -> Result<BlockHeader, ImporterError> {
    if !raw.is_object() {
        return Err(ImporterError::DecodeError(format!(
            "Block header is not an object: {raw}"
        )));
    }

    let hash = required_str(raw, "hash")?.to_string();
    let number = hex_to_u256(required_str(raw, "number")?)
        .map_err(|err| ImporterError::DecodeError(format!("Field number: {err}")))?;
    let timestamp = decode_block_timestamp(raw)?;

    let extra_data = match hex_to_ascii(str_field(raw, "extraData").unwrap_or_default()) {
        Ok(extra_data) => extra_data,
        Err(err) => {
            log::warn!("Undecodable extraData in block {hash}: {err}");
            String::new()
        }
    };

    let base_fee_per_gas = match str_field(raw, "baseFeePerGas") {
        Some(hex) => Some(
            hex_to_u256(hex)
                .map_err(|err| ImporterError::DecodeError(format!("Field baseFeePerGas: {err}")))?,
        ),
        None => None,
    };

    Ok(BlockHeader {
        chain_id,
        parent_hash: str_field(raw, "parentHash").unwrap_or_default().to_string(),
        sha3_uncles: str_field(raw, "sha3Uncles").unwrap_or_default().to_string(),
        miner: str_field(raw, "miner").unwrap_or_default().to_string(),
        state_root: str_field(raw, "stateRoot").unwrap_or_default().to_string(),
        transactions_root: str_field(raw, "transactionsRoot")
            .unwrap_or_default()
            .to_string(),
        receipts_root: str_field(raw, "receiptsRoot")
            .unwrap_or_default()
            .to_string(),
        logs_bloom: str_field(raw, "logsBloom").unwrap_or_default().to_string(),
        difficulty: u256_field(raw, "difficulty")?,
        number,
        gas_limit: u256_field(raw, "gasLimit")?,
        gas_used: u256_field(raw, "gasUsed")?,
        timestamp,
        extra_data,
        mix_hash: str_field(raw, "mixHash").unwrap_or_default().to_string(),
        nonce: str_field(raw, "nonce").unwrap_or_default().to_string(),
        base_fee_per_gas,
        withdrawals_root: str_field(raw, "withdrawalsRoot").map(str::to_string),
        hash,
    })
}

pub fn decode_receipt(raw: &Value) -> Result<Receipt, ImporterError> {
    Ok(Receipt {
        gas_used: u256_field(raw, "gasUsed")?,
        status: u256_field(raw, "status")?.low_u64(),
    })
}

/// Maps a raw transaction object (from eth_getBlockByHash with full
/// transactions) into a Transaction. Timestamp comes from the parent block,
/// gas_used and status from the supplied receipt. Transactions predating
/// EIP-155 carry no chainId field; the id is then recovered from v when
/// possible, else left at zero.
pub fn decode_transaction(
    raw: &Value,
    block_timestamp: DateTime<Utc>,
    receipt: &Receipt,
) -> Result<Transaction, ImporterError> {
    let hash = required_str(raw, "hash")?.to_string();
    let from_addr = Address::from_str(required_str(raw, "from")?)?;
    let to_addr = match str_field(raw, "to") {
        Some(to) => Some(Address::from_str(to)?),
        None => None,
    };

    let v = str_field(raw, "v").unwrap_or_default().to_string();
    let chain_id = match str_field(raw, "chainId") {
        Some(hex) => hex_to_u256(hex)
            .map_err(|err| ImporterError::DecodeError(format!("Field chainId: {err}")))?,
        None => match derive_chain_id(&v) {
            Ok(id) => U256::from(id),
            Err(_) => {
                log::debug!("Transaction {hash} carries no chain id");
                U256::zero()
            }
        },
    };

    Ok(Transaction {
        chain_id,
        timestamp: block_timestamp,
        hash,
        block_number: u256_field(raw, "blockNumber")?,
        transaction_index: u256_field(raw, "transactionIndex")?,
        from_addr,
        to_addr,
        nonce: u256_field(raw, "nonce")?,
        value: u256_field(raw, "value")?,
        gas_price: u256_field(raw, "gasPrice")?,
        gas_limit: u256_field(raw, "gas")?,
        gas_used: receipt.gas_used,
        status: receipt.status,
        input: str_field(raw, "input").unwrap_or_default().to_string(),
        v,
        r: str_field(raw, "r").unwrap_or_default().to_string(),
        s: str_field(raw, "s").unwrap_or_default().to_string(),
        block_hash: str_field(raw, "blockHash").unwrap_or_default().to_string(),
    })
}
