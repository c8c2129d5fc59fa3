use chrono::{DateTime, Utc};
use web3::types::{Address, U256};

/// One record per observed block, decoded from a newHeads notification.
/// Immutable once decoded; there is no update path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub chain_id: U256,
    pub parent_hash: String,
    pub sha3_uncles: String,
    pub miner: String,
    pub state_root: String,
    pub transactions_root: String,
    pub receipts_root: String,
    pub logs_bloom: String,
    pub difficulty: U256,
    pub number: U256,
    pub gas_limit: U256,
    pub gas_used: U256,
    pub timestamp: DateTime<Utc>,
    pub extra_data: String,
    pub mix_hash: String,
    pub nonce: String,
    pub base_fee_per_gas: Option<U256>,
    pub withdrawals_root: Option<String>,
    pub hash: String,
}

/// One record per transaction inside an enriched block. Timestamp is
/// inherited from the parent block; gas_used and status always come from
/// the transaction's receipt, never from the raw transaction object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub chain_id: U256,
    pub timestamp: DateTime<Utc>,
    pub hash: String,
    pub block_number: U256,
    pub transaction_index: U256,
    pub from_addr: Address,
    pub to_addr: Option<Address>,
    pub nonce: U256,
    pub value: U256,
    pub gas_price: U256,
    pub gas_limit: U256,
    pub gas_used: U256,
    pub status: u64,
    pub input: String,
    pub v: String,
    pub r: String,
    pub s: String,
    pub block_hash: String,
}

/// Execution outcome of a single transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub gas_used: U256,
    pub status: u64,
}
