use clickhouse::Row;
use serde::Serialize;

use crate::model::{BlockHeader, Transaction};

/// Row layout of the `blocks` table. Big numerics are stored as decimal
/// strings so values above 64 bits survive unchanged; timestamps map to
/// DateTime columns as epoch seconds.
#[derive(Row, Serialize, Debug)]
pub struct BlockRow {
    pub chain_id: String,
    pub timestamp: u32,
    pub hash: String,
    pub number: String,
    pub extra_data: String,
    pub base_fee_per_gas: String,
    pub gas_used: String,
    pub gas_limit: String,
    pub miner: String,
    pub parent_hash: String,
    pub sha3_uncles: String,
    pub state_root: String,
    pub transactions_root: String,
    pub receipts_root: String,
    pub logs_bloom: String,
    pub difficulty: String,
    pub mix_hash: String,
    pub nonce: String,
    pub withdrawals_root: String,
}

impl From<&BlockHeader> for BlockRow {
    fn from(header: &BlockHeader) -> Self {
        Self {
            chain_id: header.chain_id.to_string(),
            timestamp: header.timestamp.timestamp() as u32,
            hash: header.hash.clone(),
            number: header.number.to_string(),
            extra_data: header.extra_data.clone(),
            base_fee_per_gas: header
                .base_fee_per_gas
                .map(|fee| fee.to_string())
                .unwrap_or_default(),
            gas_used: header.gas_used.to_string(),
            gas_limit: header.gas_limit.to_string(),
            miner: header.miner.clone(),
            parent_hash: header.parent_hash.clone(),
            sha3_uncles: header.sha3_uncles.clone(),
            state_root: header.state_root.clone(),
            transactions_root: header.transactions_root.clone(),
            receipts_root: header.receipts_root.clone(),
            logs_bloom: header.logs_bloom.clone(),
            difficulty: header.difficulty.to_string(),
            mix_hash: header.mix_hash.clone(),
            nonce: header.nonce.clone(),
            withdrawals_root: header.withdrawals_root.clone().unwrap_or_default(),
        }
    }
}

/// Row layout of the `transactions` table; block_hash references the
/// parent row in `blocks`.
#[derive(Row, Serialize, Debug)]
pub struct TransactionRow {
    pub chain_id: String,
    pub timestamp: u32,
    pub hash: String,
    pub block_number: String,
    pub transaction_index: String,
    pub from_address: String,
    pub to_address: String,
    pub nonce: String,
    pub value: String,
    pub gas_price: String,
    pub gas_limit: String,
    pub gas_used: String,
    pub status: u8,
    pub input: String,
    pub v: String,
    pub r: String,
    pub s: String,
    pub block_hash: String,
}

impl From<&Transaction> for TransactionRow {
    fn from(transaction: &Transaction) -> Self {
        Self {
            chain_id: transaction.chain_id.to_string(),
            timestamp: transaction.timestamp.timestamp() as u32,
            hash: transaction.hash.clone(),
            block_number: transaction.block_number.to_string(),
            transaction_index: transaction.transaction_index.to_string(),
            from_address: format!("{:#x}", transaction.from_addr),
            to_address: transaction
                .to_addr
                .map(|to| format!("{to:#x}"))
                .unwrap_or_default(),
            nonce: transaction.nonce.to_string(),
            value: transaction.value.to_string(),
            gas_price: transaction.gas_price.to_string(),
            gas_limit: transaction.gas_limit.to_string(),
            gas_used: transaction.gas_used.to_string(),
            status: transaction.status as u8,
            input: transaction.input.clone(),
            v: transaction.v.clone(),
            r: transaction.r.clone(),
            s: transaction.s.clone(),
            block_hash: transaction.block_hash.clone(),
        }
    }
}
