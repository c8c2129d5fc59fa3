//! Shared helpers for the crate's tests: a scripted Transport, an
//! in-memory sink and raw JSON fixtures shaped like node responses.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use web3::{helpers, RequestId, Transport};

use crate::db::BlockSink;
use crate::error::ImporterError;
use crate::model::{BlockHeader, Transaction};

/// Transport that records every prepared request and replays queued
/// responses in order. An exhausted queue answers null, like a node
/// responding with an empty result.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    requests: Arc<Mutex<Vec<(String, Vec<Value>)>>>,
    responses: Arc<Mutex<VecDeque<Value>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: Value) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn requests(&self) -> Vec<(String, Vec<Value>)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_for(&self, method: &str) -> Vec<Vec<Value>> {
        self.requests()
            .into_iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params)
            .collect()
    }
}

impl Transport for MockTransport {
    type Out = futures::future::Ready<web3::error::Result<Value>>;

    fn prepare(&self, method: &str, params: Vec<Value>) -> (RequestId, jsonrpc_core::Call) {
        let mut requests = self.requests.lock().unwrap();
        requests.push((method.to_string(), params.clone()));
        (requests.len(), helpers::build_request(1, method, params))
    }

    fn send(&self, _id: RequestId, _request: jsonrpc_core::Call) -> Self::Out {
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Value::Null);
        futures::future::ready(Ok(response))
    }
}

#[derive(Debug, Default)]
pub struct MemorySink {
    pub headers: Mutex<Vec<BlockHeader>>,
    pub batches: Mutex<Vec<Vec<Transaction>>>,
}

#[async_trait]
impl BlockSink for MemorySink {
    async fn save_block_header(&self, header: &BlockHeader) -> Result<(), ImporterError> {
        self.headers.lock().unwrap().push(header.clone());
        Ok(())
    }

    async fn save_transactions(&self, transactions: &[Transaction]) -> Result<(), ImporterError> {
        self.batches.lock().unwrap().push(transactions.to_vec());
        Ok(())
    }
}

pub fn raw_header(hash: &str, number: &str, timestamp: &str) -> Value {
    json!({
        "hash": hash,
        "number": number,
        "timestamp": timestamp,
        "parentHash": "0xparent",
        "sha3Uncles": "0xuncles",
        "miner": "0xminer",
        "stateRoot": "0xsroot",
        "transactionsRoot": "0xtroot",
        "receiptsRoot": "0xrroot",
        "logsBloom": "0x00",
        "difficulty": "0x10000000000000001",
        "gasLimit": "0x1c9c380",
        "gasUsed": "0xbebc20",
        "extraData": "0x67657468",
        "mixHash": "0xmix",
        "nonce": "0x0000000000000000",
        "baseFeePerGas": "0x3b9aca00",
        "withdrawalsRoot": "0xwroot",
    })
}

pub fn raw_transaction(hash: &str, index: u64) -> Value {
    json!({
        "hash": hash,
        "blockHash": "0xaa11",
        "blockNumber": "0x112a880",
        "transactionIndex": format!("{index:#x}"),
        "chainId": "0x1",
        "from": "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf",
        "to": "0x2b5ad5c4795c026514f8317c7a215e218dccd6cf",
        "nonce": "0x5",
        "value": "0xde0b6b3a7640000",
        "gasPrice": "0x3b9aca00",
        "gas": "0x15f90",
        "input": "0x",
        "v": "0x25",
        "r": "0x1b5e176d927f8e9ab405058b2d2457392da3e20f328b16ddabcebc33eaac5fea",
        "s": "0x4ba69724e8f69de52f0125ad8b3c5c2cef33019bac3249e2c0a2192766d1721c",
    })
}

pub fn raw_receipt(gas_used: &str, status: &str) -> Value {
    json!({
        "gasUsed": gas_used,
        "status": status,
        "cumulativeGasUsed": gas_used,
        "logs": [],
    })
}

pub fn raw_block(hash: &str, timestamp: &str, transactions: Vec<Value>) -> Value {
    json!({
        "hash": hash,
        "number": "0x112a880",
        "timestamp": timestamp,
        "transactions": transactions,
    })
}
