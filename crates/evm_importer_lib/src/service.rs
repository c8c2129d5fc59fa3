use futures::StreamExt;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use web3::api::SubscriptionId;
use web3::transports::{Http, WebSocket};
use web3::types::U256;
use web3::{DuplexTransport, Transport};

use crate::config::ImporterSettings;
use crate::db::BlockSink;
use crate::decode::decode_block_header;
use crate::error::ImporterError;
use crate::process::enrich_block;
use crate::rpc::resolve_chain_id;

const CONNECT_RETRY_INTERVAL: Duration = Duration::from_secs(5);
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Registry of block hashes with an enrichment task in flight. Duplicate
/// newHeads notifications for the same hash are dropped while the first
/// task is still running.
pub struct InflightBlocks {
    inflight: Mutex<HashSet<String>>,
}

impl InflightBlocks {
    pub fn new() -> Self {
        Self {
            inflight: Mutex::new(HashSet::new()),
        }
    }

    /// Returns false if the block is already being enriched.
    pub fn begin(&self, block_hash: &str) -> bool {
        self.inflight.lock().unwrap().insert(block_hash.to_string())
    }

    pub fn done(&self, block_hash: &str) {
        self.inflight.lock().unwrap().remove(block_hash);
    }
}

impl Default for InflightBlocks {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-connection state. The chain id is resolved once per established
/// connection and invalidated by dropping the connection.
struct NodeConnection {
    // dropping the transport handle tears down the socket task
    #[allow(dead_code)]
    ws: WebSocket,
    chain_id: U256,
    notifications: <WebSocket as DuplexTransport>::NotificationStream,
}

async fn subscribe_new_heads(ws: &WebSocket) -> Result<SubscriptionId, ImporterError> {
    let response = ws
        .execute("eth_subscribe", vec![Value::String("newHeads".to_string())])
        .await?;
    let Some(subscription_id) = response.as_str() else {
        return Err(ImporterError::RpcError(format!(
            "eth_subscribe returned a non-string subscription id: {response}"
        )));
    };
    Ok(SubscriptionId::from(subscription_id.to_string()))
}

async fn try_connect(ws_url: &str, http: &Http) -> Result<NodeConnection, ImporterError> {
    let ws = WebSocket::new(ws_url).await?;
    let subscription = subscribe_new_heads(&ws).await?;
    let notifications = ws.subscribe(subscription)?;
    let chain_id = resolve_chain_id(http).await?;
    Ok(NodeConnection {
        ws,
        chain_id,
        notifications,
    })
}

/// Dials until a subscription is established. Transport failures are
/// retried indefinitely on a fixed interval; protocol violations during
/// the subscribe handshake are not recoverable by redialing and bubble up.
async fn connect(ws_url: &str, http: &Http) -> Result<NodeConnection, ImporterError> {
    loop {
        match try_connect(ws_url, http).await {
            Ok(conn) => return Ok(conn),
            Err(err @ ImporterError::RpcError(_)) => return Err(err),
            Err(err) => {
                log::error!("Error connecting to node: {err}");
                log::info!(
                    "Retrying in {} seconds...",
                    CONNECT_RETRY_INTERVAL.as_secs()
                );
                tokio::time::sleep(CONNECT_RETRY_INTERVAL).await;
            }
        }
    }
}

/// Decodes one newHeads notification, persists the header and dispatches
/// the enrichment task. The header write always precedes the dispatch of
/// its own enrichment; the enrichment itself never blocks the caller.
///
/// Decode and persistence failures are logged and the unit of work is
/// dropped; the subscription keeps running.
pub(crate) async fn handle_new_head<T>(
    raw_header: &Value,
    chain_id: U256,
    transport: &T,
    sink: &Arc<dyn BlockSink>,
    inflight: &Arc<InflightBlocks>,
    enrich_slots: &Arc<Semaphore>,
) -> Option<JoinHandle<()>>
where
    T: Transport + Send + Sync + 'static,
    T::Out: Send,
{
    let header = match decode_block_header(raw_header, chain_id) {
        Ok(header) => header,
        Err(err) => {
            log::error!("Failed to decode block header: {err}");
            return None;
        }
    };
    log::info!("Received block {} ({})", header.number, header.hash);

    if !inflight.begin(&header.hash) {
        log::debug!(
            "Enrichment for block {} already in flight, skipping duplicate notification",
            header.hash
        );
        return None;
    }

    if let Err(err) = sink.save_block_header(&header).await {
        log::error!("Failed to save block header {}: {err}", header.hash);
    }

    let block_hash = header.hash;
    let transport = transport.clone();
    let sink = sink.clone();
    let inflight = inflight.clone();
    let enrich_slots = enrich_slots.clone();
    Some(tokio::spawn(async move {
        // queue on the semaphore inside the task so the read loop never waits
        let Ok(_permit) = enrich_slots.acquire_owned().await else {
            return;
        };
        match enrich_block(&transport, &block_hash, sink.as_ref()).await {
            Ok(0) => {}
            Ok(count) => log::info!("Saved {count} transactions from block {block_hash}"),
            Err(err) => log::error!("Failed to enrich block {block_hash}: {err}"),
        }
        inflight.done(&block_hash);
    }))
}

/// Owns the persistent newHeads subscription. Blocks for the lifetime of
/// the process: a closed socket reconnects (and re-subscribes) after a
/// short delay, a dial failure retries indefinitely. Never returns on the
/// happy path.
pub async fn subscription_loop(
    ws_url: &str,
    http: Http,
    sink: Arc<dyn BlockSink>,
    settings: &ImporterSettings,
) -> Result<(), ImporterError> {
    let inflight = Arc::new(InflightBlocks::new());
    let enrich_slots = Arc::new(Semaphore::new(settings.max_in_flight));

    loop {
        let mut conn = connect(ws_url, &http).await?;
        log::info!(
            "Connected to node (chain id {}), processing block headers...",
            conn.chain_id
        );

        while let Some(raw_header) = conn.notifications.next().await {
            handle_new_head(
                &raw_header,
                conn.chain_id,
                &http,
                &sink,
                &inflight,
                &enrich_slots,
            )
            .await;
        }

        log::warn!("Node connection closed, attempting to reconnect...");
        tokio::time::sleep(RECONNECT_DELAY).await;
    }
}
