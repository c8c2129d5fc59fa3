use std::sync::Arc;
use tokio::task::JoinHandle;
use web3::transports::Http;

use crate::config::Config;
use crate::db::{create_clickhouse_connection, BlockSink};
use crate::error::ImporterError;
use crate::service::subscription_loop;

pub struct ImporterRuntime {
    pub runtime_handle: JoinHandle<Result<(), ImporterError>>,
}

/// Connects the store, builds the RPC transport and spawns the
/// subscription loop. The returned handle lives as long as the process.
pub async fn start_importer(config: Config) -> Result<ImporterRuntime, ImporterError> {
    let db = create_clickhouse_connection(&config.clickhouse).await?;
    log::info!("Connected to Clickhouse");

    let sink: Arc<dyn BlockSink> = Arc::new(db);
    let http = Http::new(&config.node.http_url)?;

    let jh = tokio::spawn(async move {
        subscription_loop(&config.node.ws_url, http, sink, &config.importer).await
    });

    Ok(ImporterRuntime { runtime_handle: jh })
}
