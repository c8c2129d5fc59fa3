mod options;

use evm_importer_lib::config::Config;
use evm_importer_lib::error::ImporterError;
use evm_importer_lib::runtime::start_importer;

use crate::options::validated_cli;

#[tokio::main]
async fn main() -> Result<(), ImporterError> {
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = validated_cli()?;
    let config = Config::load(&cli.config_path)?;

    let importer = start_importer(config).await?;
    importer
        .runtime_handle
        .await
        .map_err(|e| ImporterError::OtherError(format!("Importer loop failed: {e:?}")))??;
    Ok(())
}
