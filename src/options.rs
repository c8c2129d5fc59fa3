use std::path::PathBuf;
use structopt::StructOpt;

use evm_importer_lib::error::ImporterError;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "evm_importer",
    about = "Imports EVM blocks and transactions into Clickhouse"
)]
struct CliOptions {
    #[structopt(
        long = "config",
        default_value = "config-importer.toml",
        help = "Path to the importer configuration file"
    )]
    config: PathBuf,
}

pub struct ValidatedOptions {
    pub config_path: PathBuf,
}

pub fn validated_cli() -> Result<ValidatedOptions, ImporterError> {
    let opt: CliOptions = CliOptions::from_args();
    if !opt.config.exists() {
        return Err(ImporterError::OtherError(format!(
            "Config file not found: {}",
            opt.config.display()
        )));
    }
    Ok(ValidatedOptions {
        config_path: opt.config,
    })
}
