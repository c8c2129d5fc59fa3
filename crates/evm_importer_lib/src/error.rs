use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImporterError {
    #[error("Hex conversion error: {0}")]
    HexError(#[from] rustc_hex::FromHexError),
    #[error("conversion error: {0}")]
    ConversionError(#[from] crate::utils::ConversionError),
    #[error("web3 error: {0}")]
    Web3Error(#[from] web3::Error),
    #[error("clickhouse error: {0}")]
    ClickhouseError(#[from] clickhouse::error::Error),
    #[error("crypto error: {0}")]
    CryptoError(#[from] secp256k1::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Decode error: {0}")]
    DecodeError(String),
    #[error("Parsing error: {0}")]
    ParsingError(String),
    #[error("RPC error: {0}")]
    RpcError(String),
    #[error("Other error: {0}")]
    OtherError(String),
}
