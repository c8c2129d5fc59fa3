use clickhouse::Client;

use crate::config::ClickhouseSettings;
use crate::error::ImporterError;

const RECEIVE_TIMEOUT_SECS: &str = "10";
const SEND_TIMEOUT_SECS: &str = "20";

pub struct ClickhouseDb {
    pub(crate) client: Client,
}

pub async fn create_clickhouse_connection(
    settings: &ClickhouseSettings,
) -> Result<ClickhouseDb, ImporterError> {
    let url = format!("http://{}:{}", settings.host, settings.port);
    log::info!("Connecting to Clickhouse at {url}");

    let client = Client::default()
        .with_url(url)
        .with_user(settings.user.as_str())
        .with_password(settings.password.as_str())
        .with_database(settings.database.as_str())
        .with_option("receive_timeout", RECEIVE_TIMEOUT_SECS)
        .with_option("send_timeout", SEND_TIMEOUT_SECS);

    // fail at startup on an unreachable store or bad credentials
    client.query("SELECT 1").execute().await?;

    Ok(ClickhouseDb { client })
}
