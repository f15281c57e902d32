use reqwest::Client;
use std::time::Duration;

use crate::core::VintageError;

/// Build the HTTP client used for Gemini calls
pub fn build(timeout: Duration) -> Result<Client, VintageError> {
    let client = Client::builder()
        .timeout(timeout) // Image edits can take a while
        .pool_max_idle_per_host(5)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()?;
    Ok(client)
}
