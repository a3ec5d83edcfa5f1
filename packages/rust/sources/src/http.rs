//! Shared HTTP plumbing for every provider.

use std::time::Duration;

use reqwest::Client;

use dsamaster_shared::{DsaMasterError, Result};

/// User-Agent string for provider requests.
pub const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; DSAMaster/",
    env!("CARGO_PKG_VERSION"),
    "; +https://github.com/)"
);

/// Maximum number of redirects followed per request.
const MAX_REDIRECTS: usize = 5;

/// Build a reqwest client with the given request timeout.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(timeout)
        .build()
        .map_err(|e| DsaMasterError::Network(format!("failed to build HTTP client: {e}")))
}

/// GET a page and return its body, failing on non-2xx statuses.
pub(crate) async fn fetch_html(client: &Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| DsaMasterError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(DsaMasterError::Network(format!("{url}: HTTP {status}")));
    }

    response
        .text()
        .await
        .map_err(|e| DsaMasterError::Network(format!("{url}: failed to read body: {e}")))
}
