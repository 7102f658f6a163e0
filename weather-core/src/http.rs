use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Result, WeatherError, truncate_body};

/// Build the shared HTTP client. NWS and Nominatim reject requests without a User-Agent.
pub fn build_client(user_agent: &str, timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|source| WeatherError::Request {
            service: "http client",
            source,
        })
}

/// Send a request and decode the JSON body, mapping each failure to a `WeatherError`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
    service: &'static str,
) -> Result<T> {
    let res = request
        .send()
        .await
        .map_err(|source| WeatherError::Request { service, source })?;

    let status = res.status();
    debug!(service, %status, url = %res.url(), "received response");

    let body = res
        .text()
        .await
        .map_err(|source| WeatherError::Request { service, source })?;

    if !status.is_success() {
        return Err(WeatherError::Status {
            service,
            status,
            body: truncate_body(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| WeatherError::parse(service, e))
}
