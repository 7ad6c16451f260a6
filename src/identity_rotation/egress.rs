use log::{debug, warn};
use std::time::Duration;

use crate::configuration::EgressConfig;
use crate::extraction::UNKNOWN;

/// Reports the public address traffic currently leaves from.
#[allow(async_fn_in_trait)]
pub trait AddressLookup {
    /// Returns the address, or `"Unknown"` when no endpoint answers.
    async fn current_address(&self) -> String;
}

/// Asks plain-text IP echo services in order; the first non-empty answer wins.
pub struct HttpAddressLookup {
    client: reqwest::Client,
    endpoints: Vec<String>,
}

impl HttpAddressLookup {
    pub fn new(config: &EgressConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoints: config.endpoints.clone(),
        })
    }

    async fn query(&self, endpoint: &str) -> Result<String, reqwest::Error> {
        let body = self
            .client
            .get(endpoint)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body.trim().to_string())
    }
}

impl AddressLookup for HttpAddressLookup {
    async fn current_address(&self) -> String {
        for endpoint in &self.endpoints {
            match self.query(endpoint).await {
                Ok(address) if !address.is_empty() => {
                    debug!("Egress address {} from {}", address, endpoint);
                    return address;
                }
                Ok(_) => debug!("Empty egress answer from {}", endpoint),
                Err(e) => debug!("Egress lookup via {} failed: {}", endpoint, e),
            }
        }
        warn!("Could not determine egress address from any endpoint");
        UNKNOWN.to_string()
    }
}
