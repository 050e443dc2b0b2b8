use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Url;
use std::{fmt::Debug, time::Duration};

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(3);

/// Reachability check made before any weather request is issued.
#[async_trait]
pub trait NetworkCapability: Send + Sync + Debug {
    async fn is_network_available(&self) -> bool;
}

/// Treats the network as available when the API host resolves.
#[derive(Debug, Clone)]
pub struct DnsReachability {
    authority: String,
}

impl DnsReachability {
    pub fn for_base_url(base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url)
            .with_context(|| format!("Invalid weather API base URL: {base_url}"))?;
        let host = url
            .host_str()
            .ok_or_else(|| anyhow!("Weather API base URL has no host: {base_url}"))?;
        let port = url.port_or_known_default().unwrap_or(443);

        Ok(Self { authority: format!("{host}:{port}") })
    }
}

#[async_trait]
impl NetworkCapability for DnsReachability {
    async fn is_network_available(&self) -> bool {
        match tokio::time::timeout(LOOKUP_TIMEOUT, tokio::net::lookup_host(&self.authority)).await {
            Ok(Ok(mut addrs)) => addrs.next().is_some(),
            Ok(Err(err)) => {
                tracing::debug!(authority = %self.authority, error = %err, "host lookup failed");
                false
            }
            Err(_) => {
                tracing::debug!(authority = %self.authority, "host lookup timed out");
                false
            }
        }
    }
}
