//! HTTP implementations of the discovery and bridge API traits.

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::error::{BridgeError, Result};
use crate::model::{CreateUserReply, DiscoveredBridge, FullState, StateUpdate, WriteReply};
use crate::{BridgeApi, BridgeDiscovery};

/// N-UPnP portal that lists bridges seen on the caller's public IP.
pub const DISCOVERY_URL: &str = "https://discovery.meethue.com/";

/// Bridge discovery via the meethue N-UPnP portal.
pub struct PortalDiscovery {
    client: reqwest::Client,
    url: String,
}

impl PortalDiscovery {
    pub fn new() -> Self {
        Self::with_url(DISCOVERY_URL)
    }

    /// Point discovery at a different portal, e.g. a test server.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

impl Default for PortalDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BridgeDiscovery for PortalDiscovery {
    async fn discover(&self) -> Result<Vec<DiscoveredBridge>> {
        debug!(url = %self.url, "querying discovery portal");
        let bridges: Vec<DiscoveredBridge> = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(count = bridges.len(), "discovery portal answered");
        Ok(bridges)
    }
}

/// REST client bound to one bridge's IP address.
pub struct HueClient {
    client: reqwest::Client,
    base: String,
}

impl HueClient {
    /// Creates a client for the bridge at `ip` (plain HTTP, as the v1 API
    /// serves no usable certificate).
    pub fn new(ip: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: format!("http://{ip}"),
        }
    }
}

#[async_trait]
impl BridgeApi for HueClient {
    async fn create_user(&self, device_type: &str) -> Result<String> {
        let url = format!("{}/api", self.base);
        debug!(url = %url, device_type, "registering api user");
        let body = serde_json::json!({ "devicetype": device_type });
        let replies: Vec<CreateUserReply> = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let reply = replies.into_iter().next().ok_or_else(|| {
            BridgeError::UnexpectedReply("empty create-user reply".to_string())
        })?;
        if let Some(error) = reply.error {
            return Err(error.into());
        }
        match reply.success {
            Some(created) => {
                debug!("bridge issued a username");
                Ok(created.username)
            }
            None => Err(BridgeError::UnexpectedReply(
                "create-user reply carried neither success nor error".to_string(),
            )),
        }
    }

    async fn full_state(&self, username: &str) -> Result<FullState> {
        let url = format!("{}/api/{}/", self.base, username);
        debug!(url = %url, "fetching full state");
        let value: serde_json::Value = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let state = crate::model::parse_full_state(value)?;
        debug!(lights = state.lights.len(), "full state cached");
        Ok(state)
    }

    async fn set_light_state(
        &self,
        username: &str,
        light_id: &str,
        update: &StateUpdate,
    ) -> Result<()> {
        let url = format!("{}/api/{}/lights/{}/state", self.base, username, light_id);
        trace!(light_id, ?update, "writing light state");
        let replies: Vec<WriteReply> = self
            .client
            .put(&url)
            .json(update)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if let Some(error) = replies.into_iter().find_map(|r| r.error) {
            return Err(error.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_are_built_from_the_bridge_ip() {
        let client = HueClient::new("192.168.1.42");
        assert_eq!(client.base, "http://192.168.1.42");
    }
}
