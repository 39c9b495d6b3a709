//! # Huewheel Bridge
//!
//! Discovery and REST client for the Philips Hue bridge v1 API.
//!
//! This crate covers the wire side of the controller: finding a bridge on
//! the local network, pairing with it, reading its full state and writing
//! partial light-state updates.
//!
//! ## Features
//!
//! - **BridgeDiscovery trait**: Abstraction over bridge discovery
//! - **BridgeApi trait**: Abstraction over the bridge's REST API
//! - **PortalDiscovery / HueClient**: HTTP implementations backed by reqwest
//! - **FixedDiscovery / InMemoryBridge**: In-memory implementations for
//!   testing and demo mode
//!
//! ## Example
//!
//! ```rust,ignore
//! use huewheel_bridge::{BridgeApi, BridgeDiscovery, HueClient, PortalDiscovery};
//!
//! #[tokio::main]
//! async fn main() -> huewheel_bridge::Result<()> {
//!     let bridges = PortalDiscovery::new().discover().await?;
//!     let client = HueClient::new(&bridges[0].internalipaddress);
//!     let username = client.create_user("huewheel#desktop").await?;
//!     let state = client.full_state(&username).await?;
//!     println!("{} lights", state.lights.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod memory;
pub mod model;

// Re-exports
pub use client::{DISCOVERY_URL, HueClient, PortalDiscovery};
pub use error::{BridgeError, Result};
pub use memory::{FixedDiscovery, InMemoryBridge};
pub use model::{
    ApiError, BridgeConfig, DiscoveredBridge, FullState, Group, Light, LightState, StateUpdate,
};

use async_trait::async_trait;

/// Trait for locating Hue bridges on the network.
#[async_trait]
pub trait BridgeDiscovery: Send + Sync {
    /// Lists the bridges currently visible.
    ///
    /// An empty list is not an error at this layer; callers decide how to
    /// react to a network without bridges.
    async fn discover(&self) -> Result<Vec<DiscoveredBridge>>;
}

/// Trait for the per-bridge REST API.
///
/// All methods take the API username explicitly so one client can serve
/// both the pairing flow (no username yet) and normal operation.
#[async_trait]
pub trait BridgeApi: Send + Sync {
    /// Registers a new API user, returning the generated username.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::LinkButtonNotPressed`] until the physical
    /// button on the bridge is pressed.
    async fn create_user(&self, device_type: &str) -> Result<String>;

    /// Fetches everything the bridge knows: lights, groups and config.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Unauthorized`] when `username` is not
    /// registered on the bridge.
    async fn full_state(&self, username: &str) -> Result<FullState>;

    /// Writes a partial state update to one light.
    ///
    /// Only the fields set in `update` are transmitted; the rest of the
    /// light's state is left untouched.
    async fn set_light_state(
        &self,
        username: &str,
        light_id: &str,
        update: &StateUpdate,
    ) -> Result<()>;
}
