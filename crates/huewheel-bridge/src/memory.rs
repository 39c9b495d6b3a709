//! In-memory implementations of the bridge traits.
//!
//! [`InMemoryBridge`] behaves like a real bridge for testing and for demo
//! mode: it enforces the link button during pairing, rejects unknown
//! usernames, and applies state writes to its own full-state copy. Every
//! accepted write is recorded so tests can assert on exactly what was sent.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{BridgeError, Result};
use crate::model::{DiscoveredBridge, FullState, Light, StateUpdate};
use crate::{BridgeApi, BridgeDiscovery};

/// Discovery that answers with a fixed list of bridges.
pub struct FixedDiscovery {
    bridges: Vec<DiscoveredBridge>,
    calls: AtomicU32,
}

impl FixedDiscovery {
    pub fn new(bridges: Vec<DiscoveredBridge>) -> Self {
        Self {
            bridges,
            calls: AtomicU32::new(0),
        }
    }

    /// A portal reporting one bridge at the given address.
    pub fn single(ip: &str) -> Self {
        Self::new(vec![DiscoveredBridge {
            id: "001788fffe09abcd".to_string(),
            internalipaddress: ip.to_string(),
        }])
    }

    /// A portal reporting no bridges at all.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// How many times `discover` has been called.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BridgeDiscovery for FixedDiscovery {
    async fn discover(&self) -> Result<Vec<DiscoveredBridge>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.bridges.clone())
    }
}

/// An in-memory bridge holding a mutable full state.
pub struct InMemoryBridge {
    state: Mutex<FullState>,
    users: Mutex<HashSet<String>>,
    link_button: AtomicBool,
    next_user: AtomicU32,
    writes: Mutex<Vec<(String, StateUpdate)>>,
}

impl InMemoryBridge {
    pub fn new(state: FullState) -> Self {
        Self {
            state: Mutex::new(state),
            users: Mutex::new(HashSet::new()),
            link_button: AtomicBool::new(false),
            next_user: AtomicU32::new(0),
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Pre-registers a username, as if pairing had happened earlier.
    pub fn with_user(mut self, username: &str) -> Self {
        self.users.get_mut().insert(username.to_string());
        self
    }

    /// Simulates pressing the physical link button, allowing pairing.
    pub fn press_link_button(&self) {
        self.link_button.store(true, Ordering::SeqCst);
    }

    /// How many usernames `create_user` has issued.
    pub fn issued_users(&self) -> u32 {
        self.next_user.load(Ordering::SeqCst)
    }

    /// All state writes accepted so far, in order.
    pub async fn writes(&self) -> Vec<(String, StateUpdate)> {
        self.writes.lock().await.clone()
    }

    /// Current copy of one light, if it exists.
    pub async fn light(&self, light_id: &str) -> Option<Light> {
        self.state.lock().await.lights.get(light_id).cloned()
    }
}

#[async_trait]
impl BridgeApi for InMemoryBridge {
    async fn create_user(&self, _device_type: &str) -> Result<String> {
        if !self.link_button.load(Ordering::SeqCst) {
            return Err(BridgeError::LinkButtonNotPressed);
        }
        let n = self.next_user.fetch_add(1, Ordering::SeqCst);
        let username = format!("inmemory-user-{n}");
        self.users.lock().await.insert(username.clone());
        Ok(username)
    }

    async fn full_state(&self, username: &str) -> Result<FullState> {
        if !self.users.lock().await.contains(username) {
            return Err(BridgeError::Unauthorized);
        }
        Ok(self.state.lock().await.clone())
    }

    async fn set_light_state(
        &self,
        username: &str,
        light_id: &str,
        update: &StateUpdate,
    ) -> Result<()> {
        if !self.users.lock().await.contains(username) {
            return Err(BridgeError::Unauthorized);
        }
        {
            let mut state = self.state.lock().await;
            let light = state.lights.get_mut(light_id).ok_or_else(|| BridgeError::Api {
                code: 3,
                description: format!("resource, /lights/{light_id}, not available"),
            })?;
            if update.xy.is_some() && light.state.xy.is_none() {
                return Err(BridgeError::Api {
                    code: 6,
                    description: "parameter, xy, not available".to_string(),
                });
            }
            if let Some(on) = update.on {
                light.state.on = on;
            }
            if let Some(bri) = update.bri {
                light.state.bri = bri;
            }
            if let Some(xy) = update.xy {
                light.state.xy = Some(xy);
            }
        }
        self.writes
            .lock()
            .await
            .push((light_id.to_string(), *update));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LightState;
    use huewheel_color::Xy;

    fn fixture() -> FullState {
        let mut state = FullState::default();
        state.lights.insert(
            "1".to_string(),
            Light {
                name: "Desk".to_string(),
                state: LightState {
                    on: true,
                    bri: 200,
                    xy: Some(Xy::new(0.4, 0.4)),
                    ..LightState::default()
                },
                ..Light::default()
            },
        );
        state.lights.insert(
            "2".to_string(),
            Light {
                name: "Hallway".to_string(),
                state: LightState {
                    on: false,
                    bri: 254,
                    ..LightState::default()
                },
                ..Light::default()
            },
        );
        state
    }

    #[tokio::test]
    async fn test_pairing_requires_link_button() {
        let bridge = InMemoryBridge::new(fixture());
        assert!(matches!(
            bridge.create_user("huewheel#test").await,
            Err(BridgeError::LinkButtonNotPressed)
        ));

        bridge.press_link_button();
        let username = bridge.create_user("huewheel#test").await.unwrap();
        assert_eq!(bridge.full_state(&username).await.unwrap().lights.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_username_is_unauthorized() {
        let bridge = InMemoryBridge::new(fixture());
        assert!(matches!(
            bridge.full_state("stale-user").await,
            Err(BridgeError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_writes_apply_and_are_recorded() {
        let bridge = InMemoryBridge::new(fixture()).with_user("u");
        let update = StateUpdate {
            on: Some(false),
            bri: Some(120),
            xy: Some(Xy::new(0.3, 0.3)),
        };
        bridge.set_light_state("u", "1", &update).await.unwrap();

        let light = bridge.light("1").await.unwrap();
        assert!(!light.state.on);
        assert_eq!(light.state.bri, 120);
        assert_eq!(light.state.xy, Some(Xy::new(0.3, 0.3)));

        let writes = bridge.writes().await;
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, "1");
        assert_eq!(writes[0].1, update);
    }

    #[tokio::test]
    async fn test_color_write_to_colorless_light_is_rejected() {
        let bridge = InMemoryBridge::new(fixture()).with_user("u");
        let update = StateUpdate {
            xy: Some(Xy::new(0.3, 0.3)),
            ..StateUpdate::default()
        };
        let err = bridge.set_light_state("u", "2", &update).await.unwrap_err();
        assert!(matches!(err, BridgeError::Api { code: 6, .. }));
    }

    #[tokio::test]
    async fn test_missing_light_is_reported() {
        let bridge = InMemoryBridge::new(fixture()).with_user("u");
        let err = bridge
            .set_light_state("u", "99", &StateUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Api { code: 3, .. }));
    }
}
