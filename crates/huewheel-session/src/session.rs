//! The session owns one run of the app: settings, the chosen bridge, the
//! cached full state, the working set of lights, the panels and the wheel.
//!
//! Startup walks connect → authenticate → cache full state → render; every
//! stage reports through the status banner. After startup, interactive
//! operations mutate the light records through their setters and end in
//! [`Session::flush`], which pushes each light's changed fields to the
//! bridge one at a time.

use std::sync::Arc;

use rand::seq::SliceRandom;
use tracing::{debug, info, trace, warn};

use huewheel_bridge::{BridgeApi, BridgeDiscovery, FullState, HueClient, PortalDiscovery};
use huewheel_color::Xy;

use crate::error::{AuthError, ConnectError, FullStateError, SessionError, StartupError};
use crate::lights::{LightId, LightRecord, SwitchPanels};
use crate::settings::{LightSetting, Settings, SettingsStore};
use crate::status::StatusBanner;
use crate::wheel::{WheelMode, WheelModel};

/// Identifier sent to the bridge when pairing.
pub const DEVICE_TYPE: &str = "huewheel#desktop";

/// Builds an API client for a discovered or stored bridge address.
pub type Connector = Box<dyn Fn(&str) -> Arc<dyn BridgeApi> + Send + Sync>;

pub struct Session {
    store: SettingsStore,
    discovery: Arc<dyn BridgeDiscovery>,
    connector: Connector,
    bridge_ip: Option<String>,
    username: Option<String>,
    api: Option<Arc<dyn BridgeApi>>,
    cache: Option<FullState>,
    records: Vec<LightRecord>,
    panels: SwitchPanels,
    wheel: WheelModel,
    banner: Option<StatusBanner>,
    demo: bool,
}

impl Session {
    /// A live session: portal discovery plus an HTTP client per bridge.
    pub fn new(store: SettingsStore) -> Self {
        Self::with_bridge(
            store,
            Arc::new(PortalDiscovery::new()),
            Box::new(|ip| Arc::new(HueClient::new(ip)) as Arc<dyn BridgeApi>),
        )
    }

    /// A session with explicit discovery and client wiring.
    pub fn with_bridge(
        store: SettingsStore,
        discovery: Arc<dyn BridgeDiscovery>,
        connector: Connector,
    ) -> Self {
        Self {
            store,
            discovery,
            connector,
            bridge_ip: None,
            username: None,
            api: None,
            cache: None,
            records: Vec::new(),
            panels: SwitchPanels::default(),
            wheel: WheelModel::default(),
            banner: None,
            demo: false,
        }
    }

    // ============================================================
    // Startup pipeline
    // ============================================================

    /// Runs the whole startup pipeline, leaving a banner behind either way.
    pub async fn init(&mut self) -> Result<(), StartupError> {
        self.reset();
        self.banner = Some(StatusBanner::connecting());
        info!("session starting");

        let result = self.startup().await;
        match &result {
            Ok(()) => {
                self.banner = Some(StatusBanner::connected());
            }
            Err(error) => {
                warn!(%error, "startup failed");
                self.banner = Some(StatusBanner::failure(error));
            }
        }
        result
    }

    /// Renders the bundled fixture without touching the network.
    pub fn start_demo(&mut self, state: FullState) {
        self.reset();
        self.demo = true;
        info!(lights = state.lights.len(), "starting demo session");
        self.render(state);
    }

    fn reset(&mut self) {
        self.bridge_ip = None;
        self.username = None;
        self.api = None;
        self.cache = None;
        self.records.clear();
        self.panels = SwitchPanels::default();
        self.wheel = WheelModel::default();
        self.banner = None;
        self.demo = false;
    }

    async fn startup(&mut self) -> Result<(), StartupError> {
        let ip = self.connect().await?;
        let api = (self.connector)(&ip);
        self.bridge_ip = Some(ip);
        self.api = Some(api.clone());

        let username = self.authenticate(api.as_ref(), false).await?;
        let state = match self.fetch_state(api.as_ref(), &username).await {
            Ok(state) => state,
            Err(FullStateError::Unauthorized) => {
                // Stale credential: clear it, pair again, retry exactly once.
                warn!("stored username rejected, pairing again");
                self.username = None;
                self.persist(|s| s.username = None);
                let fresh = self.authenticate(api.as_ref(), true).await?;
                self.fetch_state(api.as_ref(), &fresh).await?
            }
            Err(other) => return Err(other.into()),
        };

        info!(lights = state.lights.len(), "connected to bridge");
        self.render(state);
        Ok(())
    }

    /// Picks a bridge address: the stored one when auto-discovery is off,
    /// otherwise the first bridge the portal reports (persisted for later).
    async fn connect(&mut self) -> Result<String, ConnectError> {
        let settings = self.store.get();
        if let Some(ip) = settings.bridge_ip.clone() {
            if !settings.auto_discover {
                debug!(ip = %ip, "using stored bridge address");
                return Ok(ip);
            }
        }

        info!("querying discovery portal");
        let bridges = self
            .discovery
            .discover()
            .await
            .map_err(ConnectError::Portal)?;
        let Some(first) = bridges.into_iter().next() else {
            return Err(ConnectError::NoBridges);
        };
        info!(ip = %first.internalipaddress, bridge = %first.id, "bridge discovered");

        let ip = first.internalipaddress;
        self.persist(|s| s.bridge_ip = Some(ip.clone()));
        Ok(ip)
    }

    /// Resolves the API username: the stored one unless `create_new` forces
    /// a fresh pairing.
    async fn authenticate(
        &mut self,
        api: &dyn BridgeApi,
        create_new: bool,
    ) -> Result<String, AuthError> {
        if !create_new {
            if let Some(username) = self.store.get().username.clone() {
                debug!("using stored api username");
                self.username = Some(username.clone());
                return Ok(username);
            }
        }

        info!("pairing with the bridge");
        let username = api
            .create_user(DEVICE_TYPE)
            .await
            .map_err(AuthError::from_bridge)?;
        info!("bridge issued a username");
        self.username = Some(username.clone());
        self.persist(|s| s.username = Some(username.clone()));
        Ok(username)
    }

    async fn fetch_state(
        &self,
        api: &dyn BridgeApi,
        username: &str,
    ) -> Result<FullState, FullStateError> {
        debug!("caching bridge full state");
        api.full_state(username)
            .await
            .map_err(FullStateError::from_bridge)
    }

    /// Builds the working set, panels and wheel from a fresh full state.
    ///
    /// On the very first run the per-light settings are initialized from the
    /// cache, one active entry per light. Afterwards a light is shown when
    /// no entry matches its name or the matching entry is active.
    fn render(&mut self, state: FullState) {
        let mut ids: Vec<LightId> = state.lights.keys().cloned().collect();
        ids.sort_by_key(|id| (id.parse::<u32>().unwrap_or(u32::MAX), id.clone()));

        if self.store.get().lights.is_none() {
            let entries: Vec<LightSetting> = ids
                .iter()
                .filter_map(|id| state.lights.get(id))
                .map(|light| LightSetting {
                    name: light.name.clone(),
                    active: true,
                })
                .collect();
            self.persist(|s| s.lights = Some(entries));
        }

        let chosen = self.store.get().lights.clone();
        let mut records = Vec::new();
        for id in &ids {
            let Some(light) = state.lights.get(id) else {
                continue;
            };
            let active = chosen
                .as_ref()
                .and_then(|entries| entries.iter().find(|e| e.name == light.name))
                .map_or(true, |entry| entry.active);
            if active {
                records.push(LightRecord::from_cache(id, light));
            }
        }
        debug!(
            total = state.lights.len(),
            shown = records.len(),
            "working set built"
        );

        self.records = records;
        self.panels = SwitchPanels::from_records(&self.records);
        self.wheel = WheelModel::build(&self.records, &self.panels);
        self.cache = Some(state);
    }

    /// Best-effort settings write; a failed save never aborts the pipeline.
    fn persist(&mut self, f: impl FnOnce(&mut Settings)) {
        if let Err(error) = self.store.update(f) {
            warn!(%error, "failed to persist settings");
        }
    }

    // ============================================================
    // Interactive operations
    // ============================================================

    /// Switches a light, moves its panel row, updates its marker and pushes
    /// the result.
    pub async fn toggle_light(&mut self, light_id: &str, on: bool) -> Result<(), SessionError> {
        let record = self.record_mut(light_id)?;
        record.set_on(on);
        debug!(light = light_id, on, "light toggled");

        if on {
            self.panels.move_to_on(light_id);
        } else {
            self.panels.move_to_off(light_id);
        }
        self.wheel.set_visible(light_id, on);
        self.wheel.rebuild_table(&self.panels);
        self.wheel.apply_to_lights(&mut self.records);
        self.flush().await;
        Ok(())
    }

    /// Sets brightness; rejected while the light is off, matching the
    /// disabled slider.
    pub async fn set_brightness(&mut self, light_id: &str, bri: u8) -> Result<(), SessionError> {
        let record = self.record_mut(light_id)?;
        if !record.is_on() {
            return Err(SessionError::LightOff(light_id.to_string()));
        }
        record.set_bri(bri);
        self.flush().await;
        Ok(())
    }

    /// Moves a light's marker to a new hue and pushes the wheel state.
    pub async fn set_marker_hue(
        &mut self,
        light_id: &str,
        degrees: f32,
    ) -> Result<(), SessionError> {
        if self.record(light_id).is_none() {
            return Err(SessionError::UnknownLight(light_id.to_string()));
        }
        if !self.wheel.set_hue(light_id, degrees) {
            return Err(SessionError::NoColorSupport(light_id.to_string()));
        }
        debug!(light = light_id, degrees, "marker moved");
        self.wheel_update().await;
        Ok(())
    }

    /// Applies every visible marker to its light and pushes the changes;
    /// the tail end of any wheel interaction.
    pub async fn wheel_update(&mut self) {
        self.wheel.apply_to_lights(&mut self.records);
        self.flush().await;
    }

    /// Switches the wheel mode and re-applies marker colors.
    pub async fn set_mode(&mut self, mode: WheelMode) {
        info!(?mode, "wheel mode set");
        self.wheel.set_mode(mode);
        self.wheel.apply_to_lights(&mut self.records);
        self.flush().await;
    }

    /// Reassigns the lit lights' chromaticities among themselves: a
    /// shuffle of the existing colors, not fresh random ones.
    pub async fn randomize_colors(&mut self) {
        let mut pool: Vec<Xy> = self
            .records
            .iter()
            .filter(|r| r.is_on())
            .filter_map(|r| r.xy())
            .collect();
        info!(lights = pool.len(), "shuffling colors");
        pool.shuffle(&mut rand::rng());

        let mut next = pool.into_iter();
        for record in self
            .records
            .iter_mut()
            .filter(|r| r.is_on() && r.has_color())
        {
            if let Some(xy) = next.next() {
                record.set_xy(xy);
            }
        }
        self.wheel.sync_from_records(&self.records);
        self.flush().await;
    }

    /// Pushes each light's changed fields to the bridge, one light at a
    /// time. Failures are logged and dropped. Returns the number of updates
    /// that went through; demo sessions keep changes local and return 0.
    pub async fn flush(&mut self) -> usize {
        let (Some(api), Some(username)) = (self.api.clone(), self.username.clone()) else {
            for record in &mut self.records {
                let _ = record.take_dirty();
            }
            trace!("no bridge attached, changes stay local");
            return 0;
        };

        let mut sent = 0;
        for record in &mut self.records {
            let update = record.take_dirty();
            if update.is_empty() {
                continue;
            }
            match api.set_light_state(&username, record.id(), &update).await {
                Ok(()) => {
                    trace!(light = record.id(), "state update sent");
                    sent += 1;
                }
                Err(error) => {
                    warn!(light = record.id(), %error, "state update failed, dropping");
                }
            }
        }
        sent
    }

    // ============================================================
    // Settings editing
    // ============================================================

    pub fn settings(&self) -> &Settings {
        self.store.get()
    }

    /// Applies and persists a settings edit. The caller compares the
    /// settings before and after the edit and restarts the session when
    /// they differ.
    pub fn update_settings(
        &mut self,
        f: impl FnOnce(&mut Settings),
    ) -> Result<(), SessionError> {
        self.store.update(f).map_err(SessionError::from)
    }

    // ============================================================
    // Accessors
    // ============================================================

    pub fn banner(&self) -> Option<&StatusBanner> {
        self.banner.as_ref()
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    pub fn records(&self) -> &[LightRecord] {
        &self.records
    }

    pub fn record(&self, light_id: &str) -> Option<&LightRecord> {
        self.records.iter().find(|r| r.id() == light_id)
    }

    pub fn panels(&self) -> &SwitchPanels {
        &self.panels
    }

    pub fn wheel(&self) -> &WheelModel {
        &self.wheel
    }

    pub fn cached_state(&self) -> Option<&FullState> {
        self.cache.as_ref()
    }

    pub fn bridge_ip(&self) -> Option<&str> {
        self.bridge_ip.as_deref()
    }

    pub fn is_demo(&self) -> bool {
        self.demo
    }

    fn record_mut(&mut self, light_id: &str) -> Result<&mut LightRecord, SessionError> {
        self.records
            .iter_mut()
            .find(|r| r.id() == light_id)
            .ok_or_else(|| SessionError::UnknownLight(light_id.to_string()))
    }
}
