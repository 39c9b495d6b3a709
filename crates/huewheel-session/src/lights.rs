//! Session-owned light records and the switch panels.
//!
//! A [`LightRecord`] wraps the cached device state behind setters that flag
//! which fields changed; [`LightRecord::take_dirty`] drains those flags into
//! the partial update the bridge expects. Mutation goes through the setters
//! only; there is no other change-detection mechanism.

use huewheel_bridge::{Light, StateUpdate};
use huewheel_color::Xy;

/// Bridge-assigned light id ("1", "2", ...).
pub type LightId = String;

/// One light in the session's working set.
#[derive(Debug, Clone)]
pub struct LightRecord {
    id: LightId,
    name: String,
    on: bool,
    bri: u8,
    xy: Option<Xy>,
    reachable: bool,
    dirty_on: bool,
    dirty_bri: bool,
    dirty_xy: bool,
}

impl LightRecord {
    pub fn from_cache(id: &str, light: &Light) -> Self {
        Self {
            id: id.to_string(),
            name: light.name.clone(),
            on: light.state.on,
            bri: light.state.bri,
            xy: light.state.xy,
            reachable: light.state.reachable,
            dirty_on: false,
            dirty_bri: false,
            dirty_xy: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn bri(&self) -> u8 {
        self.bri
    }

    pub fn xy(&self) -> Option<Xy> {
        self.xy
    }

    pub fn is_reachable(&self) -> bool {
        self.reachable
    }

    /// Lights without a chromaticity have no marker on the wheel.
    pub fn has_color(&self) -> bool {
        self.xy.is_some()
    }

    pub fn set_on(&mut self, on: bool) {
        if self.on != on {
            self.on = on;
            self.dirty_on = true;
        }
    }

    pub fn set_bri(&mut self, bri: u8) {
        if self.bri != bri {
            self.bri = bri;
            self.dirty_bri = true;
        }
    }

    /// Ignored on lights without color support.
    pub fn set_xy(&mut self, xy: Xy) {
        if self.xy.is_none() {
            return;
        }
        if self.xy != Some(xy) {
            self.xy = Some(xy);
            self.dirty_xy = true;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_on || self.dirty_bri || self.dirty_xy
    }

    /// Drains the dirty flags into a changed-fields-only update.
    pub fn take_dirty(&mut self) -> StateUpdate {
        let update = StateUpdate {
            on: self.dirty_on.then_some(self.on),
            bri: self.dirty_bri.then_some(self.bri),
            xy: if self.dirty_xy { self.xy } else { None },
        };
        self.dirty_on = false;
        self.dirty_bri = false;
        self.dirty_xy = false;
        update
    }
}

/// The two switch panels, each an ordered list of light ids.
///
/// Turning a light on appends its row to the end of the ON panel; turning it
/// off prepends the row to the front of the OFF panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SwitchPanels {
    on: Vec<LightId>,
    off: Vec<LightId>,
}

impl SwitchPanels {
    /// Partition records into panels, keeping the record order.
    pub fn from_records(records: &[LightRecord]) -> Self {
        let mut panels = Self::default();
        for record in records {
            if record.is_on() {
                panels.on.push(record.id().to_string());
            } else {
                panels.off.push(record.id().to_string());
            }
        }
        panels
    }

    pub fn move_to_on(&mut self, light_id: &str) {
        self.remove(light_id);
        self.on.push(light_id.to_string());
    }

    pub fn move_to_off(&mut self, light_id: &str) {
        self.remove(light_id);
        self.off.insert(0, light_id.to_string());
    }

    fn remove(&mut self, light_id: &str) {
        self.on.retain(|id| id != light_id);
        self.off.retain(|id| id != light_id);
    }

    pub fn on_panel(&self) -> &[LightId] {
        &self.on
    }

    pub fn off_panel(&self) -> &[LightId] {
        &self.off
    }

    /// All rows in controls order: ON panel top to bottom, then OFF panel.
    pub fn controls_order(&self) -> impl Iterator<Item = &LightId> {
        self.on.iter().chain(self.off.iter())
    }
}
