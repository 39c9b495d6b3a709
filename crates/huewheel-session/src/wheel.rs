//! The color wheel view-model.
//!
//! The wheel itself is a frontend concern; this module owns what the wheel
//! displays: one marker per color-capable light, the wheel mode, and the
//! marker table mapping lights to marker positions. The table is rebuilt on
//! every panel or visibility change, so interactions never have to reverse
//! lookups out of rendered layout.

use std::collections::HashMap;

use huewheel_color::{Hsv, hsv_to_xy, xy_to_hsv};
use tracing::trace;

use crate::lights::{LightId, LightRecord, SwitchPanels};

/// How the wheel treats saturation and value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WheelMode {
    /// Markers keep whatever saturation/value they were given.
    #[default]
    Custom,
    /// Every marker is pinned to full saturation and value.
    Monochromatic,
}

/// One marker on the wheel.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub light_id: LightId,
    pub hsv: Hsv,
    pub visible: bool,
}

/// Light id ↔ marker position, ordered visible-before-hidden with the
/// visible part following the controls order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerTable {
    slots: Vec<LightId>,
}

impl MarkerTable {
    pub fn position_of(&self, light_id: &str) -> Option<usize> {
        self.slots.iter().position(|id| id == light_id)
    }

    pub fn light_at(&self, position: usize) -> Option<&str> {
        self.slots.get(position).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &LightId)> {
        self.slots.iter().enumerate()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Markers, mode and table together.
#[derive(Debug, Clone, Default)]
pub struct WheelModel {
    mode: WheelMode,
    markers: HashMap<LightId, Marker>,
    table: MarkerTable,
}

impl WheelModel {
    /// Build markers from the working set: one per light with color data,
    /// hue taken from the device chromaticity, saturation and value start
    /// at full, visible iff the light is on.
    pub fn build(records: &[LightRecord], panels: &SwitchPanels) -> Self {
        let mut markers = HashMap::new();
        for record in records {
            let Some(xy) = record.xy() else { continue };
            let hue = xy_to_hsv(xy, 1.0).hue;
            markers.insert(
                record.id().to_string(),
                Marker {
                    light_id: record.id().to_string(),
                    hsv: Hsv::new(hue, 1.0, 1.0),
                    visible: record.is_on(),
                },
            );
        }
        let mut model = Self {
            mode: WheelMode::default(),
            markers,
            table: MarkerTable::default(),
        };
        model.rebuild_table(panels);
        model
    }

    pub fn mode(&self) -> WheelMode {
        self.mode
    }

    /// Entering monochromatic mode saturates every marker.
    pub fn set_mode(&mut self, mode: WheelMode) {
        self.mode = mode;
        if mode == WheelMode::Monochromatic {
            for marker in self.markers.values_mut() {
                marker.hsv = Hsv::new(marker.hsv.hue, 1.0, 1.0);
            }
        }
    }

    pub fn marker(&self, light_id: &str) -> Option<&Marker> {
        self.markers.get(light_id)
    }

    /// Markers in table order (wheel stacking order).
    pub fn markers_in_order(&self) -> impl Iterator<Item = &Marker> {
        self.table
            .slots
            .iter()
            .filter_map(|id| self.markers.get(id))
    }

    pub fn table(&self) -> &MarkerTable {
        &self.table
    }

    /// Returns false when the light has no marker.
    pub fn set_visible(&mut self, light_id: &str, visible: bool) -> bool {
        match self.markers.get_mut(light_id) {
            Some(marker) => {
                marker.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Moves a marker to a new hue. Returns false when the light has no
    /// marker.
    pub fn set_hue(&mut self, light_id: &str, degrees: f32) -> bool {
        let mode = self.mode;
        match self.markers.get_mut(light_id) {
            Some(marker) => {
                let (saturation, value) = match mode {
                    WheelMode::Monochromatic => (1.0, 1.0),
                    WheelMode::Custom => (marker.hsv.saturation, marker.hsv.value),
                };
                marker.hsv = Hsv::new(degrees, saturation, value);
                true
            }
            None => false,
        }
    }

    /// Rebuilds the marker table from the panels.
    ///
    /// Markers whose lights sit in the ON panel come first, in panel order;
    /// hidden markers follow in OFF-panel order. Only ids that actually have
    /// markers enter the table.
    pub fn rebuild_table(&mut self, panels: &SwitchPanels) {
        let slots: Vec<LightId> = panels
            .controls_order()
            .filter(|id| self.markers.contains_key(*id))
            .cloned()
            .collect();
        trace!(markers = slots.len(), "marker table rebuilt");
        self.table = MarkerTable { slots };
    }

    /// Writes every visible marker's color to its (switched-on) light.
    pub fn apply_to_lights(&self, records: &mut [LightRecord]) {
        for record in records.iter_mut() {
            if !record.is_on() {
                continue;
            }
            let Some(marker) = self.markers.get(record.id()) else {
                continue;
            };
            record.set_xy(hsv_to_xy(marker.hsv));
        }
    }

    /// Re-derives marker hues from the records' chromaticities, e.g. after
    /// a shuffle. Saturation and value are kept (or pinned in monochromatic
    /// mode).
    pub fn sync_from_records(&mut self, records: &[LightRecord]) {
        let mode = self.mode;
        for record in records {
            let Some(xy) = record.xy() else { continue };
            if let Some(marker) = self.markers.get_mut(record.id()) {
                let hue = xy_to_hsv(xy, 1.0).hue;
                let (saturation, value) = match mode {
                    WheelMode::Monochromatic => (1.0, 1.0),
                    WheelMode::Custom => (marker.hsv.saturation, marker.hsv.value),
                };
                marker.hsv = Hsv::new(hue, saturation, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huewheel_bridge::{Light, LightState};
    use huewheel_color::Xy;

    fn record(id: &str, on: bool, xy: Option<Xy>) -> LightRecord {
        LightRecord::from_cache(
            id,
            &Light {
                name: format!("Light {id}"),
                state: LightState {
                    on,
                    bri: 200,
                    xy,
                    ..LightState::default()
                },
                ..Light::default()
            },
        )
    }

    fn working_set() -> (Vec<LightRecord>, SwitchPanels) {
        let records = vec![
            record("1", true, Some(Xy::new(0.5, 0.35))),
            record("2", true, None),
            record("3", false, Some(Xy::new(0.3, 0.5))),
            record("4", true, Some(Xy::new(0.35, 0.3))),
        ];
        let panels = SwitchPanels::from_records(&records);
        (records, panels)
    }

    #[test]
    fn test_markers_exist_only_for_color_lights() {
        let (records, panels) = working_set();
        let wheel = WheelModel::build(&records, &panels);

        assert!(wheel.marker("1").is_some());
        assert!(wheel.marker("2").is_none());
        assert!(wheel.marker("3").is_some());
        assert_eq!(wheel.table().len(), 3);
    }

    #[test]
    fn test_markers_start_saturated_and_follow_power_state() {
        let (records, panels) = working_set();
        let wheel = WheelModel::build(&records, &panels);

        let marker = wheel.marker("1").unwrap();
        assert!(marker.visible);
        assert!((marker.hsv.saturation - 1.0).abs() < 1e-6);
        assert!((marker.hsv.value - 1.0).abs() < 1e-6);

        assert!(!wheel.marker("3").unwrap().visible);
    }

    #[test]
    fn test_table_orders_visible_before_hidden() {
        let (records, mut panels) = working_set();
        let mut wheel = WheelModel::build(&records, &panels);

        // ON panel: 1, 2, 4; OFF panel: 3. Color lights only → 1, 4, 3.
        assert_eq!(wheel.table().position_of("1"), Some(0));
        assert_eq!(wheel.table().position_of("4"), Some(1));
        assert_eq!(wheel.table().position_of("3"), Some(2));
        assert_eq!(wheel.table().position_of("2"), None);

        // And back from slot to light.
        assert_eq!(wheel.table().light_at(0), Some("1"));
        assert_eq!(wheel.table().light_at(2), Some("3"));
        assert_eq!(wheel.table().light_at(3), None);

        // Switch light 1 off: it prepends to OFF, so hidden-but-first there.
        panels.move_to_off("1");
        wheel.set_visible("1", false);
        wheel.rebuild_table(&panels);
        assert_eq!(wheel.table().position_of("4"), Some(0));
        assert_eq!(wheel.table().position_of("1"), Some(1));
        assert_eq!(wheel.table().position_of("3"), Some(2));
    }

    #[test]
    fn test_monochromatic_saturates_all_markers() {
        let (records, panels) = working_set();
        let mut wheel = WheelModel::build(&records, &panels);

        // Dull one marker first.
        if let Some(marker) = wheel.markers.get_mut("1") {
            marker.hsv = Hsv::new(200.0, 0.4, 0.6);
        }

        wheel.set_mode(WheelMode::Monochromatic);
        let marker = wheel.marker("1").unwrap();
        assert!((marker.hsv.saturation - 1.0).abs() < 1e-6);
        assert!((marker.hsv.value - 1.0).abs() < 1e-6);
        // Hue survives the pinning.
        assert!((marker.hsv.hue.into_positive_degrees() - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_apply_writes_only_to_lit_lights() {
        let (mut records, panels) = working_set();
        let mut wheel = WheelModel::build(&records, &panels);
        wheel.set_hue("1", 120.0);
        wheel.set_hue("3", 120.0);

        let off_xy_before = records[2].xy();
        wheel.apply_to_lights(&mut records);

        // "1" is on: its chromaticity moved and is flagged dirty.
        assert!(records[0].is_dirty());
        // "3" is off: untouched.
        assert_eq!(records[2].xy(), off_xy_before);
        assert!(!records[2].is_dirty());
        // "2" has no marker: untouched.
        assert!(!records[1].is_dirty());
    }
}
