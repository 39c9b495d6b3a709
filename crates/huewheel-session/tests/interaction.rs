//! Integration tests for the interactive operations.
//!
//! Tests cover:
//! - Flush bodies contain only the fields that changed
//! - A rejected write is dropped while the rest of the flush goes out
//! - Brightness guard while a light is off
//! - Toggle: panel rows, marker visibility, marker-table order
//! - Wheel: marker hue flows to the light, mode switch, marker errors
//! - Randomize: a permutation of the lit lights' chromaticities
//! - Demo sessions keep every change local

use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use huewheel_bridge::{
    BridgeApi, BridgeError, FixedDiscovery, FullState, InMemoryBridge, Light, LightState,
    StateUpdate,
};
use huewheel_color::{Xy, hsv_to_xy};
use huewheel_session::{Connector, Session, SessionError, SettingsStore, WheelMode};

/// Helper: a color-capable light.
fn color_light(name: &str, on: bool, bri: u8, x: f64, y: f64) -> Light {
    Light {
        name: name.to_string(),
        light_type: "Extended color light".to_string(),
        state: LightState {
            on,
            bri,
            xy: Some(Xy::new(x, y)),
            colormode: Some("xy".to_string()),
            ..LightState::default()
        },
        ..Light::default()
    }
}

/// Helper: a dimmable light without color support.
fn plain_light(name: &str, on: bool, bri: u8) -> Light {
    Light {
        name: name.to_string(),
        light_type: "Dimmable light".to_string(),
        state: LightState {
            on,
            bri,
            ..LightState::default()
        },
        ..Light::default()
    }
}

/// Helper: the three-light full state most scenarios start from.
fn fixture() -> FullState {
    let mut state = FullState::default();
    state
        .lights
        .insert("1".to_string(), color_light("Desk", true, 200, 0.5, 0.4));
    state
        .lights
        .insert("2".to_string(), color_light("Couch", false, 150, 0.3, 0.3));
    state
        .lights
        .insert("3".to_string(), plain_light("Hallway", true, 254));
    state
}

/// Helper: a connected session over any bridge implementation.
async fn connected_to(dir: &TempDir, api: Arc<dyn BridgeApi>) -> Session {
    {
        let mut store = SettingsStore::open(dir.path().join("settings.json")).unwrap();
        store
            .update(|s| s.username = Some("test-user".to_string()))
            .unwrap();
    }
    let store = SettingsStore::open(dir.path().join("settings.json")).unwrap();
    let connector: Connector = Box::new(move |_ip| api.clone());
    let mut session = Session::with_bridge(
        store,
        Arc::new(FixedDiscovery::single("192.168.1.50")),
        connector,
    );
    session.init().await.unwrap();
    session
}

/// Helper: a connected session over `state`, plus the bridge handle.
async fn connected(dir: &TempDir, state: FullState) -> (Session, Arc<InMemoryBridge>) {
    let bridge = Arc::new(InMemoryBridge::new(state).with_user("test-user"));
    let session = connected_to(dir, bridge.clone() as Arc<dyn BridgeApi>).await;
    (session, bridge)
}

/// Helper: a bridge that relays to an in-memory one, except one light whose
/// writes always fail.
struct FlakyLightBridge {
    inner: InMemoryBridge,
    flaky: &'static str,
}

#[async_trait]
impl BridgeApi for FlakyLightBridge {
    async fn create_user(&self, device_type: &str) -> huewheel_bridge::Result<String> {
        self.inner.create_user(device_type).await
    }

    async fn full_state(&self, username: &str) -> huewheel_bridge::Result<FullState> {
        self.inner.full_state(username).await
    }

    async fn set_light_state(
        &self,
        username: &str,
        light_id: &str,
        update: &StateUpdate,
    ) -> huewheel_bridge::Result<()> {
        if light_id == self.flaky {
            return Err(BridgeError::Api {
                code: 901,
                description: "internal error, not updating light".to_string(),
            });
        }
        self.inner.set_light_state(username, light_id, update).await
    }
}

// ============================================================
// Scenario 1: Flush behavior
// ============================================================

#[tokio::test]
async fn test_flush_sends_only_the_changed_field() {
    let dir = TempDir::new().unwrap();
    let (mut session, bridge) = connected(&dir, fixture()).await;

    session.set_brightness("1", 180).await.unwrap();

    let writes = bridge.writes().await;
    assert_eq!(writes.len(), 1);
    let (id, update) = &writes[0];
    assert_eq!(id, "1");
    assert_eq!(update.bri, Some(180));
    assert_eq!(update.on, None);
    assert_eq!(update.xy, None);
}

#[tokio::test]
async fn test_unchanged_value_sends_nothing() {
    let dir = TempDir::new().unwrap();
    let (mut session, bridge) = connected(&dir, fixture()).await;

    // Brightness is already 200, so nothing gets dirty.
    session.set_brightness("1", 200).await.unwrap();

    assert!(bridge.writes().await.is_empty());
}

#[tokio::test]
async fn test_failed_write_is_dropped_and_the_rest_go_out() {
    let dir = TempDir::new().unwrap();
    let bridge = Arc::new(FlakyLightBridge {
        inner: InMemoryBridge::new(fixture()).with_user("test-user"),
        flaky: "1",
    });
    let mut session = connected_to(&dir, bridge.clone() as Arc<dyn BridgeApi>).await;

    // Toggling "2" on also snaps lit "1" to its marker color, so one flush
    // carries a write for each light. The flaky one rejects its own.
    session.toggle_light("2", true).await.unwrap();

    // The model moved anyway; the write was attempted and then dropped.
    assert_ne!(session.record("1").unwrap().xy(), Some(Xy::new(0.5, 0.4)));
    let writes = bridge.inner.writes().await;
    assert!(writes.iter().all(|(id, _)| id != "1"));
    assert!(writes.iter().any(|(id, u)| id == "2" && u.on == Some(true)));

    // Later flushes do not retry it either.
    session.set_brightness("2", 77).await.unwrap();
    let writes = bridge.inner.writes().await;
    assert!(writes.iter().all(|(id, _)| id != "1"));
    assert!(writes.iter().any(|(id, u)| id == "2" && u.bri == Some(77)));
}

#[tokio::test]
async fn test_brightness_rejected_while_off() {
    let dir = TempDir::new().unwrap();
    let (mut session, bridge) = connected(&dir, fixture()).await;

    let err = session.set_brightness("2", 100).await.unwrap_err();
    assert!(matches!(err, SessionError::LightOff(_)));
    assert!(bridge.writes().await.is_empty());
}

// ============================================================
// Scenario 2: Toggling
// ============================================================

#[tokio::test]
async fn test_toggle_moves_rows_and_markers() {
    let dir = TempDir::new().unwrap();
    let (mut session, _bridge) = connected(&dir, fixture()).await;

    assert_eq!(session.panels().on_panel(), &["1", "3"]);
    assert_eq!(session.panels().off_panel(), &["2"]);
    assert_eq!(session.wheel().table().position_of("1"), Some(0));
    assert_eq!(session.wheel().table().position_of("2"), Some(1));

    session.toggle_light("2", true).await.unwrap();
    assert_eq!(session.panels().on_panel(), &["1", "3", "2"]);
    assert!(session.panels().off_panel().is_empty());
    assert!(session.wheel().marker("2").unwrap().visible);

    session.toggle_light("1", false).await.unwrap();
    // Switched-off rows go to the front of the OFF panel.
    assert_eq!(session.panels().on_panel(), &["3", "2"]);
    assert_eq!(session.panels().off_panel(), &["1"]);
    // Hidden markers sort after visible ones.
    assert_eq!(session.wheel().table().position_of("2"), Some(0));
    assert_eq!(session.wheel().table().position_of("1"), Some(1));
}

#[tokio::test]
async fn test_toggle_snaps_lit_lights_to_marker_colors() {
    let dir = TempDir::new().unwrap();
    let (mut session, bridge) = connected(&dir, fixture()).await;
    let expected = hsv_to_xy(session.wheel().marker("1").unwrap().hsv);

    session.toggle_light("2", true).await.unwrap();

    assert_eq!(session.record("1").unwrap().xy(), Some(expected));
    let writes = bridge.writes().await;
    let switched = writes.iter().find(|(id, _)| id == "2").unwrap();
    assert_eq!(switched.1.on, Some(true));
    assert!(switched.1.xy.is_some());
    // The colorless light never receives a color write.
    assert!(writes.iter().all(|(id, _)| id != "3"));
}

// ============================================================
// Scenario 3: Wheel interaction
// ============================================================

#[tokio::test]
async fn test_marker_hue_flows_to_the_light() {
    let dir = TempDir::new().unwrap();
    let (mut session, bridge) = connected(&dir, fixture()).await;

    session.set_marker_hue("1", 120.0).await.unwrap();

    let marker = session.wheel().marker("1").unwrap();
    assert!((marker.hsv.hue.into_positive_degrees() - 120.0).abs() < 0.5);
    let expected = hsv_to_xy(marker.hsv);
    assert_eq!(session.record("1").unwrap().xy(), Some(expected));
    // Hue 120 is green; the chromaticity should sit on the green side.
    let xy = session.record("1").unwrap().xy().unwrap();
    assert!(xy.y > xy.x);
    assert!(bridge
        .writes()
        .await
        .iter()
        .any(|(id, u)| id == "1" && u.xy.is_some()));
}

#[tokio::test]
async fn test_marker_errors() {
    let dir = TempDir::new().unwrap();
    let (mut session, _bridge) = connected(&dir, fixture()).await;

    assert!(matches!(
        session.set_marker_hue("99", 10.0).await,
        Err(SessionError::UnknownLight(_))
    ));
    assert!(matches!(
        session.set_marker_hue("3", 10.0).await,
        Err(SessionError::NoColorSupport(_))
    ));
}

#[tokio::test]
async fn test_monochromatic_saturates_every_marker() {
    let dir = TempDir::new().unwrap();
    let (mut session, bridge) = connected(&dir, fixture()).await;

    session.set_mode(WheelMode::Monochromatic).await;

    assert_eq!(session.wheel().mode(), WheelMode::Monochromatic);
    for marker in session.wheel().markers_in_order() {
        assert!((marker.hsv.saturation - 1.0).abs() < f32::EPSILON);
        assert!((marker.hsv.value - 1.0).abs() < f32::EPSILON);
    }
    // The lit color light snapped to its marker's saturated color.
    let expected = hsv_to_xy(session.wheel().marker("1").unwrap().hsv);
    assert_eq!(session.record("1").unwrap().xy(), Some(expected));
    assert!(bridge
        .writes()
        .await
        .iter()
        .any(|(id, u)| id == "1" && u.xy.is_some()));
}

// ============================================================
// Scenario 4: Randomize
// ============================================================

#[tokio::test]
async fn test_randomize_is_a_permutation_of_lit_colors() {
    let dir = TempDir::new().unwrap();
    let mut state = FullState::default();
    state
        .lights
        .insert("1".to_string(), color_light("A", true, 100, 0.6, 0.35));
    state
        .lights
        .insert("2".to_string(), color_light("B", true, 100, 0.3, 0.5));
    state
        .lights
        .insert("3".to_string(), color_light("C", true, 100, 0.25, 0.15));
    let (mut session, _bridge) = connected(&dir, state).await;

    let mut before: Vec<Xy> = session.records().iter().filter_map(|r| r.xy()).collect();
    session.randomize_colors().await;
    let mut after: Vec<Xy> = session.records().iter().filter_map(|r| r.xy()).collect();

    let key = |xy: &Xy| (xy.x.to_bits(), xy.y.to_bits());
    before.sort_by_key(key);
    after.sort_by_key(key);
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_randomize_leaves_off_lights_alone() {
    let dir = TempDir::new().unwrap();
    let (mut session, bridge) = connected(&dir, fixture()).await;

    session.randomize_colors().await;

    // Only one light is lit and colored, so the shuffle changes nothing.
    assert_eq!(session.record("2").unwrap().xy(), Some(Xy::new(0.3, 0.3)));
    assert!(bridge.writes().await.is_empty());
}

// ============================================================
// Scenario 5: Demo mode
// ============================================================

#[tokio::test]
async fn test_demo_session_stays_local() {
    let dir = TempDir::new().unwrap();
    let store = SettingsStore::open(dir.path().join("settings.json")).unwrap();
    let mut session = Session::new(store);

    session.start_demo(fixture());

    assert!(session.is_demo());
    assert!(session.banner().is_none());
    assert_eq!(session.records().len(), 3);

    session.toggle_light("2", true).await.unwrap();
    assert!(session.record("2").unwrap().is_on());
    assert_eq!(session.flush().await, 0);
}
