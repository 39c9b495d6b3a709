//! Session layer for the Hue color wheel: settings, startup, and the
//! in-memory model the interface renders from.
//!
//! # Features
//!
//! - **Startup pipeline**: discover (or reuse) a bridge, pair when needed,
//!   cache the full state and build the working set, with one status banner
//!   per outcome and a single re-pair retry on stale credentials
//! - **Light records**: per-light state with per-field dirty tracking, so a
//!   flush sends exactly the fields that changed
//! - **Color wheel**: one marker per color-capable light, custom and
//!   monochromatic modes, visible markers ordered before hidden ones
//! - **Settings**: versioned JSON on disk with per-light visibility and a
//!   stored bridge address and username
//! - **Demo mode**: the same model fed from a bundled fixture instead of a
//!   bridge
//!
//! # Example
//!
//! ```rust,ignore
//! use huewheel_session::{Session, SettingsStore};
//!
//! let store = SettingsStore::open_default()?;
//! let mut session = Session::new(store);
//! if session.init().await.is_ok() {
//!     session.toggle_light("1", true).await?;
//! }
//! ```

pub mod error;
pub mod lights;
pub mod session;
pub mod settings;
pub mod status;
pub mod wheel;

pub use error::{AuthError, ConnectError, FullStateError, SessionError, StartupError};
pub use lights::{LightId, LightRecord, SwitchPanels};
pub use session::{Connector, DEVICE_TYPE, Session};
pub use settings::{LightSetting, Settings, SettingsError, SettingsStore};
pub use status::{CONNECTED, CONNECTING, RecoveryAction, StatusBanner};
pub use wheel::{Marker, MarkerTable, WheelMode, WheelModel};
