//! Error types for the session controller.
//!
//! Startup failures carry the exact message shown in the status banner,
//! tagged by pipeline stage, plus the recovery action the banner offers.

use huewheel_bridge::BridgeError;

use crate::settings::SettingsError;
use crate::status::RecoveryAction;

/// Failure while picking a bridge to talk to.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// The discovery portal could not be reached.
    #[error("Unable to connect to the Internet.")]
    Portal(#[source] BridgeError),

    /// The portal answered, but with zero bridges.
    #[error("No Philips Hue bridge found on your local network.")]
    NoBridges,
}

/// Failure while obtaining an API username.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Pairing needs the physical button on the bridge pressed first.
    #[error("Please authenticate by pressing the button on the Hue bridge.")]
    LinkButtonNotPressed,

    /// The bridge itself could not be reached.
    #[error("Unable to connect to local bridge. Try a refresh.")]
    Transport(#[source] BridgeError),

    /// Any other error the bridge reported.
    #[error("\"{description}\" (error type {code})")]
    Bridge { code: u16, description: String },
}

impl AuthError {
    pub(crate) fn from_bridge(e: BridgeError) -> Self {
        match e {
            BridgeError::LinkButtonNotPressed => AuthError::LinkButtonNotPressed,
            BridgeError::Api { code, description } => AuthError::Bridge { code, description },
            other => AuthError::Transport(other),
        }
    }
}

/// Failure while caching the bridge's full state.
#[derive(Debug, thiserror::Error)]
pub enum FullStateError {
    /// The username was rejected; terminal once re-pairing has been tried.
    #[error("Unauthorized user.")]
    Unauthorized,

    /// The bridge itself could not be reached.
    #[error("Unable to connect to local bridge. Try a refresh.")]
    Transport(#[source] BridgeError),

    /// Any other error the bridge reported.
    #[error("\"{description}\" (error type {code})")]
    Bridge { code: u16, description: String },
}

impl FullStateError {
    pub(crate) fn from_bridge(e: BridgeError) -> Self {
        match e {
            BridgeError::Unauthorized => FullStateError::Unauthorized,
            BridgeError::Api { code, description } => FullStateError::Bridge { code, description },
            other => FullStateError::Transport(other),
        }
    }
}

/// A startup failure, tagged with the stage that produced it.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    FullState(#[from] FullStateError),
}

impl StartupError {
    /// The message the status banner shows for this failure.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// The action the banner offers, if any.
    pub fn recovery(&self) -> Option<RecoveryAction> {
        match self {
            StartupError::Connect(ConnectError::NoBridges) => Some(RecoveryAction::DemoMode),
            StartupError::Auth(AuthError::LinkButtonNotPressed) => Some(RecoveryAction::Retry),
            _ => None,
        }
    }
}

/// Errors from interactive operations on a running session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No light with this id in the working set.
    #[error("Unknown light: {0}")]
    UnknownLight(String),

    /// Brightness is locked while a light is switched off.
    #[error("Light {0} is off; turn it on first")]
    LightOff(String),

    /// The light carries no color information and has no wheel marker.
    #[error("Light {0} has no color support")]
    NoColorSupport(String),

    /// Settings could not be persisted.
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}
