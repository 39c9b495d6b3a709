//! Status banner model.
//!
//! One banner is visible at a time. Progress banners stay up until replaced;
//! the success banner dismisses itself after a few seconds; failure banners
//! stay up and may carry a recovery action.

use std::time::Duration;

use crate::error::StartupError;

/// Shown while the startup pipeline runs.
pub const CONNECTING: &str = "Connecting...";
/// Shown when the full state has been cached.
pub const CONNECTED: &str = "Successfully connected to local bridge!";

const SUCCESS_DISMISS: Duration = Duration::from_secs(3);

/// Action a failure banner offers the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Try the startup pipeline again (after pressing the link button).
    Retry,
    /// Run against the bundled fixture instead of a bridge.
    DemoMode,
}

/// The banner currently shown above the controls.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusBanner {
    text: String,
    dismiss_after: Option<Duration>,
    action: Option<RecoveryAction>,
}

impl StatusBanner {
    pub fn connecting() -> Self {
        Self {
            text: CONNECTING.to_string(),
            dismiss_after: None,
            action: None,
        }
    }

    pub fn connected() -> Self {
        Self {
            text: CONNECTED.to_string(),
            dismiss_after: Some(SUCCESS_DISMISS),
            action: None,
        }
    }

    pub fn failure(error: &StartupError) -> Self {
        Self {
            text: error.user_message(),
            dismiss_after: None,
            action: error.recovery(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// `None` means the banner stays until replaced.
    pub fn dismiss_after(&self) -> Option<Duration> {
        self.dismiss_after
    }

    pub fn action(&self) -> Option<RecoveryAction> {
        self.action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConnectError;

    #[test]
    fn test_progress_and_success_banners() {
        let connecting = StatusBanner::connecting();
        assert_eq!(connecting.text(), "Connecting...");
        assert_eq!(connecting.dismiss_after(), None);

        let connected = StatusBanner::connected();
        assert_eq!(connected.text(), "Successfully connected to local bridge!");
        assert_eq!(connected.dismiss_after(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_failure_banner_carries_the_action() {
        let banner = StatusBanner::failure(&StartupError::from(ConnectError::NoBridges));
        assert_eq!(
            banner.text(),
            "No Philips Hue bridge found on your local network."
        );
        assert_eq!(banner.action(), Some(RecoveryAction::DemoMode));
        assert_eq!(banner.dismiss_after(), None);
    }
}
