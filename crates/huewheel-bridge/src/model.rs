//! Wire types for the Hue bridge REST API.
//!
//! Field names follow the JSON the bridge actually sends, so most structs
//! deserialize without renames. Optional attributes default so that older
//! firmware and trimmed demo fixtures still parse.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use huewheel_color::Xy;

use crate::error::{BridgeError, Result};

/// A bridge as reported by the meethue discovery portal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredBridge {
    pub id: String,
    pub internalipaddress: String,
}

/// Everything the bridge knows, as returned by `GET /api/<username>/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FullState {
    #[serde(default)]
    pub lights: HashMap<String, Light>,
    #[serde(default)]
    pub groups: HashMap<String, Group>,
    #[serde(default)]
    pub config: BridgeConfig,
}

/// Attributes of a light
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Light {
    pub name: String,
    pub state: LightState,
    #[serde(rename = "type", default)]
    pub light_type: String,
    #[serde(default)]
    pub modelid: String,
    #[serde(default)]
    pub uniqueid: String,
    #[serde(default)]
    pub manufacturername: String,
    #[serde(default)]
    pub swversion: String,
}

/// Current state of a light
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightState {
    pub on: bool,
    /// Brightness, 1-254
    #[serde(default)]
    pub bri: u8,
    /// CIE chromaticity; absent on lights without color support
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xy: Option<Xy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hue: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sat: Option<u8>,
    /// Color temperature in mireds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ct: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colormode: Option<String>,
    #[serde(default = "default_reachable")]
    pub reachable: bool,
}

fn default_reachable() -> bool {
    true
}

impl Default for LightState {
    fn default() -> Self {
        Self {
            on: false,
            bri: 0,
            xy: None,
            hue: None,
            sat: None,
            ct: None,
            colormode: None,
            reachable: true,
        }
    }
}

/// A light group
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub lights: Vec<String>,
    #[serde(rename = "type", default)]
    pub group_type: String,
}

/// Bridge configuration block of the full state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub swversion: String,
    #[serde(default)]
    pub bridgeid: String,
}

/// Partial state written with `PUT /lights/<id>/state`.
///
/// Only the fields that changed are sent; `None` fields are omitted from the
/// JSON body entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StateUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bri: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xy: Option<Xy>,
}

impl StateUpdate {
    /// True when no field is set and the PUT can be skipped.
    pub fn is_empty(&self) -> bool {
        self.on.is_none() && self.bri.is_none() && self.xy.is_none()
    }
}

/// One error object from the bridge's reply array.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    #[serde(rename = "type")]
    pub code: u16,
    #[serde(default)]
    pub address: String,
    pub description: String,
}

impl ApiError {
    /// The stored username is not registered on the bridge.
    pub const UNAUTHORIZED_USER: u16 = 1;
    /// `POST /api` before the physical link button was pressed.
    pub const LINK_BUTTON_NOT_PRESSED: u16 = 101;
}

/// One entry of a `POST /api` reply array.
#[derive(Debug, Deserialize)]
pub struct CreateUserReply {
    #[serde(default)]
    pub success: Option<CreatedUser>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct CreatedUser {
    pub username: String,
}

/// One entry of a state-write reply array; the success payload is ignored.
#[derive(Debug, Deserialize)]
pub struct WriteReply {
    #[serde(default)]
    pub error: Option<ApiError>,
}

/// Parses a `GET /api/<username>/` body.
///
/// The bridge returns the full-state object on success but an *array* of
/// error objects when the username is rejected, so the shape has to be
/// inspected before deserializing.
pub fn parse_full_state(value: serde_json::Value) -> Result<FullState> {
    if value.is_array() {
        let replies: Vec<WriteReply> = serde_json::from_value(value)?;
        return match replies.into_iter().find_map(|r| r.error) {
            Some(error) => Err(error.into()),
            None => Err(BridgeError::UnexpectedReply(
                "error array without an error object".to_string(),
            )),
        };
    }
    Ok(serde_json::from_value(value)?)
}
