//! Typed parameter structs, one per distinct parameter shape.
//!
//! Calls arrive as a `ParameterMap` of coerced values that may still be the "wrong"
//! primitive (`"30"` survives as text when quoted twice, `22.5` for an integer field).
//! Numeric fields therefore deserialize leniently: integers pass, floats truncate toward
//! zero, numeric strings parse. Enum-valued fields stay as `String` and are checked
//! against their vocabulary by the handler so a bad value becomes an `InvalidValue`.
//!
//! Absent parameters fall back to the defaults below; only `app_name` and `playlist`
//! are required.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::state::{AcMode, CleaningZone, FanSpeed};

/// Lenient primitive casts for `deserialize_with`.
pub mod lenient {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value as Json;

    /// Integer from an int, a float (truncated), a numeric string or a bool.
    pub fn int<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        let value = Json::deserialize(d)?;
        to_int(&value).ok_or_else(|| D::Error::custom(format!("expected an integer, got {value}")))
    }

    /// Like [`int`], but `null` is `None`.
    pub fn opt_int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        let value = Json::deserialize(d)?;
        if value.is_null() {
            return Ok(None);
        }
        to_int(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected an integer, got {value}")))
    }

    /// Text from a string, or the rendering of a number or bool.
    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        match Json::deserialize(d)? {
            Json::String(s) => Ok(s),
            Json::Number(n) => Ok(n.to_string()),
            Json::Bool(b) => Ok(b.to_string()),
            other => Err(D::Error::custom(format!("expected text, got {other}"))),
        }
    }

    #[allow(clippy::cast_possible_truncation)] // truncation toward zero is the intended cast
    fn to_int(value: &Json) -> Option<i64> {
        match value {
            Json::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
            Json::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            }
            Json::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }
}

fn default_temperature() -> i64 {
    24
}

fn default_speed() -> String {
    FanSpeed::Auto.label().to_string()
}

fn default_mode() -> String {
    AcMode::Cooling.label().to_string()
}

fn default_channel() -> i64 {
    1
}

fn default_volume() -> i64 {
    30
}

fn default_brightness() -> i64 {
    100
}

fn default_color_temp() -> i64 {
    4000
}

fn default_zone() -> String {
    CleaningZone::LivingRoom.label().to_string()
}

fn default_position() -> i64 {
    100
}

// ── Climate ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TemperatureParams {
    /// Target temperature in °C (16-30).
    #[serde(default = "default_temperature", deserialize_with = "lenient::int")]
    #[schemars(with = "i64")]
    pub temperature: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DeltaParams {
    /// Amount to add to the current value. Negative lowers it.
    #[serde(default, deserialize_with = "lenient::int")]
    #[schemars(with = "i64")]
    pub delta: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FanSpeedParams {
    #[serde(default = "default_speed", deserialize_with = "lenient::text")]
    #[schemars(with = "FanSpeed")]
    pub speed: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ModeParams {
    #[serde(default = "default_mode", deserialize_with = "lenient::text")]
    #[schemars(with = "AcMode")]
    pub mode: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct EnvironmentParams {
    /// Sensed indoor temperature in °C (-20-50).
    #[serde(default, deserialize_with = "lenient::opt_int")]
    #[schemars(with = "Option<i64>")]
    pub indoor_temperature: Option<i64>,
    /// Sensed outdoor temperature in °C (-20-50).
    #[serde(default, deserialize_with = "lenient::opt_int")]
    #[schemars(with = "Option<i64>")]
    pub outdoor_temperature: Option<i64>,
}

// ── TV / audio ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ChannelParams {
    /// Channel number (1-100).
    #[serde(default = "default_channel", deserialize_with = "lenient::int")]
    #[schemars(with = "i64")]
    pub channel: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VolumeParams {
    /// Volume level (0-100).
    #[serde(default = "default_volume", deserialize_with = "lenient::int")]
    #[schemars(with = "i64")]
    pub volume: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LaunchAppParams {
    /// Application to open, e.g. Netflix or YouTube.
    #[serde(deserialize_with = "lenient::text")]
    pub app_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlaylistParams {
    #[serde(deserialize_with = "lenient::text")]
    pub playlist: String,
}

// ── Light ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BrightnessParams {
    /// Brightness in percent (0-100).
    #[serde(default = "default_brightness", deserialize_with = "lenient::int")]
    #[schemars(with = "i64")]
    pub brightness: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ColorTempParams {
    /// Color temperature in Kelvin (2700 warm - 6500 cool).
    #[serde(default = "default_color_temp", deserialize_with = "lenient::int")]
    #[schemars(with = "i64")]
    pub temp: i64,
}

// ── Vacuum / curtain ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ZoneParams {
    #[serde(default = "default_zone", deserialize_with = "lenient::text")]
    #[schemars(with = "CleaningZone")]
    pub zone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PositionParams {
    /// Opening in percent, 0 = closed, 100 = fully open.
    #[serde(default = "default_position", deserialize_with = "lenient::int")]
    #[schemars(with = "i64")]
    pub position: i64,
}
