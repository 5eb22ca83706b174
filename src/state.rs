//! Device state records and the aggregate trees a controller owns.
//!
//! Every numeric field has a [`Bounds`] and every enum field a closed vocabulary. Fields
//! are only changed through the handlers in `registry::handlers`, which clamp or reject
//! before storing, so a state value read from here is always in range.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
#[cfg(feature = "server")]
use ts_rs::TS;

// ── Bounds ─────────────────────────────────────────────────────────

/// Closed numeric range `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bounds {
    pub min: i64,
    pub max: i64,
}

impl Bounds {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn clamp(self, value: i64) -> i64 {
        value.clamp(self.min, self.max)
    }
}

pub mod bounds {
    use super::Bounds;

    pub const AC_TEMPERATURE: Bounds = Bounds::new(16, 30);
    pub const ENVIRONMENT_TEMPERATURE: Bounds = Bounds::new(-20, 50);
    pub const VOLUME: Bounds = Bounds::new(0, 100);
    pub const TV_CHANNEL: Bounds = Bounds::new(1, 100);
    pub const BRIGHTNESS: Bounds = Bounds::new(0, 100);
    pub const COLOR_TEMP: Bounds = Bounds::new(2700, 6500);
    pub const CURTAIN_POSITION: Bounds = Bounds::new(0, 100);
}

// ── Vocabularies ───────────────────────────────────────────────────

/// Unit enum with a fixed wire label per variant. Generates `ALL`, `label()` and
/// `Display`; serde uses the same labels.
macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $( $variant:ident => $label:literal ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
        #[cfg_attr(feature = "server", derive(TS))]
        #[cfg_attr(feature = "server", ts(export))]
        pub enum $name {
            $( #[serde(rename = $label)] $variant, )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            pub fn label(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

choice_enum! {
    /// Fan speed, shared by the air conditioner and the ventilation fan.
    FanSpeed { Low => "low", Medium => "medium", High => "high", Auto => "auto" }
}

choice_enum! {
    AcMode { Cooling => "cooling", Heating => "heating", Auto => "auto", Ventilation => "ventilation" }
}

choice_enum! {
    VacuumStatus { Idle => "idle", Cleaning => "cleaning", Paused => "paused", Returning => "returning" }
}

choice_enum! {
    CleaningZone { LivingRoom => "living_room", Bedroom => "bedroom", Kitchen => "kitchen", Bathroom => "bathroom" }
}

choice_enum! {
    PlaybackStatus { Playing => "playing", Paused => "paused", Stopped => "stopped" }
}

choice_enum! {
    /// Curtain motor status. Position changes are applied instantly, so only `Stopped`
    /// is ever stored today; the other labels are part of the published vocabulary.
    CurtainStatus { Opening => "opening", Closing => "closing", Stopped => "stopped" }
}

// ── Device records ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]

#[cfg_attr(feature = "server", derive(TS))]
#[cfg_attr(feature = "server", ts(export))]
pub struct AcState {
    pub power: bool,
    /// Target temperature in °C.
    #[cfg_attr(feature = "server", ts(type = "number"))]
    pub temperature: i64,
    pub mode: AcMode,
    pub fan_speed: FanSpeed,
}

impl Default for AcState {
    fn default() -> Self {
        Self {
            power: false,
            temperature: 24,
            mode: AcMode::Cooling,
            fan_speed: FanSpeed::Auto,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]

#[cfg_attr(feature = "server", derive(TS))]
#[cfg_attr(feature = "server", ts(export))]
pub struct TvState {
    pub power: bool,
    #[cfg_attr(feature = "server", ts(type = "number"))]
    pub channel: i64,
    #[cfg_attr(feature = "server", ts(type = "number"))]
    pub volume: i64,
    pub current_app: Option<String>,
}

impl Default for TvState {
    fn default() -> Self {
        Self {
            power: false,
            channel: 1,
            volume: 30,
            current_app: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]

#[cfg_attr(feature = "server", derive(TS))]
#[cfg_attr(feature = "server", ts(export))]
pub struct LightState {
    pub power: bool,
    /// Percent.
    #[cfg_attr(feature = "server", ts(type = "number"))]
    pub brightness: i64,
    /// Kelvin, warm (2700) to cool (6500).
    #[cfg_attr(feature = "server", ts(type = "number"))]
    pub color_temp: i64,
}

impl Default for LightState {
    fn default() -> Self {
        Self {
            power: false,
            brightness: 100,
            color_temp: 4000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]

#[cfg_attr(feature = "server", derive(TS))]
#[cfg_attr(feature = "server", ts(export))]
pub struct VacuumState {
    pub power: bool,
    pub status: VacuumStatus,
    pub current_zone: Option<CleaningZone>,
}

impl Default for VacuumState {
    fn default() -> Self {
        Self {
            power: false,
            status: VacuumStatus::Idle,
            current_zone: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]

#[cfg_attr(feature = "server", derive(TS))]
#[cfg_attr(feature = "server", ts(export))]
pub struct AudioState {
    pub power: bool,
    #[cfg_attr(feature = "server", ts(type = "number"))]
    pub volume: i64,
    pub playback: PlaybackStatus,
    pub current_playlist: Option<String>,
}

impl Default for AudioState {
    fn default() -> Self {
        Self {
            power: false,
            volume: 30,
            playback: PlaybackStatus::Stopped,
            current_playlist: None,
        }
    }
}

/// Curtains have no power switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(TS))]
#[cfg_attr(feature = "server", ts(export))]
pub struct CurtainState {
    /// 0 = closed, 100 = fully open.
    #[cfg_attr(feature = "server", ts(type = "number"))]
    pub position: i64,
    pub status: CurtainStatus,
}

impl Default for CurtainState {
    fn default() -> Self {
        Self {
            position: 100,
            status: CurtainStatus::Stopped,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]

#[cfg_attr(feature = "server", derive(TS))]
#[cfg_attr(feature = "server", ts(export))]
pub struct VentilationState {
    pub power: bool,
    pub speed: FanSpeed,
}

impl Default for VentilationState {
    fn default() -> Self {
        Self {
            power: false,
            speed: FanSpeed::Auto,
        }
    }
}

// ── Aggregate trees ────────────────────────────────────────────────

/// Seven-device home.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(TS))]
#[cfg_attr(feature = "server", ts(export))]
pub struct HomeState {
    pub ac: AcState,
    pub tv: TvState,
    pub light: LightState,
    pub vacuum: VacuumState,
    pub audio: AudioState,
    pub curtain: CurtainState,
    pub ventilation: VentilationState,
}

/// Single air conditioner plus the sensed room and outside temperatures.
/// Serializes flat: `{power, temperature, mode, fan_speed, indoor_temperature, outdoor_temperature}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(TS))]
#[cfg_attr(feature = "server", ts(export))]
pub struct ClimateState {
    #[serde(flatten)]
    pub ac: AcState,
    #[cfg_attr(feature = "server", ts(type = "number"))]
    pub indoor_temperature: i64,
    #[cfg_attr(feature = "server", ts(type = "number"))]
    pub outdoor_temperature: i64,
}

impl Default for ClimateState {
    fn default() -> Self {
        Self {
            ac: AcState::default(),
            indoor_temperature: 26,
            outdoor_temperature: 32,
        }
    }
}

/// State trees that contain an air conditioner. Lets the AC handlers serve both device sets.
pub trait HasAc {
    fn ac(&self) -> &AcState;
    fn ac_mut(&mut self) -> &mut AcState;
}

impl HasAc for HomeState {
    fn ac(&self) -> &AcState {
        &self.ac
    }

    fn ac_mut(&mut self) -> &mut AcState {
        &mut self.ac
    }
}

impl HasAc for ClimateState {
    fn ac(&self) -> &AcState {
        &self.ac
    }

    fn ac_mut(&mut self) -> &mut AcState {
        &mut self.ac
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn home_defaults_match_documented_values() {
        let home = HomeState::default();
        assert!(!home.ac.power);
        assert_eq!(home.ac.temperature, 24);
        assert_eq!(home.ac.mode, AcMode::Cooling);
        assert_eq!(home.ac.fan_speed, FanSpeed::Auto);
        assert_eq!(home.tv.channel, 1);
        assert_eq!(home.tv.volume, 30);
        assert_eq!(home.light.color_temp, 4000);
        assert_eq!(home.vacuum.status, VacuumStatus::Idle);
        assert_eq!(home.audio.playback, PlaybackStatus::Stopped);
        assert_eq!(home.curtain.position, 100);
        assert_eq!(home.ventilation.speed, FanSpeed::Auto);
    }

    #[test]
    fn snapshot_renders_enum_labels() {
        let mut home = HomeState::default();
        home.vacuum.current_zone = Some(CleaningZone::LivingRoom);
        let json = serde_json::to_value(&home).unwrap();
        assert_eq!(json["ac"]["mode"], "cooling");
        assert_eq!(json["vacuum"]["current_zone"], "living_room");
        assert_eq!(json["tv"]["current_app"], serde_json::Value::Null);
    }

    #[test]
    fn climate_state_serializes_flat() {
        let json = serde_json::to_value(ClimateState::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "power": false,
                "temperature": 24,
                "mode": "cooling",
                "fan_speed": "auto",
                "indoor_temperature": 26,
                "outdoor_temperature": 32,
            })
        );
    }

    #[test]
    fn bounds_clamp_both_ends() {
        assert_eq!(bounds::AC_TEMPERATURE.clamp(35), 30);
        assert_eq!(bounds::AC_TEMPERATURE.clamp(-5), 16);
        assert_eq!(bounds::COLOR_TEMP.clamp(5000), 5000);
        assert_eq!(bounds::TV_CHANNEL.clamp(0), 1);
    }
}
