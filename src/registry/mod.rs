pub mod catalog;
pub mod handlers;
pub mod params;

use serde::{Deserialize, Serialize};

use crate::controller::Controller;
use crate::error::AppError;
use crate::parse::FunctionCall;
use crate::state::{ClimateState, HomeState};

pub use catalog::{Catalog, CatalogEntry};

// ── Param types (used in command enums) ─────────────────────────
use params::{
    BrightnessParams, ChannelParams, ColorTempParams, DeltaParams, EnvironmentParams,
    FanSpeedParams, LaunchAppParams, ModeParams, PlaylistParams, PositionParams,
    TemperatureParams, VolumeParams, ZoneParams,
};

// ── Handler modules (dispatch targets) ──────────────────────────
use handlers::{ac, audio, climate, curtain, light, tv, vacuum, ventilation};

// ── Command metadata ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Ac,
    Tv,
    Light,
    Vacuum,
    Audio,
    Curtain,
    Ventilation,
    Sensor,
}

impl DeviceKind {
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Ac => "ac",
            Self::Tv => "tv",
            Self::Light => "light",
            Self::Vacuum => "vacuum",
            Self::Audio => "audio",
            Self::Curtain => "curtain",
            Self::Ventilation => "ventilation",
            Self::Sensor => "sensor",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Ac => "Air conditioner: power, temperature, mode, fan speed",
            Self::Tv => "Television: power, channel, volume, apps",
            Self::Light => "Living-room light: power, brightness, color temperature",
            Self::Vacuum => "Robot vacuum: start, pause, stop, zones, docking",
            Self::Audio => "Audio system: power, volume, playback, playlists",
            Self::Curtain => "Motorized curtain: open, close, position",
            Self::Ventilation => "Ventilation fan: power, speed",
            Self::Sensor => "Indoor and outdoor temperature readings",
        }
    }

    pub fn all() -> &'static [DeviceKind] {
        &[
            Self::Ac,
            Self::Tv,
            Self::Light,
            Self::Vacuum,
            Self::Audio,
            Self::Curtain,
            Self::Ventilation,
            Self::Sensor,
        ]
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CommandInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub device: DeviceKind,
    /// Reads state only; never notifies.
    pub query: bool,
    /// Subject to the validator's temperature clamp.
    pub temperature: bool,
    /// Dispatchable, but left out of the model-facing catalog.
    pub llm_hidden: bool,
}

// ── Command output ──────────────────────────────────────────────

/// Internal result of executing a command.
/// `message` serves the model/CLI, `data` carries operation-specific fields
/// (`previous_volume`, `current_volume`, `mode`, ...).
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommandOutput {
    pub message: String,
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl CommandOutput {
    pub fn unit(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: serde_json::Map::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
        self.data.insert(key.into(), value);
        self
    }
}

// ── Command sets ────────────────────────────────────────────────

/// A device set: a command enum generated by `define_commands!` plus the state tree its
/// handlers operate on.
pub trait CommandSet: Sized + std::fmt::Debug {
    type State: Default + Serialize + Send + 'static;

    /// Decode a call. Unknown names and undecodable parameters are errors.
    fn from_call(call: &FunctionCall) -> Result<Self, AppError>;

    fn apply(self, controller: &mut Controller<Self::State>) -> Result<CommandOutput, AppError>;

    fn info(&self) -> CommandInfo;

    fn catalog_entries() -> Vec<CatalogEntry>;
}

// ── define_commands! macro ──────────────────────────────────────

/// Single source of truth for one device set. Generates:
/// 1. the command enum (serde-tagged)
/// 2. `info()`: metadata (name, description, device, flags)
/// 3. `catalog_entries()`: catalog entries with JSON schemas
/// 4. `from_call()`: decode a `FunctionCall` into a variant
/// 5. `apply()`: run the handler against the controller
///
/// Everything is wired into `CommandSet`, so the catalog and the dispatch table cannot
/// drift apart.
macro_rules! define_commands {
    (
        $enum_name:ident for $state:ty;
        params {
            $(
                [ $pc:expr $(, $pf:ident)* ]
                $pv:ident ( $pp:ty )
                => $ph:path, $pn:literal : $pd:literal ;
            )*
        }
        no_params {
            $(
                [ $nc:expr $(, $nf:ident)* ]
                $nv:ident
                => $nh:path, $nn:literal : $nd:literal ;
            )*
        }
    ) => {
        // ── 1. Command enum ──
        #[derive(Debug, Clone, Serialize, Deserialize)]
        #[serde(tag = "command", content = "params")]
        pub enum $enum_name {
            $( $pv($pp), )*
            $( $nv, )*
        }

        impl CommandSet for $enum_name {
            type State = $state;

            // ── 2. info() ──
            fn info(&self) -> CommandInfo {
                match self {
                    $( $enum_name::$pv(_) => CommandInfo {
                        name: $pn,
                        description: $pd,
                        device: $pc,
                        query: define_commands!(@has_flag query; $($pf)*),
                        temperature: define_commands!(@has_flag temperature; $($pf)*),
                        llm_hidden: define_commands!(@has_flag llm_hidden; $($pf)*),
                    }, )*
                    $( $enum_name::$nv => CommandInfo {
                        name: $nn,
                        description: $nd,
                        device: $nc,
                        query: define_commands!(@has_flag query; $($nf)*),
                        temperature: define_commands!(@has_flag temperature; $($nf)*),
                        llm_hidden: define_commands!(@has_flag llm_hidden; $($nf)*),
                    }, )*
                }
            }

            // ── 3. catalog_entries() ──
            fn catalog_entries() -> Vec<CatalogEntry> {
                vec![
                    $( catalog::entry(
                        CommandInfo {
                            name: $pn,
                            description: $pd,
                            device: $pc,
                            query: define_commands!(@has_flag query; $($pf)*),
                            temperature: define_commands!(@has_flag temperature; $($pf)*),
                            llm_hidden: define_commands!(@has_flag llm_hidden; $($pf)*),
                        },
                        catalog::schema_value::<$pp>(),
                    ), )*
                    $( catalog::entry(
                        CommandInfo {
                            name: $nn,
                            description: $nd,
                            device: $nc,
                            query: define_commands!(@has_flag query; $($nf)*),
                            temperature: define_commands!(@has_flag temperature; $($nf)*),
                            llm_hidden: define_commands!(@has_flag llm_hidden; $($nf)*),
                        },
                        catalog::empty_object_schema(),
                    ), )*
                ]
            }

            // ── 4. from_call() ──
            fn from_call(call: &FunctionCall) -> Result<Self, AppError> {
                match call.name.as_str() {
                    $( $pn => Ok($enum_name::$pv(catalog::de($pn, &call.parameters)?)), )*
                    $( $nn => Ok($enum_name::$nv), )*
                    other => Err(AppError::unknown_operation(other)),
                }
            }

            // ── 5. apply() ──
            fn apply(self, controller: &mut Controller<$state>) -> Result<CommandOutput, AppError> {
                match self {
                    $( $enum_name::$pv(p) => $ph(controller, p), )*
                    $( $enum_name::$nv => $nh(controller), )*
                }
            }
        }
    };

    // Flag helpers: check whether a specific flag appears in a list of flags.
    // Literal tokens match before metavariables, so e.g. `query` matches the
    // first arm and any other ident falls through to the recursive second arm.
    (@has_flag query; query $($rest:ident)*) => { true };
    (@has_flag query; $_other:ident $($rest:ident)*) => { define_commands!(@has_flag query; $($rest)*) };
    (@has_flag query;) => { false };

    (@has_flag temperature; temperature $($rest:ident)*) => { true };
    (@has_flag temperature; $_other:ident $($rest:ident)*) => { define_commands!(@has_flag temperature; $($rest)*) };
    (@has_flag temperature;) => { false };

    (@has_flag llm_hidden; llm_hidden $($rest:ident)*) => { true };
    (@has_flag llm_hidden; $_other:ident $($rest:ident)*) => { define_commands!(@has_flag llm_hidden; $($rest)*) };
    (@has_flag llm_hidden;) => { false };
}

// ── Climate: one air conditioner ────────────────────────────────

define_commands! {
    ClimateCommand for ClimateState;
    params {
        [DeviceKind::Ac, temperature]
        SetTemperature(TemperatureParams)
        => ac::set_temperature, "set_temperature": "Set the air conditioner target temperature (16-30°C).";

        [DeviceKind::Ac]
        AdjustTemperature(DeltaParams)
        => ac::adjust_temperature, "adjust_temperature": "Raise or lower the target temperature by delta degrees.";

        [DeviceKind::Ac]
        SetFanSpeed(FanSpeedParams)
        => ac::set_fan_speed, "set_fan_speed": "Set the fan speed: low, medium, high or auto.";

        [DeviceKind::Ac]
        SetMode(ModeParams)
        => ac::set_mode, "set_mode": "Set the operating mode: cooling, heating, auto or ventilation.";

        [DeviceKind::Sensor, llm_hidden]
        UpdateEnvironment(EnvironmentParams)
        => climate::update_environment, "update_environment": "Record sensed indoor and/or outdoor temperature (-20-50°C).";
    }
    no_params {
        [DeviceKind::Ac, query]
        GetCurrentTemperature
        => climate::get_current_temperature, "get_current_temperature": "Report the target, indoor and outdoor temperatures.";

        [DeviceKind::Ac]
        PowerOn => ac::power_on, "power_on": "Turn the air conditioner on.";

        [DeviceKind::Ac]
        PowerOff => ac::power_off, "power_off": "Turn the air conditioner off.";
    }
}

// ── Home: seven devices ─────────────────────────────────────────

define_commands! {
    HomeCommand for HomeState;
    params {
        // ── Air conditioner ─────────────────────────────────────
        [DeviceKind::Ac, temperature]
        AcSetTemperature(TemperatureParams)
        => ac::set_temperature, "ac_set_temperature": "Set the air conditioner target temperature (16-30°C).";

        [DeviceKind::Ac]
        AcAdjustTemperature(DeltaParams)
        => ac::adjust_temperature, "ac_adjust_temperature": "Raise or lower the air conditioner temperature by delta degrees.";

        [DeviceKind::Ac]
        AcSetMode(ModeParams)
        => ac::set_mode, "ac_set_mode": "Set the air conditioner mode: cooling, heating, auto or ventilation.";

        [DeviceKind::Ac]
        AcSetFanSpeed(FanSpeedParams)
        => ac::set_fan_speed, "ac_set_fan_speed": "Set the air conditioner fan speed: low, medium, high or auto.";

        // ── TV ───────────────────────────────────────────────
        [DeviceKind::Tv]
        TvSetChannel(ChannelParams)
        => tv::set_channel, "tv_set_channel": "Switch the TV to a channel (1-100). Closes any running app.";

        [DeviceKind::Tv]
        TvSetVolume(VolumeParams)
        => tv::set_volume, "tv_set_volume": "Set the TV volume (0-100).";

        [DeviceKind::Tv]
        TvAdjustVolume(DeltaParams)
        => tv::adjust_volume, "tv_adjust_volume": "Raise or lower the TV volume by delta.";

        [DeviceKind::Tv]
        TvLaunchApp(LaunchAppParams)
        => tv::launch_app, "tv_launch_app": "Open an app on the TV, e.g. Netflix or YouTube.";

        // ── Light ───────────────────────────────────────────────
        [DeviceKind::Light]
        LightSetBrightness(BrightnessParams)
        => light::set_brightness, "light_set_brightness": "Set the light brightness in percent (0-100).";

        [DeviceKind::Light]
        LightAdjustBrightness(DeltaParams)
        => light::adjust_brightness, "light_adjust_brightness": "Raise or lower the light brightness by delta percent.";

        [DeviceKind::Light]
        LightSetColorTemp(ColorTempParams)
        => light::set_color_temp, "light_set_color_temp": "Set the light color temperature in Kelvin (2700 warm - 6500 cool).";

        // ── Vacuum ───────────────────────────────────────────────
        [DeviceKind::Vacuum]
        VacuumCleanZone(ZoneParams)
        => vacuum::clean_zone, "vacuum_clean_zone": "Clean one zone: living_room, bedroom, kitchen or bathroom.";

        // ── Audio ───────────────────────────────────────────────
        [DeviceKind::Audio]
        AudioSetVolume(VolumeParams)
        => audio::set_volume, "audio_set_volume": "Set the audio volume (0-100).";

        [DeviceKind::Audio]
        AudioAdjustVolume(DeltaParams)
        => audio::adjust_volume, "audio_adjust_volume": "Raise or lower the audio volume by delta.";

        [DeviceKind::Audio]
        AudioPlayPlaylist(PlaylistParams)
        => audio::play_playlist, "audio_play_playlist": "Start playing a named playlist.";

        // ── Curtain ─────────────────────────────────────────────
        [DeviceKind::Curtain]
        CurtainSetPosition(PositionParams)
        => curtain::set_position, "curtain_set_position": "Move the curtain to a position in percent (0 closed - 100 open).";

        // ── Ventilation ─────────────────────────────────────────
        [DeviceKind::Ventilation]
        VentilationSetSpeed(FanSpeedParams)
        => ventilation::set_speed, "ventilation_set_speed": "Set the ventilation fan speed: low, medium, high or auto.";
    }
    no_params {
        [DeviceKind::Ac]
        AcPowerOn => ac::power_on, "ac_power_on": "Turn the air conditioner on.";

        [DeviceKind::Ac]
        AcPowerOff => ac::power_off, "ac_power_off": "Turn the air conditioner off.";

        [DeviceKind::Tv]
        TvPowerOn => tv::power_on, "tv_power_on": "Turn the TV on.";

        [DeviceKind::Tv]
        TvPowerOff => tv::power_off, "tv_power_off": "Turn the TV off. Closes any running app.";

        [DeviceKind::Light]
        LightPowerOn => light::power_on, "light_power_on": "Turn the light on.";

        [DeviceKind::Light]
        LightPowerOff => light::power_off, "light_power_off": "Turn the light off.";

        [DeviceKind::Vacuum]
        VacuumStart => vacuum::start, "vacuum_start": "Start cleaning.";

        [DeviceKind::Vacuum]
        VacuumPause => vacuum::pause, "vacuum_pause": "Pause cleaning. Only valid while cleaning.";

        [DeviceKind::Vacuum]
        VacuumStop => vacuum::stop, "vacuum_stop": "Stop cleaning and go idle.";

        [DeviceKind::Vacuum]
        VacuumReturnDock => vacuum::return_dock, "vacuum_return_dock": "Send the vacuum back to its charging dock.";

        [DeviceKind::Audio]
        AudioPowerOn => audio::power_on, "audio_power_on": "Turn the audio system on.";

        [DeviceKind::Audio]
        AudioPowerOff => audio::power_off, "audio_power_off": "Turn the audio system off. Stops playback.";

        [DeviceKind::Audio]
        AudioPlay => audio::play, "audio_play": "Start or resume playback.";

        [DeviceKind::Audio]
        AudioPause => audio::pause, "audio_pause": "Pause playback.";

        [DeviceKind::Audio]
        AudioStop => audio::stop, "audio_stop": "Stop playback.";

        [DeviceKind::Curtain]
        CurtainOpen => curtain::open, "curtain_open": "Open the curtain fully.";

        [DeviceKind::Curtain]
        CurtainClose => curtain::close, "curtain_close": "Close the curtain fully.";

        [DeviceKind::Curtain]
        CurtainStop => curtain::stop, "curtain_stop": "Stop the curtain where it is.";

        [DeviceKind::Ventilation]
        VentilationPowerOn => ventilation::power_on, "ventilation_power_on": "Turn the ventilation fan on.";

        [DeviceKind::Ventilation]
        VentilationPowerOff => ventilation::power_off, "ventilation_power_off": "Turn the ventilation fan off.";
    }
}
