//! Human-readable state context, handed to the upstream generator as part of its prompt
//! and printed by the CLI.

use crate::state::{
    AcState, AudioState, CleaningZone, ClimateState, CurtainState, HomeState, LightState, TvState,
    VacuumState, VentilationState,
};

pub trait Describe {
    /// One `label: value` line per setting.
    fn describe(&self) -> Vec<String>;
}

fn on_off(power: bool) -> &'static str {
    if power {
        "on"
    } else {
        "off"
    }
}

fn or_none(value: Option<&str>) -> &str {
    value.unwrap_or("none")
}

impl Describe for AcState {
    fn describe(&self) -> Vec<String> {
        vec![
            format!("power: {}", on_off(self.power)),
            format!("target temperature: {}°C", self.temperature),
            format!("mode: {}", self.mode),
            format!("fan speed: {}", self.fan_speed),
        ]
    }
}

impl Describe for ClimateState {
    fn describe(&self) -> Vec<String> {
        let mut lines = self.ac.describe();
        // Sensor readings go right after the target so the model sees them together.
        lines.insert(2, format!("indoor temperature: {}°C", self.indoor_temperature));
        lines.insert(3, format!("outdoor temperature: {}°C", self.outdoor_temperature));
        lines
    }
}

impl Describe for TvState {
    fn describe(&self) -> Vec<String> {
        vec![
            format!("power: {}", on_off(self.power)),
            format!("channel: {}", self.channel),
            format!("volume: {}", self.volume),
            format!("app: {}", or_none(self.current_app.as_deref())),
        ]
    }
}

impl Describe for LightState {
    fn describe(&self) -> Vec<String> {
        vec![
            format!("power: {}", on_off(self.power)),
            format!("brightness: {}%", self.brightness),
            format!("color temperature: {}K", self.color_temp),
        ]
    }
}

impl Describe for VacuumState {
    fn describe(&self) -> Vec<String> {
        vec![
            format!("power: {}", on_off(self.power)),
            format!("status: {}", self.status),
            format!("zone: {}", or_none(self.current_zone.map(CleaningZone::label))),
        ]
    }
}

impl Describe for AudioState {
    fn describe(&self) -> Vec<String> {
        vec![
            format!("power: {}", on_off(self.power)),
            format!("volume: {}", self.volume),
            format!("playback: {}", self.playback),
            format!("playlist: {}", or_none(self.current_playlist.as_deref())),
        ]
    }
}

impl Describe for CurtainState {
    fn describe(&self) -> Vec<String> {
        vec![
            format!("position: {}%", self.position),
            format!("status: {}", self.status),
        ]
    }
}

impl Describe for VentilationState {
    fn describe(&self) -> Vec<String> {
        vec![
            format!("power: {}", on_off(self.power)),
            format!("speed: {}", self.speed),
        ]
    }
}

/// Device lines are prefixed with the device slug: `tv volume: 30`.
impl Describe for HomeState {
    fn describe(&self) -> Vec<String> {
        let devices: [(&str, Vec<String>); 7] = [
            ("ac", self.ac.describe()),
            ("tv", self.tv.describe()),
            ("light", self.light.describe()),
            ("vacuum", self.vacuum.describe()),
            ("audio", self.audio.describe()),
            ("curtain", self.curtain.describe()),
            ("ventilation", self.ventilation.describe()),
        ];
        devices
            .into_iter()
            .flat_map(|(slug, lines)| lines.into_iter().map(move |line| format!("{slug} {line}")))
            .collect()
    }
}

/// Context block as it appears in the generator prompt.
pub fn context_block(lines: &[String]) -> String {
    let mut out = String::from("Current context:");
    for line in lines {
        out.push_str("\n- ");
        out.push_str(line);
    }
    out
}
