//! One module per device, one function per operation.
//!
//! Shared rules live here so no handler re-implements them: numeric setters clamp and
//! report `previous_<field>` / `current_<field>`, functional setters turn their device on,
//! and delta operations go through the absolute setter.

#![allow(clippy::needless_pass_by_value)]

pub mod ac;
pub mod audio;
pub mod climate;
pub mod curtain;
pub mod light;
pub mod tv;
pub mod vacuum;
pub mod ventilation;

use crate::controller::Controller;
use crate::registry::CommandOutput;
use crate::state::Bounds;

/// Result of a clamped numeric write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    pub previous: i64,
    pub current: i64,
}

impl Level {
    pub fn into_output(self, field: &str, message: impl Into<String>) -> CommandOutput {
        CommandOutput::unit(message)
            .with(format!("previous_{field}"), self.previous)
            .with(format!("current_{field}"), self.current)
    }
}

/// Clamp `requested` into `bounds`, store it in the slot `access` selects and, when
/// `access` also hands back a power flag, switch the device on. Always notifies.
pub fn set_level<S>(
    controller: &mut Controller<S>,
    bounds: Bounds,
    requested: i64,
    access: impl FnOnce(&mut S) -> (&mut i64, Option<&mut bool>),
) -> Level {
    controller.update(|state| {
        let (slot, power) = access(state);
        let previous = *slot;
        *slot = bounds.clamp(requested);
        if let Some(power) = power {
            *power = true;
        }
        Level {
            previous,
            current: *slot,
        }
    })
}

/// Set a power flag and report it.
pub fn set_power<S>(
    controller: &mut Controller<S>,
    on: bool,
    message: &str,
    access: impl FnOnce(&mut S) -> &mut bool,
) -> CommandOutput {
    controller.update(|state| *access(state) = on);
    CommandOutput::unit(message).with("power", on)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{bounds, TvState};

    #[test]
    fn set_level_clamps_and_powers_on() {
        let mut controller = Controller::new(TvState::default());
        let level = set_level(&mut controller, bounds::VOLUME, 150, |tv| {
            (&mut tv.volume, Some(&mut tv.power))
        });
        assert_eq!(level, Level { previous: 30, current: 100 });
        assert!(controller.state().power);
    }

    #[test]
    fn level_output_names_fields() {
        let out = Level { previous: 1, current: 2 }.into_output("channel", "ok");
        assert_eq!(out.data.get("previous_channel"), Some(&serde_json::json!(1)));
        assert_eq!(out.data.get("current_channel"), Some(&serde_json::json!(2)));
    }
}
