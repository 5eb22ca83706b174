//! Air conditioner. Generic over the state tree so the single-device climate set and the
//! home set share one implementation.

use crate::controller::Controller;
use crate::error::AppError;
use crate::registry::params::{DeltaParams, FanSpeedParams, ModeParams, TemperatureParams};
use crate::registry::CommandOutput;
use crate::state::{bounds, AcMode, FanSpeed, HasAc};
use crate::util::parse_choice;

use super::{set_level, set_power};

pub fn power_on<S: HasAc>(controller: &mut Controller<S>) -> Result<CommandOutput, AppError> {
    Ok(set_power(controller, true, "Air conditioner on.", |s| &mut s.ac_mut().power))
}

pub fn power_off<S: HasAc>(controller: &mut Controller<S>) -> Result<CommandOutput, AppError> {
    Ok(set_power(controller, false, "Air conditioner off.", |s| &mut s.ac_mut().power))
}

pub fn set_temperature<S: HasAc>(
    controller: &mut Controller<S>,
    p: TemperatureParams,
) -> Result<CommandOutput, AppError> {
    let level = set_level(controller, bounds::AC_TEMPERATURE, p.temperature, |s| {
        let ac = s.ac_mut();
        (&mut ac.temperature, Some(&mut ac.power))
    });
    Ok(level.into_output(
        "temperature",
        format!("Temperature set to {}°C.", level.current),
    ))
}

pub fn adjust_temperature<S: HasAc>(
    controller: &mut Controller<S>,
    p: DeltaParams,
) -> Result<CommandOutput, AppError> {
    let temperature = controller.state().ac().temperature.saturating_add(p.delta);
    set_temperature(controller, TemperatureParams { temperature })
}

pub fn set_fan_speed<S: HasAc>(
    controller: &mut Controller<S>,
    p: FanSpeedParams,
) -> Result<CommandOutput, AppError> {
    let speed = parse_choice("speed", &p.speed, FanSpeed::ALL)?;
    controller.update(|s| {
        let ac = s.ac_mut();
        ac.fan_speed = speed;
        ac.power = true;
    });
    Ok(CommandOutput::unit(format!("Fan speed set to {speed}.")).with("fan_speed", speed))
}

pub fn set_mode<S: HasAc>(
    controller: &mut Controller<S>,
    p: ModeParams,
) -> Result<CommandOutput, AppError> {
    let mode = parse_choice("mode", &p.mode, AcMode::ALL)?;
    controller.update(|s| {
        let ac = s.ac_mut();
        ac.mode = mode;
        ac.power = true;
    });
    Ok(CommandOutput::unit(format!("Mode set to {mode}.")).with("mode", mode))
}
