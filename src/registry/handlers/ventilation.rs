use crate::controller::Controller;
use crate::error::AppError;
use crate::registry::params::FanSpeedParams;
use crate::registry::CommandOutput;
use crate::state::{FanSpeed, HomeState};
use crate::util::parse_choice;

use super::set_power;

pub fn power_on(controller: &mut Controller<HomeState>) -> Result<CommandOutput, AppError> {
    Ok(set_power(controller, true, "Ventilation on.", |s| &mut s.ventilation.power))
}

pub fn power_off(controller: &mut Controller<HomeState>) -> Result<CommandOutput, AppError> {
    Ok(set_power(controller, false, "Ventilation off.", |s| &mut s.ventilation.power))
}

pub fn set_speed(
    controller: &mut Controller<HomeState>,
    p: FanSpeedParams,
) -> Result<CommandOutput, AppError> {
    let speed = parse_choice("speed", &p.speed, FanSpeed::ALL)?;
    controller.update(|s| {
        s.ventilation.speed = speed;
        s.ventilation.power = true;
    });
    Ok(CommandOutput::unit(format!("Ventilation speed set to {speed}.")).with("speed", speed))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn speed_powers_on() {
        let mut controller = Controller::new(HomeState::default());
        set_speed(&mut controller, FanSpeedParams { speed: "Low".into() }).unwrap();
        assert_eq!(controller.state().ventilation.speed, FanSpeed::Low);
        assert!(controller.state().ventilation.power);
    }

    #[test]
    fn bad_speed_leaves_fan_off() {
        let mut controller = Controller::new(HomeState::default());
        assert!(set_speed(&mut controller, FanSpeedParams { speed: "turbo".into() }).is_err());
        assert!(!controller.state().ventilation.power);
        assert_eq!(controller.state().ventilation.speed, FanSpeed::Auto);
    }
}
