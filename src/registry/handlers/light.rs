use crate::controller::Controller;
use crate::error::AppError;
use crate::registry::params::{BrightnessParams, ColorTempParams, DeltaParams};
use crate::registry::CommandOutput;
use crate::state::{bounds, HomeState};

use super::{set_level, set_power};

pub fn power_on(controller: &mut Controller<HomeState>) -> Result<CommandOutput, AppError> {
    Ok(set_power(controller, true, "Light on.", |s| &mut s.light.power))
}

pub fn power_off(controller: &mut Controller<HomeState>) -> Result<CommandOutput, AppError> {
    Ok(set_power(controller, false, "Light off.", |s| &mut s.light.power))
}

pub fn set_brightness(
    controller: &mut Controller<HomeState>,
    p: BrightnessParams,
) -> Result<CommandOutput, AppError> {
    let level = set_level(controller, bounds::BRIGHTNESS, p.brightness, |s| {
        (&mut s.light.brightness, Some(&mut s.light.power))
    });
    Ok(level.into_output("brightness", format!("Brightness set to {}%.", level.current)))
}

pub fn adjust_brightness(
    controller: &mut Controller<HomeState>,
    p: DeltaParams,
) -> Result<CommandOutput, AppError> {
    let brightness = controller.state().light.brightness.saturating_add(p.delta);
    set_brightness(controller, BrightnessParams { brightness })
}

pub fn set_color_temp(
    controller: &mut Controller<HomeState>,
    p: ColorTempParams,
) -> Result<CommandOutput, AppError> {
    let level = set_level(controller, bounds::COLOR_TEMP, p.temp, |s| {
        (&mut s.light.color_temp, Some(&mut s.light.power))
    });
    let tone = warmth(level.current);
    Ok(level
        .into_output("temp", format!("Color temperature set to {}K ({tone}).", level.current))
        .with("tone", tone))
}

/// Below 4000K reads warm, above 5000K cool.
fn warmth(kelvin: i64) -> &'static str {
    if kelvin < 4000 {
        "warm"
    } else if kelvin > 5000 {
        "cool"
    } else {
        "neutral"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn color_temp_clamped_and_named() {
        let mut controller = Controller::new(HomeState::default());
        let out = set_color_temp(&mut controller, ColorTempParams { temp: 1000 }).unwrap();
        assert_eq!(controller.state().light.color_temp, 2700);
        assert_eq!(out.data.get("tone"), Some(&serde_json::json!("warm")));
        assert!(out.message.contains("2700K"));

        let out = set_color_temp(&mut controller, ColorTempParams { temp: 9000 }).unwrap();
        assert_eq!(out.data.get("current_temp"), Some(&serde_json::json!(6500)));
        assert_eq!(out.data.get("tone"), Some(&serde_json::json!("cool")));
    }

    #[test]
    fn warmth_boundaries() {
        assert_eq!(warmth(3999), "warm");
        assert_eq!(warmth(4000), "neutral");
        assert_eq!(warmth(5000), "neutral");
        assert_eq!(warmth(5001), "cool");
    }

    #[test]
    fn brightness_delta_clamps() {
        let mut controller = Controller::new(HomeState::default());
        adjust_brightness(&mut controller, DeltaParams { delta: 20 }).unwrap();
        assert_eq!(controller.state().light.brightness, 100);
        adjust_brightness(&mut controller, DeltaParams { delta: -130 }).unwrap();
        assert_eq!(controller.state().light.brightness, 0);
        assert!(controller.state().light.power);
    }
}
