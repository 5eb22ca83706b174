use crate::controller::Controller;
use crate::error::AppError;
use crate::registry::params::EnvironmentParams;
use crate::registry::CommandOutput;
use crate::state::{bounds, ClimateState};

/// Read-only; never notifies.
pub fn get_current_temperature(
    controller: &mut Controller<ClimateState>,
) -> Result<CommandOutput, AppError> {
    let state = controller.state();
    Ok(CommandOutput::unit(format!(
        "Set to {}°C, indoor {}°C, outdoor {}°C.",
        state.ac.temperature, state.indoor_temperature, state.outdoor_temperature
    ))
    .with("temperature", state.ac.temperature)
    .with("indoor_temperature", state.indoor_temperature)
    .with("outdoor_temperature", state.outdoor_temperature)
    .with("power", state.ac.power))
}

/// Sensor feed. Needs at least one reading; each is clamped to the environment range.
pub fn update_environment(
    controller: &mut Controller<ClimateState>,
    p: EnvironmentParams,
) -> Result<CommandOutput, AppError> {
    if p.indoor_temperature.is_none() && p.outdoor_temperature.is_none() {
        return Err(AppError::InvalidParameters {
            operation: "update_environment".to_string(),
            message: "indoor_temperature or outdoor_temperature is required".to_string(),
        });
    }

    let range = bounds::ENVIRONMENT_TEMPERATURE;
    let (indoor, outdoor) = controller.update(|state| {
        if let Some(t) = p.indoor_temperature {
            state.indoor_temperature = range.clamp(t);
        }
        if let Some(t) = p.outdoor_temperature {
            state.outdoor_temperature = range.clamp(t);
        }
        (state.indoor_temperature, state.outdoor_temperature)
    });

    Ok(CommandOutput::unit(format!("Environment updated: indoor {indoor}°C, outdoor {outdoor}°C."))
        .with("indoor_temperature", indoor)
        .with("outdoor_temperature", outdoor))
}
