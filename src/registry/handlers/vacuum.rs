use crate::controller::Controller;
use crate::error::AppError;
use crate::registry::params::ZoneParams;
use crate::registry::CommandOutput;
use crate::state::{CleaningZone, HomeState, VacuumStatus};
use crate::util::parse_choice;

pub fn start(controller: &mut Controller<HomeState>) -> Result<CommandOutput, AppError> {
    controller.update(|s| {
        s.vacuum.power = true;
        s.vacuum.status = VacuumStatus::Cleaning;
    });
    Ok(CommandOutput::unit("Cleaning started.").with("status", VacuumStatus::Cleaning))
}

/// Only a cleaning vacuum can pause.
pub fn pause(controller: &mut Controller<HomeState>) -> Result<CommandOutput, AppError> {
    controller.try_update(|s| {
        if s.vacuum.status != VacuumStatus::Cleaning {
            return Err(AppError::invalid_state(format!(
                "vacuum is not cleaning (status: {})",
                s.vacuum.status
            )));
        }
        s.vacuum.status = VacuumStatus::Paused;
        Ok(())
    })?;
    Ok(CommandOutput::unit("Cleaning paused.").with("status", VacuumStatus::Paused))
}

pub fn stop(controller: &mut Controller<HomeState>) -> Result<CommandOutput, AppError> {
    controller.update(|s| {
        s.vacuum.status = VacuumStatus::Idle;
        s.vacuum.current_zone = None;
    });
    Ok(CommandOutput::unit("Cleaning stopped.").with("status", VacuumStatus::Idle))
}

pub fn clean_zone(
    controller: &mut Controller<HomeState>,
    p: ZoneParams,
) -> Result<CommandOutput, AppError> {
    let zone = parse_choice("zone", &p.zone, CleaningZone::ALL)?;
    controller.update(|s| {
        s.vacuum.power = true;
        s.vacuum.status = VacuumStatus::Cleaning;
        s.vacuum.current_zone = Some(zone);
    });
    Ok(CommandOutput::unit(format!("Cleaning the {}.", zone.label().replace('_', " ")))
        .with("zone", zone)
        .with("status", VacuumStatus::Cleaning))
}

pub fn return_dock(controller: &mut Controller<HomeState>) -> Result<CommandOutput, AppError> {
    controller.update(|s| {
        s.vacuum.status = VacuumStatus::Returning;
        s.vacuum.current_zone = None;
    });
    Ok(CommandOutput::unit("Returning to dock.").with("status", VacuumStatus::Returning))
}
