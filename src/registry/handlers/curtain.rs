//! Curtains have no power flag, so nothing here auto-powers.

use crate::controller::Controller;
use crate::error::AppError;
use crate::registry::params::PositionParams;
use crate::registry::CommandOutput;
use crate::state::{bounds, CurtainStatus, HomeState};

use super::set_level;

pub fn open(controller: &mut Controller<HomeState>) -> Result<CommandOutput, AppError> {
    move_to(controller, bounds::CURTAIN_POSITION.max, "Curtain opened.")
}

pub fn close(controller: &mut Controller<HomeState>) -> Result<CommandOutput, AppError> {
    move_to(controller, bounds::CURTAIN_POSITION.min, "Curtain closed.")
}

pub fn stop(controller: &mut Controller<HomeState>) -> Result<CommandOutput, AppError> {
    controller.update(|s| s.curtain.status = CurtainStatus::Stopped);
    Ok(CommandOutput::unit("Curtain stopped.").with("status", CurtainStatus::Stopped))
}

pub fn set_position(
    controller: &mut Controller<HomeState>,
    p: PositionParams,
) -> Result<CommandOutput, AppError> {
    let level = set_level(controller, bounds::CURTAIN_POSITION, p.position, |s| {
        s.curtain.status = CurtainStatus::Stopped;
        (&mut s.curtain.position, None)
    });
    Ok(level.into_output("position", format!("Curtain set to {}%.", level.current)))
}

fn move_to(
    controller: &mut Controller<HomeState>,
    position: i64,
    message: &str,
) -> Result<CommandOutput, AppError> {
    let out = set_position(controller, PositionParams { position })?;
    Ok(CommandOutput {
        message: message.to_string(),
        data: out.data,
    })
}
