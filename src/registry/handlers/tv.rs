use crate::controller::Controller;
use crate::error::AppError;
use crate::registry::params::{ChannelParams, DeltaParams, LaunchAppParams, VolumeParams};
use crate::registry::CommandOutput;
use crate::state::{bounds, HomeState};

use super::{set_level, set_power};

pub fn power_on(controller: &mut Controller<HomeState>) -> Result<CommandOutput, AppError> {
    Ok(set_power(controller, true, "TV on.", |s| &mut s.tv.power))
}

/// Turning the TV off also closes the running app.
pub fn power_off(controller: &mut Controller<HomeState>) -> Result<CommandOutput, AppError> {
    controller.update(|s| {
        s.tv.power = false;
        s.tv.current_app = None;
    });
    Ok(CommandOutput::unit("TV off.").with("power", false))
}

/// Switching channel closes the running app.
pub fn set_channel(
    controller: &mut Controller<HomeState>,
    p: ChannelParams,
) -> Result<CommandOutput, AppError> {
    let level = set_level(controller, bounds::TV_CHANNEL, p.channel, |s| {
        s.tv.current_app = None;
        (&mut s.tv.channel, Some(&mut s.tv.power))
    });
    Ok(level.into_output("channel", format!("TV switched to channel {}.", level.current)))
}

pub fn set_volume(
    controller: &mut Controller<HomeState>,
    p: VolumeParams,
) -> Result<CommandOutput, AppError> {
    let level = set_level(controller, bounds::VOLUME, p.volume, |s| {
        (&mut s.tv.volume, Some(&mut s.tv.power))
    });
    Ok(level.into_output("volume", format!("TV volume set to {}.", level.current)))
}

pub fn adjust_volume(
    controller: &mut Controller<HomeState>,
    p: DeltaParams,
) -> Result<CommandOutput, AppError> {
    let volume = controller.state().tv.volume.saturating_add(p.delta);
    set_volume(controller, VolumeParams { volume })
}

pub fn launch_app(
    controller: &mut Controller<HomeState>,
    p: LaunchAppParams,
) -> Result<CommandOutput, AppError> {
    let app = p.app_name.trim().to_string();
    if app.is_empty() {
        return Err(AppError::InvalidParameters {
            operation: "tv_launch_app".to_string(),
            message: "app_name must not be empty".to_string(),
        });
    }
    controller.update(|s| {
        s.tv.current_app = Some(app.clone());
        s.tv.power = true;
    });
    Ok(CommandOutput::unit(format!("Launched {app}.")).with("app", app))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn launched(controller: &mut Controller<HomeState>) {
        launch_app(
            controller,
            LaunchAppParams {
                app_name: "Netflix".into(),
            },
        )
        .unwrap();
    }

    #[test]
    fn volume_is_clamped_to_hundred() {
        let mut controller = Controller::new(HomeState::default());
        let out = set_volume(&mut controller, VolumeParams { volume: 150 }).unwrap();
        assert_eq!(out.data.get("current_volume"), Some(&serde_json::json!(100)));
        assert!(controller.state().tv.power);
    }

    #[test]
    fn same_volume_twice_is_idempotent() {
        let mut controller = Controller::new(HomeState::default());
        set_volume(&mut controller, VolumeParams { volume: 55 }).unwrap();
        let out = set_volume(&mut controller, VolumeParams { volume: 55 }).unwrap();
        assert_eq!(out.data.get("previous_volume"), out.data.get("current_volume"));
        assert_eq!(controller.state().tv.volume, 55);
    }

    #[test]
    fn channel_change_closes_app() {
        let mut controller = Controller::new(HomeState::default());
        launched(&mut controller);
        set_channel(&mut controller, ChannelParams { channel: 0 }).unwrap();
        assert_eq!(controller.state().tv.channel, 1);
        assert_eq!(controller.state().tv.current_app, None);
    }

    #[test]
    fn power_off_closes_app() {
        let mut controller = Controller::new(HomeState::default());
        launched(&mut controller);
        assert!(controller.state().tv.power);
        power_off(&mut controller).unwrap();
        assert_eq!(controller.state().tv.current_app, None);
        assert!(!controller.state().tv.power);
    }

    #[test]
    fn adjust_volume_clamps_at_zero() {
        let mut controller = Controller::new(HomeState::default());
        adjust_volume(&mut controller, DeltaParams { delta: -50 }).unwrap();
        assert_eq!(controller.state().tv.volume, 0);
    }

    #[test]
    fn blank_app_name_is_rejected() {
        let mut controller = Controller::new(HomeState::default());
        let result = launch_app(&mut controller, LaunchAppParams { app_name: "  ".into() });
        assert!(result.is_err());
        assert!(!controller.state().tv.power);
    }
}
