use crate::controller::Controller;
use crate::error::AppError;
use crate::registry::params::{DeltaParams, PlaylistParams, VolumeParams};
use crate::registry::CommandOutput;
use crate::state::{bounds, HomeState, PlaybackStatus};

use super::{set_level, set_power};

pub fn power_on(controller: &mut Controller<HomeState>) -> Result<CommandOutput, AppError> {
    Ok(set_power(controller, true, "Audio on.", |s| &mut s.audio.power))
}

/// Powering off stops playback.
pub fn power_off(controller: &mut Controller<HomeState>) -> Result<CommandOutput, AppError> {
    controller.update(|s| {
        s.audio.power = false;
        s.audio.playback = PlaybackStatus::Stopped;
    });
    Ok(CommandOutput::unit("Audio off.").with("power", false))
}

pub fn set_volume(
    controller: &mut Controller<HomeState>,
    p: VolumeParams,
) -> Result<CommandOutput, AppError> {
    let level = set_level(controller, bounds::VOLUME, p.volume, |s| {
        (&mut s.audio.volume, Some(&mut s.audio.power))
    });
    Ok(level.into_output("volume", format!("Audio volume set to {}.", level.current)))
}

pub fn adjust_volume(
    controller: &mut Controller<HomeState>,
    p: DeltaParams,
) -> Result<CommandOutput, AppError> {
    let volume = controller.state().audio.volume.saturating_add(p.delta);
    set_volume(controller, VolumeParams { volume })
}

pub fn play(controller: &mut Controller<HomeState>) -> Result<CommandOutput, AppError> {
    controller.update(|s| {
        s.audio.playback = PlaybackStatus::Playing;
        s.audio.power = true;
    });
    Ok(CommandOutput::unit("Playing.").with("playback", PlaybackStatus::Playing))
}

pub fn pause(controller: &mut Controller<HomeState>) -> Result<CommandOutput, AppError> {
    controller.update(|s| s.audio.playback = PlaybackStatus::Paused);
    Ok(CommandOutput::unit("Paused.").with("playback", PlaybackStatus::Paused))
}

pub fn stop(controller: &mut Controller<HomeState>) -> Result<CommandOutput, AppError> {
    controller.update(|s| s.audio.playback = PlaybackStatus::Stopped);
    Ok(CommandOutput::unit("Stopped.").with("playback", PlaybackStatus::Stopped))
}

pub fn play_playlist(
    controller: &mut Controller<HomeState>,
    p: PlaylistParams,
) -> Result<CommandOutput, AppError> {
    let playlist = p.playlist.trim().to_string();
    if playlist.is_empty() {
        return Err(AppError::InvalidParameters {
            operation: "audio_play_playlist".to_string(),
            message: "playlist must not be empty".to_string(),
        });
    }
    controller.update(|s| {
        s.audio.current_playlist = Some(playlist.clone());
        s.audio.playback = PlaybackStatus::Playing;
        s.audio.power = true;
    });
    Ok(CommandOutput::unit(format!("Playing playlist {playlist}.")).with("playlist", playlist))
}
