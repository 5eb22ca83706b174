use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
#[cfg(feature = "server")]
use ts_rs::TS;

use crate::engine::DeviceSet;
use crate::error::AppError;

pub const SETTINGS_FILE: &str = "home-command.json";

const SETTINGS_VERSION: u32 = 1;

/// Process configuration, read once at startup. Command-line flags override these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(TS))]
#[cfg_attr(feature = "server", ts(export))]
#[serde(default)]
pub struct AppSettings {
    pub version: u32,
    /// Which capability catalog to serve.
    #[cfg_attr(feature = "server", ts(type = "\"home\" | \"climate\""))]
    pub device_set: DeviceSet,
    pub bind_addr: String,
    /// `tracing` filter directive. `RUST_LOG` wins when set.
    pub log_filter: String,
    /// Directory for the JSONL audit log. None disables auditing.
    #[cfg_attr(feature = "server", ts(type = "string | null"))]
    pub audit_dir: Option<PathBuf>,
    /// Pending state updates kept per WebSocket subscriber before it starts lagging.
    #[cfg_attr(feature = "server", ts(type = "number"))]
    pub snapshot_buffer: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            device_set: DeviceSet::Home,
            bind_addr: "127.0.0.1:8000".to_string(),
            log_filter: "info".to_string(),
            audit_dir: None,
            snapshot_buffer: 64,
        }
    }
}

/// Load settings from `path`. A missing file yields defaults; a malformed one is an error.
pub fn load_settings(path: &Path) -> Result<AppSettings, AppError> {
    if !path.exists() {
        return Ok(AppSettings::default());
    }
    let data = fs::read_to_string(path)?;
    let settings: AppSettings = serde_json::from_str(&data)?;
    if settings.version > SETTINGS_VERSION {
        return Err(AppError::Settings {
            message: format!(
                "{} was written by a newer version (settings version {})",
                path.display(),
                settings.version
            ),
        });
    }
    Ok(settings)
}

/// Save settings as pretty JSON (atomic write).
pub fn save_settings(path: &Path, settings: &AppSettings) -> Result<(), AppError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    atomic_write(path, json.as_bytes())
}

/// Write to `<file>.tmp`, fsync, keep the previous file as `<file>.bak`, then rename.
fn atomic_write(path: &Path, data: &[u8]) -> Result<(), AppError> {
    let file_name = path.file_name().unwrap_or_default();

    let mut tmp_name = OsString::from(file_name);
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(&tmp_name);

    let mut bak_name = OsString::from(file_name);
    bak_name.push(".bak");
    let bak_path = path.with_file_name(&bak_name);

    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    // Backup is best-effort
    if path.exists() {
        let _ = fs::rename(path, &bak_path);
    }

    fs::rename(&tmp_path, path)?;
    Ok(())
}
