use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use home_command::api::{self, ApiState};
use home_command::settings::{self, AppSettings, SETTINGS_FILE};
use home_command::DeviceSet;

#[derive(Parser)]
#[command(name = "home-command-server", about = "HTTP/WebSocket front for the home command engine", version)]
struct Args {
    /// Settings file (missing file = defaults)
    #[arg(long, default_value = SETTINGS_FILE)]
    settings: PathBuf,

    /// Capability catalog to serve
    #[arg(long, value_enum)]
    device_set: Option<DeviceSet>,

    /// Listen address, e.g. 0.0.0.0:8000
    #[arg(long)]
    bind: Option<String>,

    /// Write a JSONL audit log here
    #[arg(long)]
    audit_dir: Option<PathBuf>,
}

impl Args {
    fn apply(self, mut settings: AppSettings) -> AppSettings {
        if let Some(device_set) = self.device_set {
            settings.device_set = device_set;
        }
        if let Some(bind) = self.bind {
            settings.bind_addr = bind;
        }
        if self.audit_dir.is_some() {
            settings.audit_dir = self.audit_dir;
        }
        settings
    }
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let loaded = match settings::load_settings(&args.settings) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("[home-command] {e}");
            process::exit(1);
        }
    };
    let settings = args.apply(loaded);
    init_tracing(&settings.log_filter);

    let addr: SocketAddr = match settings.bind_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(bind_addr = %settings.bind_addr, "invalid bind address: {e}");
            process::exit(1);
        }
    };

    tracing::info!(device_set = %settings.device_set, "starting");
    let state = ApiState::new(
        settings.device_set.engine(),
        settings.snapshot_buffer,
        settings.audit_dir.clone(),
    );

    if let Err(e) = api::serve(addr, state).await {
        tracing::error!("api server error: {e}");
        process::exit(1);
    }
}
