// CLI binary: panicking on unrecoverable input errors is fine here.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Read;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use home_command::audit;
use home_command::describe::context_block;
use home_command::settings::{self, SETTINGS_FILE};
use home_command::{CommandEngine, DeviceSet, DispatchResult};

// ── CLI argument parsing ─────────────────────────────────────────

#[derive(Parser)]
#[command(name = "home-command-cli", about = "Headless home command engine", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (missing file = defaults)
    #[arg(long, global = true, default_value = SETTINGS_FILE)]
    settings: PathBuf,

    /// Capability catalog override
    #[arg(long, global = true, value_enum)]
    device_set: Option<DeviceSet>,

    /// Output raw JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interpret raw model output and apply it. Reads stdin when OUTPUT is omitted.
    Interpret {
        output: Option<String>,
        /// Only extract and validate; leave the state alone
        #[arg(long)]
        dry_run: bool,
    },
    /// Run one operation directly, e.g. `exec tv_set_volume '{"volume": 40}'`
    Exec {
        name: String,
        /// JSON object of parameters
        #[arg(default_value = "{}")]
        params: String,
    },
    /// List the operations the model may call
    Tools {
        /// Print the function-calling schemas instead of the summary
        #[arg(long)]
        schemas: bool,
        /// Print the full catalog, hidden operations included
        #[arg(long, conflicts_with = "schemas")]
        all: bool,
    },
    /// Print the default state and its context lines
    State,
}

// ── Output ───────────────────────────────────────────────────────

fn print_json<T: Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

fn print_result(result: &DispatchResult) {
    let mark = if result.success { "ok" } else { "failed" };
    println!("[{mark}] {}: {}", result.operation, result.message);
}

fn read_output(arg: Option<String>) -> String {
    match arg {
        Some(text) => text,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .expect("failed to read stdin");
            text
        }
    }
}

fn run(engine: &mut dyn CommandEngine, command: Commands, raw: bool, audit_dir: Option<&PathBuf>) {
    match command {
        Commands::Interpret { output, dry_run } => {
            let output = read_output(output);
            if dry_run {
                let interpretation = engine.interpret(&output);
                if raw {
                    print_json(&interpretation);
                    return;
                }
                for call in &interpretation.calls {
                    println!("{}", **call);
                }
                for rejection in &interpretation.rejected {
                    println!("rejected {}: {}", rejection.call, rejection.reason);
                }
                return;
            }

            let outcome = engine.handle(&output);
            if let Some(dir) = audit_dir {
                audit::log_outcome(dir, engine.device_set(), &outcome);
            }
            if raw {
                print_json(&outcome);
            } else if outcome.results.is_empty() {
                println!("No actionable command.");
            } else {
                outcome.results.iter().for_each(print_result);
                println!("{}", context_block(&engine.describe()));
            }
            if !outcome.success {
                process::exit(2);
            }
        }
        Commands::Exec { name, params } => {
            let params: Value = serde_json::from_str(&params).unwrap_or_else(|e| {
                eprintln!("Error: params must be JSON: {e}");
                process::exit(1);
            });
            let result = engine.execute(&name, &params);
            if raw {
                print_json(&result);
            } else {
                print_result(&result);
            }
            if !result.success {
                process::exit(1);
            }
        }
        Commands::Tools { schemas, all } => {
            if all {
                print_json(&engine.catalog().to_json_schema());
            } else if schemas || raw {
                print_json(&engine.catalog().to_tool_schemas());
            } else {
                println!("{}", engine.catalog().help_text());
            }
        }
        Commands::State => {
            if raw {
                print_json(&engine.snapshot());
            } else {
                println!("{}", context_block(&engine.describe()));
            }
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let mut settings = settings::load_settings(&cli.settings).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });
    if let Some(device_set) = cli.device_set {
        settings.device_set = device_set;
    }

    // Logs go to stderr so --json output stays clean.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut engine = settings.device_set.engine();
    run(engine.as_mut(), cli.command, cli.json, settings.audit_dir.as_ref());
}
