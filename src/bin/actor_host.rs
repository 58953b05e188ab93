//! Actor Host entry point.
//!
//! Usage: `actor-host <config_path> <instance_id>` (spec §6).

use std::path::PathBuf;
use std::process::ExitCode;

use actor_host::host::Host;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <config_path> <instance_id>", args.first().map(String::as_str).unwrap_or("actor-host"));
        return ExitCode::FAILURE;
    }

    let config_path = PathBuf::from(&args[1]);
    let instance_id: u32 = match args[2].parse() {
        Ok(id) => id,
        Err(_) => {
            eprintln!("invalid instance_id: {}", args[2]);
            return ExitCode::FAILURE;
        }
    };

    actor_host::logging::init(instance_id);

    let host = match Host::from_config_file(&config_path, instance_id) {
        Ok(host) => host,
        Err(err) => {
            error!(error = %err, "fatal: failed to start actor host");
            return ExitCode::FAILURE;
        }
    };

    match host.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "actor host exited with an error");
            ExitCode::FAILURE
        }
    }
}
