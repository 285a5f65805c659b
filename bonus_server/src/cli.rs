use std::{env, env::VarError};

use clap::Parser;

/// Command-line flags. Each one has an environment variable counterpart, and the environment variable wins when both
/// are set.
#[derive(Parser, Debug, Clone, Default)]
#[command(version, about = "Loyalty points server", after_help = include_str!("./cli-help.txt"))]
pub struct Arguments {
    /// The address to listen on, e.g. localhost:8080 [RUN_ADDRESS]
    #[arg(short = 'a', long)]
    pub run_address: Option<String>,
    /// The database connection string [DATABASE_URI]
    #[arg(short = 'd', long)]
    pub database_uri: Option<String>,
    /// Hex-encoded key for signing access tokens [KEY]
    #[arg(short = 'k', long)]
    pub key: Option<String>,
    /// The base address of the accrual service [ACCRUAL_SYSTEM_ADDRESS]
    #[arg(short = 'r', long)]
    pub accrual_address: Option<String>,
    /// Print the current (non-secret) environment configuration and exit
    #[arg(long)]
    pub print_env: bool,
}

/// Parses the command line. Returns `None` if the process should exit without starting the server.
pub fn handle_command_line_args() -> Option<Arguments> {
    let args = Arguments::parse();
    if args.print_env {
        display_envs();
        return None;
    }
    Some(args)
}

fn display_envs() {
    // Be explicit about which envars to print, so as to avoid accidentally exposing secrets
    const DISPLAY_ENVS: [&str; 7] = [
        "RUST_LOG",
        "RUN_ADDRESS",
        "DATABASE_URI",
        "DATABASE_MAX_CONNECTIONS",
        "ACCRUAL_SYSTEM_ADDRESS",
        "ACCRUAL_POLL_INTERVAL_MS",
        "ACCRUAL_REQUEST_TIMEOUT_MS",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
