//! # PowerTune CLI
//!
//! Runs calculator requests from the terminal. Request bodies are the same
//! JSON documents the request layer accepts; responses are printed to stdout.
//!
//! ```text
//! echo '{"unit_system":"metric","inputs":{"bore":58,"stroke":50,"cylinders":4}}' \
//!     | calc_cli calc displacement --key "$PTP_INTERNAL_KEY"
//!
//! calc_cli catalog --vehicle LightTruck
//! ```
//!
//! Configuration comes from the environment (a `.env` file is honored):
//! `PTP_INTERNAL_KEY` and optionally `PTP_TIRES_CATALOG`.

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{debug, error, Level};

use calc_core::api::handle;
use calc_core::config::EngineConfig;
use calc_core::fitment::{catalog_key, FitmentCatalog, VehicleType};
use calc_core::security::Credentials;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "calc_cli", version, about = "Engine geometry and drivetrain calculators")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). Logs go to stderr.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one calculator request (displacement, rl, sprocket, tires, health).
    Calc {
        /// Calculator name
        calculator: String,

        /// Read the request body from a file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Internal key to present; defaults to the configured key
        #[arg(short, long)]
        key: Option<String>,

        /// Print compact JSON instead of pretty JSON
        #[arg(long)]
        compact: bool,
    },
    /// List the rims, widths and flotation sizes in the fitment catalog.
    Catalog {
        /// Only show one vehicle type (Car, Motorcycle, LightTruck, ...)
        #[arg(long)]
        vehicle: Option<String>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .compact()
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to init logging. {}", e);
    }
}

fn read_body(file: Option<&PathBuf>) -> io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut body = String::new();
            io::stdin().read_to_string(&mut body)?;
            Ok(body)
        }
    }
}

fn run_calc(
    config: &EngineConfig,
    calculator: &str,
    file: Option<&PathBuf>,
    key: Option<String>,
    compact: bool,
) -> ExitCode {
    let body = if calculator == calc_core::api::HEALTH_ROUTE {
        String::new()
    } else {
        match read_body(file) {
            Ok(body) => body,
            Err(e) => {
                error!(error = %e, "failed to read request body");
                eprintln!("Error: could not read request body: {}", e);
                return ExitCode::FAILURE;
            }
        }
    };

    let credentials = key
        .or_else(|| config.internal_key.clone())
        .map(Credentials::internal_key)
        .unwrap_or_default();

    let response = handle(calculator, &body, &credentials, config);
    debug!(status = response.status, "response ready");

    let printed = if compact {
        serde_json::to_string(&response.body)
    } else {
        serde_json::to_string_pretty(&response.body)
    };
    match printed {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: could not encode response: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if response.is_success() {
        ExitCode::SUCCESS
    } else {
        eprintln!("Request failed with status {}", response.status);
        ExitCode::FAILURE
    }
}

fn print_vehicle(catalog: &FitmentCatalog, vehicle: VehicleType) {
    println!("{}", vehicle);
    for rim in catalog.rims(vehicle) {
        let Some(widths) = catalog.rim(vehicle, rim) else {
            continue;
        };
        println!("  {}\" rim", catalog_key(rim));
        for width in catalog.widths(vehicle, rim) {
            let Some(fitment) = widths.get(&catalog_key(width)) else {
                continue;
            };
            let aspects: Vec<String> = fitment.aspects.iter().map(|a| catalog_key(*a)).collect();
            print!("    {} mm: aspects {}", catalog_key(width), aspects.join(", "));
            if !fitment.flotation.is_empty() {
                print!("; flotation {}", fitment.flotation.join(", "));
            }
            println!();
        }
    }
}

fn run_catalog(config: &EngineConfig, vehicle: Option<&str>) -> ExitCode {
    match vehicle {
        Some(name) => match name.parse::<VehicleType>() {
            Ok(vehicle) => print_vehicle(&config.catalog, vehicle),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => {
            for vehicle in config.catalog.vehicles() {
                print_vehicle(&config.catalog, vehicle);
            }
        }
    }
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Calc {
            calculator,
            file,
            key,
            compact,
        } => run_calc(&config, &calculator, file.as_ref(), key, compact),
        Command::Catalog { vehicle } => run_catalog(&config, vehicle.as_deref()),
    }
}
