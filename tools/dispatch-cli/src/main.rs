//! Roadside Dispatch CLI
//!
//! Registers mechanics, files breakdown reports and walks requests through
//! their lifecycle against a local SQLite database. Results are printed as
//! JSON on stdout; logs go to stderr.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use roadside::{
    classify_report, CoordinatePolicy, DispatchConfig, Dispatcher, GeoPoint, IssueReport,
    NewMechanic, Skill, Store,
};
use serde::Serialize;
use tracing::info;

/// Default database location
fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("roadside")
        .join("dispatch.db")
}

/// CLI arguments
#[derive(Parser)]
#[command(name = "dispatch")]
#[command(about = "Classify breakdown reports and dispatch the nearest mechanic")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite database path
    #[arg(short, long, env = "ROADSIDE_DB", global = true)]
    db: Option<PathBuf>,

    /// How out-of-range coordinates are handled (reject, clamp, pass-through)
    #[arg(
        short,
        long,
        env = "ROADSIDE_COORDINATES",
        default_value = "reject",
        global = true
    )]
    coordinates: CoordinatePolicy,

    /// Match-and-claim rounds before a request is left open
    #[arg(long, env = "ROADSIDE_CLAIM_ATTEMPTS", default_value_t = 3, global = true)]
    claim_attempts: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a description without touching the database
    Classify {
        /// Free-text problem description
        text: String,
        /// Treat the report as an emergency
        #[arg(short, long)]
        emergency: bool,
    },
    /// Manage mechanics
    Mechanic {
        #[command(subcommand)]
        command: MechanicCommand,
    },
    /// Manage service requests
    Request {
        #[command(subcommand)]
        command: RequestCommand,
    },
}

#[derive(Subcommand)]
enum MechanicCommand {
    /// Register a new mechanic
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        phone: String,
        /// battery, tyre, engine or general
        #[arg(long)]
        skill: Skill,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// List all mechanics
    List,
    /// Update a mechanic's position
    Locate {
        id: i64,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Flip a mechanic's availability
    Toggle { id: i64 },
    /// Requests assigned to a mechanic
    Jobs { id: i64 },
}

#[derive(Subcommand)]
enum RequestCommand {
    /// File a breakdown report and dispatch it
    Create {
        #[arg(long)]
        customer: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(short, long)]
        emergency: bool,
        /// Free-text problem description
        #[arg(default_value = "")]
        text: String,
    },
    /// Show a request's status and assigned mechanic
    Status { id: i64 },
    /// Mechanic accepts an assigned request
    Accept {
        id: i64,
        #[arg(short, long)]
        mechanic: i64,
    },
    /// Mechanic rejects an assigned request; it goes back to open
    Reject {
        id: i64,
        #[arg(short, long)]
        mechanic: i64,
    },
    /// Mechanic marks a request as done
    Complete {
        id: i64,
        #[arg(short, long)]
        mechanic: i64,
    },
    /// Cancel a request that is not yet finished
    Cancel { id: i64 },
    /// Retry dispatch for every open request, oldest first
    Retry,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{out}");
    Ok(())
}

fn config_from(cli: &Cli) -> DispatchConfig {
    DispatchConfig::new()
        .with_coordinate_policy(cli.coordinates)
        .with_claim_attempts(cli.claim_attempts)
}

fn open_store(path: &Path) -> Result<Store> {
    Store::open(path).with_context(|| format!("Failed to open database at {}", path.display()))
}

fn run_mechanic(command: MechanicCommand, store: &Store, policy: CoordinatePolicy) -> Result<()> {
    match command {
        MechanicCommand::Add {
            name,
            phone,
            skill,
            lat,
            lon,
        } => {
            let location = policy.apply(lat, lon)?;
            let mechanic = store
                .register_mechanic(
                    &NewMechanic::new(name, skill)
                        .with_phone(phone)
                        .with_location(location),
                )
                .context("Failed to register mechanic")?;
            print_json(&mechanic)
        }
        MechanicCommand::List => print_json(&store.list_mechanics()?),
        MechanicCommand::Locate { id, lat, lon } => {
            let location = policy.apply(lat, lon)?;
            store.update_location(id, location)?;
            print_json(&store.mechanic(id)?)
        }
        MechanicCommand::Toggle { id } => {
            store.toggle_availability(id)?;
            print_json(&store.mechanic(id)?)
        }
        MechanicCommand::Jobs { id } => print_json(&store.requests_for_mechanic(id, None)?),
    }
}

fn run_request(command: RequestCommand, dispatcher: &Dispatcher) -> Result<()> {
    let store = dispatcher.store();
    match command {
        RequestCommand::Create {
            customer,
            lat,
            lon,
            emergency,
            text,
        } => {
            let report =
                IssueReport::new(text, GeoPoint::unchecked(lat, lon)).with_emergency(emergency);
            let receipt = dispatcher
                .submit(&customer, &report)
                .context("Failed to submit request")?;
            print_json(&receipt)
        }
        RequestCommand::Status { id } => print_json(&dispatcher.status(id)?),
        RequestCommand::Accept { id, mechanic } => print_json(&store.accept(id, mechanic)?),
        RequestCommand::Reject { id, mechanic } => print_json(&store.reject(id, mechanic)?),
        RequestCommand::Complete { id, mechanic } => print_json(&store.complete(id, mechanic)?),
        RequestCommand::Cancel { id } => print_json(&store.cancel(id)?),
        RequestCommand::Retry => {
            let receipts = dispatcher.redispatch_open()?;
            info!(
                "Retried {} open requests, {} assigned",
                receipts.len(),
                receipts.iter().filter(|r| r.is_assigned()).count()
            );
            print_json(&receipts)
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = config_from(&cli);
    let db_path = cli.db.clone().unwrap_or_else(default_db_path);

    match cli.command {
        Commands::Classify { text, emergency } => {
            // Location plays no part in classification
            let report = IssueReport::new(text, GeoPoint::default()).with_emergency(emergency);
            print_json(&classify_report(&report))
        }
        Commands::Mechanic { command } => {
            let store = open_store(&db_path)?;
            run_mechanic(command, &store, config.coordinate_policy)
        }
        Commands::Request { command } => {
            let store = open_store(&db_path)?;
            let dispatcher = Dispatcher::new(store, config);
            run_request(command, &dispatcher)
        }
    }
}
