//! Venue Flood Watch - Main Daemon
//!
//! A server-side daemon that continuously:
//! 1. Polls USGS gage height for the configured stations
//! 2. Classifies each station's risk against its 30-day median
//! 3. Notifies venue subscribers when their nearest station is elevated
//! 4. Serves station, venue and subscription data over HTTP
//!
//! Usage:
//!   cargo run --release                                 # scheduler only
//!   cargo run --release -- --endpoint 5000              # with HTTP endpoint
//!   cargo run --release -- --config other.toml
//!
//! Environment (also read from .env):
//!   FLOWATCH_CONFIG - configuration file (default: flowatch.toml)
//!   FLOWATCH_PORT   - HTTP endpoint port
//!   FLOWATCH_LOG    - minimum log level: debug|info|warn|error (default: info)
//!   FLOWATCH_LOG_FILE - optional append-only log file

use flowatch_service::alert::notify::LogNotifier;
use flowatch_service::config::{self, DEFAULT_CONFIG_PATH};
use flowatch_service::endpoint;
use flowatch_service::ingest::usgs::UsgsClient;
use flowatch_service::logging::{self, Component, LogLevel};
use flowatch_service::service::FloodWatch;
use std::env;
use std::error::Error;
use std::sync::Arc;
use std::sync::mpsc;

struct Args {
    config_path: String,
    endpoint_port: Option<u16>,
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().collect();
    let mut config_path = env::var("FLOWATCH_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut endpoint_port = env::var("FLOWATCH_PORT").ok().and_then(|p| p.parse().ok());

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--endpoint" => {
                let port = args.get(i + 1).ok_or("--endpoint requires a port number")?;
                endpoint_port = Some(port.parse().map_err(|_| format!("invalid port: {}", port))?);
                i += 2;
            }
            "--config" => {
                config_path = args.get(i + 1).ok_or("--config requires a path")?.clone();
                i += 2;
            }
            other => {
                return Err(format!(
                    "Unknown argument: {}\nUsage: {} [--config PATH] [--endpoint PORT]",
                    other, args[0]
                ));
            }
        }
    }

    Ok(Args {
        config_path,
        endpoint_port,
    })
}

fn main() {
    dotenv::dotenv().ok();

    println!("🌊 Venue Flood Watch");
    println!("====================\n");

    if let Err(e) = run() {
        eprintln!("\n❌ {}\n", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = parse_args()?;

    let level = env::var("FLOWATCH_LOG")
        .ok()
        .and_then(|l| LogLevel::parse(&l))
        .unwrap_or(LogLevel::Info);
    let log_file = env::var("FLOWATCH_LOG_FILE").ok();
    logging::init_logger(level, log_file.as_deref(), true);

    println!("📋 Loading configuration from {}...", args.config_path);
    let config = config::load_config(&args.config_path)?;
    println!(
        "✓ {} stations, {} venues\n",
        config.stations.len(),
        config.venues.len()
    );
    logging::info(
        Component::System,
        None,
        &format!(
            "{} {} started with {}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            args.config_path
        ),
    );

    let source = UsgsClient::from_config(&config.monitor)?;
    let service = FloodWatch::new(config, Arc::new(source))?;

    // Start HTTP endpoint if requested (in background thread)
    if let Some(port) = args.endpoint_port {
        println!("🚀 Starting HTTP endpoint server...");
        let endpoint_service = service.clone();
        std::thread::spawn(move || {
            if let Err(e) = endpoint::start_endpoint_server(port, endpoint_service) {
                eprintln!("❌ Endpoint server error: {}", e);
            }
        });
        println!("   Endpoint running on http://0.0.0.0:{}\n", port);
    }

    println!("🔄 Starting notification scheduler...");
    println!("   Refresh period: {}s", service.config().monitor.refresh_period_secs);
    println!("   Press Ctrl+C to stop\n");

    // Held for the life of the process; dropping it would stop the scheduler.
    let (_shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
    let scheduler = service.scheduler(Arc::new(LogNotifier));
    let cycles = scheduler.run(&shutdown_rx);
    logging::info(Component::System, None, &format!("Shutting down after {} cycles", cycles));

    Ok(())
}
