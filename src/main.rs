use anyhow::Result;
use clap::Parser;
use skelcast::{
    ConnectionRegistry, Orchestrator, SimulatedSensor, SkelcastConfig, StreamServerBuilder,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "skelcast")]
#[command(about = "Skeletal-tracking sensor bridge broadcasting joint updates over WebSockets")]
#[command(version)]
#[command(long_about = "Bridges a skeletal-tracking sensor feed to live WebSocket clients. \
As the sensor detects people, calibrates them, and streams per-frame joint positions, every \
connected client receives structured JSON updates; dead clients are pruned without stalling \
the sensor loop.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "skelcast.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit without starting the service")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        print_default_config()?;
        return Ok(());
    }

    init_logging(&args);

    info!("Starting skelcast v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    let config = match SkelcastConfig::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if args.validate_config {
        match config.validate() {
            Ok(()) => {
                println!("✓ Configuration is valid");
                return Ok(());
            }
            Err(e) => {
                eprintln!("✗ Configuration validation failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    config.validate()?;

    let registry = Arc::new(ConnectionRegistry::new());

    let server = StreamServerBuilder::new()
        .config(config.stream.clone())
        .registry(Arc::clone(&registry))
        .build()?;

    let server_task = tokio::spawn(async move { server.start().await });

    let frame_interval = Duration::from_micros(1_000_000u64 / config.sensor.frame_rate.max(1) as u64);
    let sensor = SimulatedSensor::new(frame_interval);
    let mut orchestrator = Orchestrator::new(&config, sensor, registry);

    tokio::select! {
        result = orchestrator.run() => {
            // The sensor loop only returns on failure, which is fatal.
            if let Err(e) = result {
                error!("Sensor loop failed: {}", e);
                return Err(e.into());
            }
        }
        result = server_task => {
            match result {
                Ok(Err(e)) => {
                    error!("Stream server failed: {}", e);
                    return Err(e.into());
                }
                Ok(Ok(())) => {}
                Err(e) => {
                    error!("Stream server task panicked: {}", e);
                    return Err(e.into());
                }
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupt received, shutting down");
        }
    }

    Ok(())
}

fn init_logging(args: &Args) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("skelcast={}", log_level)));

    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(args.debug)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer().with_target(true).boxed()
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();
}

/// Print default configuration in TOML format
fn print_default_config() -> Result<()> {
    println!("# Skelcast configuration file");
    println!("# Default values for all available options");
    println!();
    println!("{}", toml::to_string_pretty(&SkelcastConfig::default())?);
    Ok(())
}
