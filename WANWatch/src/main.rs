use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use wanconfig::Config;
use wancontrol::{
    Pipeline, PipelineSettings, RunOutcome, TunnelBrokerConfig, TunnelBrokerNotifier,
};
use wanupnp::ssdp::SsdpListener;

/// Reports the WAN address of the local UPnP gateway to Tunnelbroker.net
/// whenever it changes.
#[derive(Parser, Debug)]
#[command(name = "wanwatch", version, about)]
struct Args {
    /// Configuration directory (default: $WANWATCH_CONFIG, ./.wanwatch, ~/.wanwatch)
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// How long to wait for a gateway to answer discovery
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Tunnelbroker user id
    #[arg(long, env = "WANWATCH_USER_ID")]
    user_id: Option<String>,

    /// Tunnelbroker update key or password
    #[arg(long, env = "WANWATCH_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Tunnelbroker tunnel id
    #[arg(long, env = "WANWATCH_TUNNEL_ID")]
    tunnel_id: Option<String>,

    /// Report the WAN IP without updating the tunnel or the cache
    #[arg(long)]
    noop: bool,

    /// File remembering the last reported IP
    #[arg(long, value_name = "FILE")]
    cache_file: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Logging is not up yet: configuration errors go to stderr.
    let config = match Config::load_config(args.config_dir.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.get_log_min_level());
    init_logging(&level);

    match run(&args, &config) {
        Ok(outcome) => {
            match &outcome {
                RunOutcome::Unchanged(ip) => info!("✅ WAN IP {} unchanged, nothing to do", ip),
                RunOutcome::DryRun(ip) => info!("✅ WAN IP is {} (no-op, tunnel not updated)", ip),
                RunOutcome::Updated(ip) => info!("✅ Tunnel updated to {}", ip),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins over `default_level`.
fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(args: &Args, config: &Config) -> Result<RunOutcome> {
    let noop = args.noop || config.get_noop();

    let tunnel = TunnelBrokerConfig {
        endpoint: config.get_tunnelbroker_endpoint(),
        username: flag_or(&args.user_id, || config.get_tunnelbroker_username()),
        password: flag_or(&args.password, || config.get_tunnelbroker_password()),
        tunnel_id: flag_or(&args.tunnel_id, || config.get_tunnelbroker_tunnel_id()),
    };

    if noop {
        info!("🧪 No-op mode: the tunnel will not be updated");
    } else {
        tunnel
            .validate()
            .context("cannot update the tunnel (use --noop to only check the WAN IP)")?;
    }

    let settings = PipelineSettings {
        discovery_timeout: args
            .timeout
            .map(Duration::from_secs)
            .unwrap_or_else(|| config.get_discovery_timeout()),
        http_timeout: config.get_http_timeout(),
        cache_file: args
            .cache_file
            .clone()
            .unwrap_or_else(|| config.get_cache_file()),
        noop,
    };

    if settings.discovery_timeout.is_zero() {
        warn!("⚠️ Discovery timeout is zero, no gateway will have time to answer");
    }

    let listener = match config.get_discovery_bind_address() {
        Some(addr) => SsdpListener::bind(addr),
        None => SsdpListener::new(),
    }
    .context("failed to open the SSDP socket")?;

    let notifier = TunnelBrokerNotifier::new(tunnel, settings.http_timeout);
    let pipeline = Pipeline::new(listener, notifier, settings);

    Ok(pipeline.run()?)
}

/// Non-empty flag value, else the configured one.
fn flag_or(flag: &Option<String>, configured: impl FnOnce() -> String) -> String {
    match flag {
        Some(value) if !value.is_empty() => value.clone(),
        _ => configured(),
    }
}
