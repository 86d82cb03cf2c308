//! lotkeeper server binary.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use lotkeeper::transport::{ServerConfig, serve};
use lotkeeper::{LOTKEEPER_VERSION, LotService, VersionInfo};

/// Parking lot slot allocation service
#[derive(Parser, Debug)]
#[command(name = "lotkeeper", version = LOTKEEPER_VERSION)]
struct Cli {
    /// Address to bind
    #[arg(long, env = "LOTKEEPER_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on [default: $PORT, else 3000]
    #[arg(long, env = "LOTKEEPER_PORT")]
    port: Option<u16>,

    /// Ignore SIGTERM; stop only on SIGINT or POST /shutdown
    #[arg(long, env = "LOTKEEPER_AWAIT_EXPLICIT_SHUTDOWN")]
    await_explicit_shutdown: bool,

    /// Build identifier reported by /health-check
    #[arg(long, env = "LOTKEEPER_BUILD")]
    build: Option<String>,
}

impl Cli {
    /// `fallback_port` is the raw `PORT` variable, used when neither
    /// `--port` nor `LOTKEEPER_PORT` is given.
    fn server_config(&self, fallback_port: Option<&str>) -> anyhow::Result<ServerConfig> {
        let port = match (self.port, fallback_port) {
            (Some(port), _) => port,
            (None, Some(raw)) => raw
                .trim()
                .parse()
                .with_context(|| format!("invalid PORT value {raw:?}"))?,
            (None, None) => ServerConfig::default().port,
        };
        Ok(ServerConfig {
            host: self.host.clone(),
            port,
            await_explicit_shutdown: self.await_explicit_shutdown,
        })
    }
}

/// Initialize tracing with LOTKEEPER_LOG and LOG_FORMAT support.
fn init_tracing() {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let base_level = match std::env::var("LOTKEEPER_LOG").as_deref() {
            Ok("debug") => "debug",
            Ok("warn") | Ok("warning") => "warn",
            Ok("error") => "error",
            _ => "info",
        };

        EnvFilter::new(format!(
            "lotkeeper={level},lotkeeper_server={level}",
            level = base_level
        ))
    };

    let use_json = std::env::var("LOG_FORMAT").as_deref() == Ok("json");

    if use_json {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr));
        let _ = subscriber.try_init();
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr));
        let _ = subscriber.try_init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    info!("lotkeeper {}", LOTKEEPER_VERSION);

    let mut version = VersionInfo::new();
    if let Some(build) = cli.build.clone() {
        version = version.with_build(build);
    }

    let service = Arc::new(LotService::new().with_version(version));
    let config = cli.server_config(std::env::var("PORT").ok().as_deref())?;
    serve(config, service).await
}
