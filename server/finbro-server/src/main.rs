use clap::Parser;
use std::net::SocketAddr;
use tracing::{info, Level};
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use error_common::{log_error, FinbroError, Result};
use finbro_server::{create_app, Environment, FinbroServer, ServerConfig};

/// Finbro authentication API server
#[derive(Parser, Debug)]
#[command(name = "finbro-server")]
#[command(about = "Finbro authentication and session HTTP API server")]
struct Args {
    /// Server bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Server port, overrides PORT
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is normal outside development
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let mut config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(args.verbose, Environment::current());
            log_error("configuration", &e);
            return Err(e);
        }
    };
    if let Some(port) = args.port {
        config.port = port;
    }

    init_tracing(args.verbose, config.environment);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = config.environment.as_str(),
        "Starting Finbro server"
    );

    let host = args.host.clone();
    let port = config.port;
    let server = FinbroServer::new(config)
        .await
        .inspect_err(|e| log_error("startup", e))?;
    let app = create_app(server);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| FinbroError::ConfigError(format!("Invalid bind address {host}:{port}: {e}")))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| FinbroError::NetworkError(format!("Failed to bind to {addr}: {e}")))?;

    info!(%addr, "Finbro server listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| FinbroError::ServerError(format!("HTTP server error: {e}")))?;

    Ok(())
}

fn init_tracing(verbose: bool, environment: Environment) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "finbro_server={level},auth_gateway={level},auth_identity={level},\
             auth_oauth={level},tower_http=info,sqlx=warn"
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    match environment {
        Environment::Development => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .pretty(),
            )
            .init(),
        Environment::Production => registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .json(),
            )
            .init(),
    }
}
