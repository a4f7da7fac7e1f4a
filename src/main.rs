#![cfg_attr(not(test), deny(clippy::panic))]

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use sunny_says_server::auth::JwtVerifier;
use sunny_says_server::config;
use sunny_says_server::logging;
use sunny_says_server::server::{ServerConfig, SunnySaysServer};
use sunny_says_server::websocket;

/// Sunny Says -- real-time matchmaking and round engine for the two-player minigame
#[derive(Parser, Debug)]
#[command(name = "sunny-says-server")]
#[command(about = "In-memory WebSocket matchmaking and round engine for Sunny Says")]
#[command(version)]
struct Cli {
    /// Validate configuration and exit without starting the server.
    #[arg(long, short = 'c', conflicts_with = "print_config")]
    validate_config: bool,

    /// Print the merged configuration (secret redacted) as JSON and exit.
    #[arg(long, conflicts_with = "validate_config")]
    print_config: bool,
}

fn redacted_config_json(cfg: &config::Config) -> anyhow::Result<String> {
    let mut value = serde_json::to_value(cfg)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {e}"))?;
    if let Some(secret) = value.pointer_mut("/security/jwt_secret") {
        *secret = serde_json::Value::String("<redacted>".to_string());
    }
    Ok(serde_json::to_string_pretty(&value)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::load();

    if cli.print_config {
        println!("{}", redacted_config_json(&cfg)?);
        return Ok(());
    }

    // load() only reports validation problems; here they decide the exit code.
    let validation_result = config::validate_config(&cfg);

    if cli.validate_config {
        match validation_result {
            Ok(()) => {
                println!("Configuration validation passed");
                println!();
                println!("Configuration summary:");
                println!("  Listen: {}:{}", cfg.server.host, cfg.server.port);
                println!("  CORS origins: {}", cfg.server.cors_origins);
                println!("  Waiting timeout: {}s", cfg.matchmaking.waiting_timeout_secs);
                println!(
                    "  Room cleanup: every {}s, stale after {}s",
                    cfg.matchmaking.cleanup_interval_secs, cfg.matchmaking.stale_room_secs
                );
                println!("  Production mode: {}", config::is_production_mode());
                return Ok(());
            }
            Err(e) => {
                eprintln!("Configuration validation failed:\n{e}");
                std::process::exit(1);
            }
        }
    }

    validation_result?;

    let _log_guard = logging::init_with_config(&cfg.logging);

    let ip: std::net::IpAddr = cfg
        .server
        .host
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid server.host '{}': {e}", cfg.server.host))?;
    let addr = SocketAddr::new(ip, cfg.server.port);

    let verifier = Arc::new(JwtVerifier::new(&cfg.security.jwt_secret));
    let game_server = SunnySaysServer::new(ServerConfig::from(&cfg), verifier);

    let cleanup = game_server.spawn_cleanup_task();

    let app = websocket::create_router(&cfg.server.cors_origins).with_state(game_server);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        cors_origins = %cfg.server.cors_origins,
        "Sunny Says server started - WebSocket: /ws, health: /health"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cleanup.abort();
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
