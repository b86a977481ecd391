mod app;
mod pages;
mod session;
mod state;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use listenfd::ListenFd;
use loginbridge_auth::{catalog_from_config, codec_from_config, AuthConfig, AuthState};
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{app::create_app, session::SessionGreeting, state::AppState};

/// LoginBridge - Sign in with OpenID Connect providers
#[derive(Parser, Debug)]
#[command(name = "loginbridge")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Host address to bind the server to
    #[arg(long, short = 'H', default_value = "0.0.0.0", env = "HOST")]
    host: String,

    /// Port to listen on
    #[arg(long, short, default_value = "3000", env = "PORT")]
    port: u16,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    /// Port for the mock identity provider
    #[cfg(feature = "mock")]
    #[arg(long, default_value = "3001", env = "MOCK_IDP_PORT")]
    mock_idp_port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "loginbridge=debug,loginbridge_auth=debug,loginbridge_core=debug,tower_http=debug".into()
    });
    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    let config = AuthConfig::from_env()?;
    tracing::debug!(?config, "Loaded auth configuration");

    #[cfg(feature = "mock")]
    spawn_mock_idp(cli.mock_idp_port);

    let catalog = catalog_from_config(&config).await?;
    let codec = codec_from_config(&config)?;
    let handler = SessionGreeting::new(config.base_url.clone(), config.cookie_secure);
    let auth = AuthState::new(
        config,
        Arc::new(catalog),
        Arc::new(codec),
        Arc::new(handler),
    );

    // Build the application router
    let app = create_app(AppState::new(auth));

    // Auto-reload support via listenfd
    let mut listenfd = ListenFd::from_env();
    let listener = match listenfd.take_tcp_listener(0)? {
        // If we are given a tcp listener on listen fd 0, use that one
        Some(listener) => {
            listener.set_nonblocking(true)?;
            TcpListener::from_std(listener)?
        }
        // Otherwise fall back to CLI-specified host:port
        None => {
            let addr = format!("{}:{}", cli.host, cli.port);
            TcpListener::bind(&addr).await?
        }
    };

    tracing::info!("listening on {}", listener.local_addr()?);

    // Run the server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Run the mock IdP next to the app so the mock providers have somewhere to send users.
#[cfg(feature = "mock")]
fn spawn_mock_idp(port: u16) {
    tokio::spawn(async move {
        if let Err(e) = loginbridge_auth::mock_idp::MockIdpServer::new(port).run().await {
            tracing::error!(error = %e, "Mock IdP server stopped");
        }
    });
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
