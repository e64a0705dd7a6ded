//! # Stripe B2B Payments API
//!
//! HTTP façade over Stripe payments, refunds, subscriptions and Connect.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_PUBLISHABLE_KEY=pk_test_...
//!
//! # Optional: JSON logs
//! export LOG_FORMAT=json
//!
//! # Run the server
//! b2b-payments
//! ```

use pay_api::{routes, AppConfig, AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (and .env)
    let config = AppConfig::from_env();

    init_tracing(config.debug);

    // Print banner
    print_banner(&config.app_name);

    // Initialize application state
    let state = AppState::new(config)?;

    let addr = state.config.socket_addr()?;
    let debug = state.config.debug;

    info!("Stripe configured: {}", state.stripe_configured);
    info!("OAuth redirect: {}", state.config.oauth_redirect_uri);

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("Starting on http://{}", addr);

    if debug {
        info!("Health: http://{}/health", addr);
        info!("Payments: POST http://{}/api/v1/payments/create", addr);
        info!("Connect: GET http://{}/api/v1/connect/oauth", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(debug: bool) {
    let default_level = if debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let json = std::env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }
}

fn print_banner(app_name: &str) {
    println!(
        r#"
  {}
  ━━━━━━━━━━━━━━━━━━━━━━━
  Version: {}

"#,
        app_name,
        env!("CARGO_PKG_VERSION")
    );
}
