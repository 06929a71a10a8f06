//! OpenQuote API - Main Entry Point

use openquote_api::{build_router, ApiState};
use quote_common::Email;
use quote_core::{ClientRecord, EntityId};
use quote_gateway::GatewayConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("OpenQuote API v{}", env!("CARGO_PKG_VERSION"));

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let base_url = std::env::var("BASE_URL")
        .unwrap_or_else(|_| format!("http://localhost:{port}"));

    let state = ApiState::in_memory(
        base_url,
        GatewayConfig {
            operator_domains: vec!["openquote.cl".into()],
            ..GatewayConfig::default()
        },
    );
    seed_demo_client(&state)?;

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Until a real registry is attached, expose one demo client so the
/// gateway has something to admit.
fn seed_demo_client(state: &ApiState) -> Result<(), quote_common::EmailError> {
    let client = ClientRecord {
        id: EntityId::from_string("demo-client"),
        legal_name: "ClientCo SpA".into(),
        tax_id: "76.123.456-7".into(),
        contact_emails: vec![Email::parse("buyer@clientco.com")?],
        active: true,
    };
    tracing::info!(client = %client.id, "seeded demo client");
    state.registry.upsert(client);
    Ok(())
}
