//! Demo server: loads the admin config and serves the admin panel.
//!
//! Run from repo root: `cargo run -p demo-server`

use seamless_admin::{admin_routes, common_routes, load_from_path, resolve, AdminSettings, AdminState};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("seamless_admin=info,tower_http=info")),
        )
        .init();

    let settings = AdminSettings::from_env();
    let config = load_from_path(&settings.config_path).await?;
    let registry = resolve(&config)?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&settings.database_url)
        .await?;

    let bind_addr = settings.bind_addr.clone();
    let prefix = settings.prefix.clone();
    let state = AdminState::new(pool, registry, settings);
    let app = common_routes(state.clone()).merge(admin_routes(state));

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("admin panel listening on http://{}{}", listener.local_addr()?, prefix);
    axum::serve(listener, app).await?;
    Ok(())
}
