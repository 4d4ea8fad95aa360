//! Example consumer: serves the containers described in a JSON config file.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! Config path comes from `CRITERIA_CONFIG` (default `containers.json`).

use criteria_sdk::{app, load_from_path, resolve, AppState, CriteriaSettings};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    criteria_sdk::init_tracing("example_consumer=info");

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/criteria".into());
    let config_path = std::env::var("CRITERIA_CONFIG").unwrap_or_else(|_| "containers.json".into());

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;
    let model = resolve(&load_from_path(&config_path).await?)?;
    let settings = CriteriaSettings::from_env()?;
    tracing::info!(
        containers = model.containers.len(),
        hash_id = settings.hash_id,
        "criteria config loaded"
    );
    let state = AppState::new(pool, model, settings)?;

    let listener = TcpListener::bind("127.0.0.1:3000").await?;
    let port = listener.local_addr()?.port();
    tracing::info!("Example consumer listening on http://127.0.0.1:{}", port);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
