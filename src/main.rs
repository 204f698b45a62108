#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
// easier to use when using the functions as callback of foreign functions
#![allow(clippy::needless_pass_by_value)]

use std::net::SocketAddr;

use anyhow::Result;
use axum::Router;
use axum::http::Uri;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::prelude::*;

use crate::api::AppState;
use crate::api::router;
use crate::session::JwtKeys;
use crate::storage::Config as StorageConfig;
use crate::storage::Memory;
use crate::storage::Postgres;
use crate::storage::Storage;
use crate::utils::env_var;
use crate::utils::env_var_or_else;

mod api;
mod editor;
mod error;
mod folders;
mod graceful_shutdown;
mod notes;
mod password;
mod repository;
mod session;
mod storage;
mod tags;
#[cfg(test)]
mod tests;
mod users;
mod utils;
mod views;

const DEFAULT_RUST_LOG: &str = "notekeeper=debug,tower_http=debug";
const DEFAULT_ADDRESS: &str = "0.0.0.0:6000";

#[tokio::main]
async fn main() -> Result<()> {
    setup_environment();
    setup_tracing();

    let app = setup_app(StorageConfig::DetectConfig).await?;

    let address = setup_address()?;
    tracing::info!("Listening on {}", address);

    let listener = TcpListener::bind(address).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(graceful_shutdown::handler())
        .await?;

    Ok(())
}

/// Create and setup the app with its dependencies
///
/// # Errors
///
/// Will return `Err` if the database connection or its migrations fail
pub async fn setup_app(config: StorageConfig) -> Result<Router> {
    let jwt_keys = setup_jwt_keys();

    let router = match config {
        StorageConfig::DetectConfig => {
            if let Some(database_url) = env_var("DATABASE_URL") {
                tracing::info!("Using Postgres storage");

                create_router(Postgres::connect(&database_url).await?, jwt_keys)
            } else {
                tracing::warn!("`DATABASE_URL` is not set, notes are kept in memory only");

                create_router(Memory::new(), jwt_keys)
            }
        }
        StorageConfig::Memory => create_router(Memory::new(), jwt_keys),
    };

    Ok(router)
}

/// Create the router for Notekeeper
fn create_router<S: Storage>(storage: S, jwt_keys: JwtKeys) -> Router {
    Router::new()
        .nest("/api", router::<S>())
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(storage, jwt_keys))
}

/// Anything outside the API
async fn not_found(uri: Uri) -> api::Error {
    tracing::debug!("No route for {uri}");

    api::Error::not_found("Not found")
}

fn setup_environment() {
    dotenvy::dotenv().ok();
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::registry;

    registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_RUST_LOG.into()),
        ))
        .with(fmt::layer())
        .init();
}

fn setup_jwt_keys() -> JwtKeys {
    use crate::password::generate;

    let jwt_secret = env_var_or_else("JWT_SECRET", || {
        let jwt_secret = generate();
        tracing::info!("`JWT_SECRET` is not set, generating temporary one: {jwt_secret}");
        jwt_secret
    });

    JwtKeys::new(jwt_secret.as_bytes())
}

fn setup_address() -> Result<SocketAddr> {
    let mut address =
        env_var_or_else("ADDRESS", || String::from(DEFAULT_ADDRESS)).parse::<SocketAddr>()?;

    // optional override of just the port
    if let Some(port) = env_var("PORT") {
        let port = port.parse::<u16>()?;

        address.set_port(port);
    }

    Ok(address)
}
