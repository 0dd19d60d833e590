//! Startup orchestration.
//!
//! # Responsibilities
//! - Connect the configured document store
//! - Build the HTTP server around it
//! - Bind the listener last
//!
//! Configuration loading, validation and logging setup happen in the
//! binary before [`prepare`] runs.

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::http::server::InvalidHeaderValue;
use crate::http::HttpServer;
use crate::store::{self, StoreError};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("failed to connect document store: {0}")]
    Store(#[from] StoreError),

    #[error("invalid CORS origin: {0}")]
    Cors(#[from] InvalidHeaderValue),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// A server ready to run on its bound listener.
pub struct Prepared {
    pub listener: TcpListener,
    pub server: HttpServer,
}

pub async fn prepare(config: AppConfig) -> Result<Prepared, StartupError> {
    let store = store::connect(&config.store).await?;

    let address = config.listener.bind_address.clone();
    let server = HttpServer::new(config, store)?;
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    Ok(Prepared { listener, server })
}
