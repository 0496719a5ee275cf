//! Shared `PostgreSQL` plumbing for the Diesel adapters.
//!
//! Diesel connections are synchronous, so every adapter offloads its work to
//! the blocking thread pool through [`run_blocking_with`] and checks out
//! connections through [`get_conn_with`], mapping failures into its own error
//! type.

use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError, PooledConnection};
use thiserror::Error;

use crate::config::MessagingConfig;

/// `PostgreSQL` connection pool type.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Pooled connection type for adapter internals.
pub(crate) type PooledConn = PooledConnection<ConnectionManager<PgConnection>>;

/// Errors raised while building a connection pool.
#[derive(Debug, Error)]
pub enum PoolSetupError {
    /// No database URL was configured.
    #[error("database_url is not configured")]
    MissingDatabaseUrl,

    /// The pool could not be created.
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] PoolError),
}

/// Builds a connection pool from configuration.
///
/// # Errors
///
/// Returns [`PoolSetupError::MissingDatabaseUrl`] when no URL is configured,
/// or [`PoolSetupError::Pool`] when the initial connections cannot be opened.
pub fn connect(config: &MessagingConfig) -> Result<PgPool, PoolSetupError> {
    let url = config
        .database_url
        .as_deref()
        .ok_or(PoolSetupError::MissingDatabaseUrl)?;
    let manager = ConnectionManager::<PgConnection>::new(url);
    let pool = Pool::builder()
        .max_size(config.pool_max_size)
        .build(manager)?;
    tracing::info!(max_size = config.pool_max_size, "database pool ready");
    Ok(pool)
}

/// Runs a blocking task and maps join errors into the caller's error type.
pub(crate) async fn run_blocking_with<F, T, E, M>(f: F, map_err: M) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
    M: FnOnce(tokio::task::JoinError) -> E,
{
    tokio::task::spawn_blocking(f).await.map_err(map_err)?
}

/// Obtains a connection from the pool with a caller-provided error mapper.
pub(crate) fn get_conn_with<E, M>(pool: &PgPool, map_err: M) -> Result<PooledConn, E>
where
    M: FnOnce(PoolError) -> E,
{
    pool.get().map_err(map_err)
}
