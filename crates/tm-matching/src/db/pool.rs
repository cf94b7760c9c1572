use deadpool_postgres::{Config, CreatePoolError, ManagerConfig, Pool, RecyclingMethod, Runtime};
use std::str::FromStr;
use thiserror::Error;
use tokio_postgres::NoTls;

pub type PgPool = Pool;

#[derive(Debug, Error)]
pub enum DbPoolError {
    #[error("invalid database url: {0}")]
    InvalidConfig(String),
    #[error("failed to create database pool: {0}")]
    PoolCreation(#[from] CreatePoolError),
}

/// Build a pool for `db_url` without opening a connection.
pub fn create_pool_from_url(db_url: &str) -> Result<PgPool, DbPoolError> {
    tokio_postgres::Config::from_str(db_url)
        .map_err(|e| DbPoolError::InvalidConfig(e.to_string()))?;

    let mut cfg = Config::new();
    cfg.url = Some(db_url.to_string());
    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });

    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
        .map_err(DbPoolError::PoolCreation)
}

/// Same as [`create_pool_from_url`], reading `DATABASE_URL`.
pub fn create_pool_from_env() -> Result<PgPool, DbPoolError> {
    let url = std::env::var("DATABASE_URL")
        .map_err(|_| DbPoolError::InvalidConfig("DATABASE_URL is not set".into()))?;
    create_pool_from_url(&url)
}
