#![allow(async_fn_in_trait)]

use deadpool_postgres::GenericClient;
use std::{sync::OnceLock, time::Instant};
use tokio_postgres::{Row, types::ToSql};
use tracing::warn;

fn slow_query_threshold_ms() -> Option<u64> {
    static CACHE: OnceLock<Option<u64>> = OnceLock::new();

    *CACHE.get_or_init(|| {
        std::env::var("TM_DB_LOG_MIN_DURATION_MS")
            .ok()
            .and_then(|raw| parse_threshold(&raw))
    })
}

fn parse_threshold(raw: &str) -> Option<u64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .map(|v| v.max(0) as u64)
        .filter(|v| *v > 0)
}

fn maybe_log_slow_query(label: &str, started_at: Instant) {
    if let Some(threshold_ms) = slow_query_threshold_ms() {
        let elapsed_ms = started_at.elapsed().as_millis() as u64;
        if elapsed_ms >= threshold_ms {
            warn!(query = label, elapsed_ms, "slow_query_detected");
        }
    }
}

/// Prepared-statement helpers that log queries slower than `TM_DB_LOG_MIN_DURATION_MS`.
pub trait TimedClientExt: GenericClient {
    async fn timed_query_cached(
        &self,
        statement: &str,
        params: &[&(dyn ToSql + Sync)],
        label: &str,
    ) -> Result<Vec<Row>, tokio_postgres::Error> {
        let started = Instant::now();
        let prepared = self.prepare_cached(statement).await?;
        let result = self.query(&prepared, params).await;
        maybe_log_slow_query(label, started);
        result
    }

    async fn timed_query_one_cached(
        &self,
        statement: &str,
        params: &[&(dyn ToSql + Sync)],
        label: &str,
    ) -> Result<Row, tokio_postgres::Error> {
        let started = Instant::now();
        let prepared = self.prepare_cached(statement).await?;
        let result = self.query_one(&prepared, params).await;
        maybe_log_slow_query(label, started);
        result
    }
}

impl<T: GenericClient + ?Sized> TimedClientExt for T {}
