//! Database query and pool metrics.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Histogram of query latencies, labelled by query name.
pub const QUERY_DURATION_METRIC: &str = "database_query_duration_seconds";

/// Times one repository query.
///
/// ```ignore
/// let timer = QueryTimer::new("find_donation_by_id");
/// let result = sqlx::query_as::<_, DonationEntity>(...).fetch_optional(&pool).await;
/// timer.record();
/// result
/// ```
pub struct QueryTimer {
    query: &'static str,
    started: Instant,
}

impl QueryTimer {
    pub fn new(query: &'static str) -> Self {
        Self {
            query,
            started: Instant::now(),
        }
    }

    pub fn query(&self) -> &'static str {
        self.query
    }

    /// Records the elapsed time and returns it in seconds.
    pub fn record(self) -> f64 {
        let elapsed = self.started.elapsed().as_secs_f64();
        histogram!(QUERY_DURATION_METRIC, "query" => self.query).record(elapsed);
        elapsed
    }
}

/// Connection counts of a pool at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub total: u32,
    pub idle: u32,
}

impl PoolStats {
    pub fn of(pool: &PgPool) -> Self {
        Self {
            total: pool.size(),
            idle: pool.num_idle() as u32,
        }
    }

    pub fn active(&self) -> u32 {
        self.total.saturating_sub(self.idle)
    }
}

/// Publishes pool gauges; called before each metrics scrape.
pub fn record_pool_metrics(pool: &PgPool) {
    let stats = PoolStats::of(pool);
    gauge!("database_connections_active").set(stats.active() as f64);
    gauge!("database_connections_idle").set(stats.idle as f64);
    gauge!("database_connections_total").set(stats.total as f64);
}
