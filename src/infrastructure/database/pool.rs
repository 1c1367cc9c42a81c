use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Connection settings shared by every pooled session: a server-side
/// `statement_timeout` and a UTC session time zone, which the repository
/// relies on when reading `TIMESTAMP` columns.
pub fn connect_options(
    database_url: &str,
    statement_timeout_ms: u64,
) -> anyhow::Result<PgConnectOptions> {
    let options = PgConnectOptions::from_str(database_url)?.options([
        ("statement_timeout", statement_timeout_ms.to_string()),
        ("TimeZone", "UTC".to_string()),
    ]);
    Ok(options)
}

/// Builds the shared connection pool. A stuck query fails instead of
/// holding its connection forever.
pub async fn create_pool(
    database_url: &str,
    max_connections: u32,
    statement_timeout_ms: u64,
) -> anyhow::Result<PgPool> {
    let options = connect_options(database_url, statement_timeout_ms)?;

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await?;
    Ok(pool)
}
