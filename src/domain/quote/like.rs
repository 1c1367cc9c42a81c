use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One like per (quote, client IP). Never updated; only removed by a bulk reset
/// or together with its quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub id: String,
    pub quote_id: String,
    pub user_ip: String,
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
}
