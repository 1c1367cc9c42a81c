use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// A stored quote.
///
/// `likes_count` and both timestamps are owned by the server: callers only
/// ever choose `text` and `author`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    pub text: String,
    pub author: String,
    pub likes_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    /// Builds a fresh quote with zero likes. Creation time is kept at
    /// second precision and `updated_at` starts equal to `created_at`.
    pub fn new(id: String, text: String, author: String, now: DateTime<Utc>) -> Self {
        let created_at = now.trunc_subsecs(0);
        Self {
            id,
            text,
            author,
            likes_count: 0,
            created_at,
            updated_at: created_at,
        }
    }
}

/// Row counts touched by a bulk like reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikesReset {
    pub quotes_reset: u64,
    pub likes_removed: u64,
}
