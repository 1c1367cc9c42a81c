use crate::domain::quote::entity::Quote;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuoteResponse {
    pub id: String,
    pub text: String,
    pub author: String,
    pub likes_count: i32,
    pub is_liked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuoteResponse {
    pub fn from_quote(quote: Quote, is_liked: bool) -> Self {
        Self {
            id: quote.id,
            text: quote.text,
            author: quote.author,
            likes_count: quote.likes_count.max(0),
            is_liked,
            created_at: quote.created_at,
            updated_at: quote.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuotePageResponse {
    pub quotes: Vec<QuoteResponse>,
    #[ts(type = "number")]
    pub total: i64,
    #[ts(type = "number")]
    pub page: i64,
    #[ts(type = "number")]
    pub page_size: i64,
    #[ts(type = "number")]
    pub total_pages: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, TS)]
#[ts(export)]
pub struct CreateQuoteRequest {
    #[validate(
        required(message = "text is required"),
        length(min = 1, message = "text must not be empty")
    )]
    pub text: Option<String>,
    #[validate(
        required(message = "author is required"),
        length(min = 1, message = "author must not be empty")
    )]
    pub author: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, TS)]
#[ts(export)]
pub struct UpdateQuoteRequest {
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: Option<String>,
    #[validate(length(min = 1, message = "author must not be empty"))]
    pub author: Option<String>,
}

/// Trims every provided field so whitespace-only input fails validation.
fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

impl CreateQuoteRequest {
    pub fn normalized(self) -> Self {
        Self {
            text: trimmed(self.text),
            author: trimmed(self.author),
        }
    }
}

impl UpdateQuoteRequest {
    pub fn normalized(self) -> Self {
        Self {
            text: trimmed(self.text),
            author: trimmed(self.author),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LikeStatusResponse {
    pub is_liked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}
