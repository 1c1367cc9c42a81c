use super::entity::{LikesReset, Quote};
use super::errors::DomainError;
use super::like::Like;
use crate::domain::shared::pagination::PageQuery;
use async_trait::async_trait;
use chrono::TimeDelta;
use std::collections::HashMap;

/// Data access for quotes and their likes.
///
/// "No row returned/affected" is reported as `DomainError::NotFound`; every
/// other backend failure is `DomainError::Storage`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteRepository: Send + Sync {
    async fn ping(&self) -> Result<(), DomainError>;
    async fn get_random(&self) -> Result<Quote, DomainError>;
    /// Newest first. The returned total counts every row matching the
    /// filter, ignoring pagination.
    async fn get_page(&self, query: &PageQuery) -> Result<(Vec<Quote>, i64), DomainError>;
    async fn get_by_id(&self, id: &str) -> Result<Quote, DomainError>;
    async fn insert(&self, quote: &Quote) -> Result<(), DomainError>;
    async fn update(&self, id: &str, text: &str, author: &str) -> Result<Quote, DomainError>;
    /// Removes the quote and any likes that point at it.
    async fn delete(&self, id: &str) -> Result<(), DomainError>;
    async fn is_liked(&self, quote_id: &str, user_ip: &str) -> Result<bool, DomainError>;
    /// Every requested id is present in the result; ids without a like map
    /// to `false`. An empty slice issues no query.
    async fn are_liked(
        &self,
        quote_ids: &[String],
        user_ip: &str,
    ) -> Result<HashMap<String, bool>, DomainError>;
    /// Highest `likes_count`, newest on ties. With `since`, only quotes
    /// created within that window qualify.
    async fn get_top_by_likes_since(&self, since: Option<TimeDelta>)
    -> Result<Quote, DomainError>;
    async fn reset_all_likes(&self) -> Result<LikesReset, DomainError>;
    async fn begin_like(&self) -> Result<Box<dyn LikeTransaction>, DomainError>;
}

/// A single like attempt running inside one database transaction.
///
/// `lock_like` must serialize concurrent attempts for the same
/// (quote, IP) pair until the transaction ends. Dropping the handle without
/// committing rolls everything back.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LikeTransaction: Send {
    /// Locks the (quote, IP) pair and reports whether a like already exists.
    async fn lock_like(&mut self, quote_id: &str, user_ip: &str) -> Result<bool, DomainError>;
    /// `likes_count += 1` and `updated_at = now()`; returns the updated row.
    async fn increment_like(&mut self, quote_id: &str) -> Result<Quote, DomainError>;
    /// A duplicate (quote, IP) row is silently ignored.
    async fn insert_like_if_absent(&mut self, like: &Like) -> Result<(), DomainError>;
    async fn commit(&mut self) -> Result<(), DomainError>;
    async fn rollback(&mut self) -> Result<(), DomainError>;
}
