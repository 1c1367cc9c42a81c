use super::dto::{
    CreateQuoteRequest, QuotePageResponse, QuoteResponse, UpdateQuoteRequest,
};
use crate::domain::quote::{
    entity::{LikesReset, Quote},
    errors::DomainError,
    id_generator::IdGenerator,
    like::Like,
    repository::{LikeTransaction, QuoteRepository},
};
use crate::domain::shared::pagination::{PageQuery, total_pages};
use chrono::{TimeDelta, Utc};
use std::collections::HashMap;
use tracing::{debug, error, info, instrument, warn};
use validator::{Validate, ValidationErrors};

/// Window used by the weekly top quote.
pub const WEEKLY_WINDOW_DAYS: i64 = 7;

pub struct QuotesUseCase {
    repository: Box<dyn QuoteRepository>,
    ids: Box<dyn IdGenerator>,
}

impl QuotesUseCase {
    pub fn new(repository: Box<dyn QuoteRepository>, ids: Box<dyn IdGenerator>) -> Self {
        Self { repository, ids }
    }

    pub async fn ping(&self) -> Result<(), DomainError> {
        self.repository.ping().await
    }

    pub async fn random(&self, viewer_ip: &str) -> Result<QuoteResponse, DomainError> {
        let quote = self.repository.get_random().await?;
        Ok(self.with_like_state(quote, viewer_ip).await)
    }

    #[instrument(skip(self), fields(page = query.page.page(), page_size = query.page.page_size()))]
    pub async fn list(
        &self,
        query: PageQuery,
        viewer_ip: &str,
    ) -> Result<QuotePageResponse, DomainError> {
        let (quotes, total) = self.repository.get_page(&query).await?;
        debug!("Page holds {} of {} matching quotes", quotes.len(), total);

        let ids: Vec<String> = quotes.iter().map(|q| q.id.clone()).collect();
        let liked = match self.liked_map(&ids, viewer_ip).await {
            Ok(liked) => liked,
            Err(e) => {
                warn!("Could not resolve like state for page: {}", e);
                HashMap::new()
            }
        };

        let quotes = quotes
            .into_iter()
            .map(|quote| {
                let is_liked = liked.get(&quote.id).copied().unwrap_or(false);
                QuoteResponse::from_quote(quote, is_liked)
            })
            .collect();

        Ok(QuotePageResponse {
            quotes,
            total,
            page: query.page.page(),
            page_size: query.page.page_size(),
            total_pages: total_pages(total, query.page.page_size()),
        })
    }

    pub async fn get(&self, id: &str, viewer_ip: &str) -> Result<QuoteResponse, DomainError> {
        let quote = self.repository.get_by_id(id).await?;
        Ok(self.with_like_state(quote, viewer_ip).await)
    }

    #[instrument(skip(self, request))]
    pub async fn create(&self, request: CreateQuoteRequest) -> Result<QuoteResponse, DomainError> {
        let request = request.normalized();
        request.validate().map_err(validation_error)?;

        let quote = Quote::new(
            self.ids.generate(),
            request.text.unwrap_or_default(),
            request.author.unwrap_or_default(),
            Utc::now(),
        );
        self.repository.insert(&quote).await?;
        info!(quote_id = %quote.id, "Quote created");

        // Nobody can have liked a quote that did not exist a moment ago.
        Ok(QuoteResponse::from_quote(quote, false))
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: &str,
        request: UpdateQuoteRequest,
        viewer_ip: &str,
    ) -> Result<QuoteResponse, DomainError> {
        let request = request.normalized();
        request.validate().map_err(validation_error)?;

        let current = self.repository.get_by_id(id).await?;
        let text = request.text.unwrap_or(current.text);
        let author = request.author.unwrap_or(current.author);

        let updated = self.repository.update(id, &text, &author).await?;
        Ok(self.with_like_state(updated, viewer_ip).await)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), DomainError> {
        self.repository.delete(id).await?;
        info!(quote_id = %id, "Quote deleted");
        Ok(())
    }

    /// Likes a quote once per client IP.
    ///
    /// The whole check-increment-record sequence runs in one transaction;
    /// any failure rolls it back before the error is returned.
    #[instrument(skip(self, user_agent))]
    pub async fn like(
        &self,
        quote_id: &str,
        user_ip: &str,
        user_agent: &str,
    ) -> Result<QuoteResponse, DomainError> {
        let mut tx = self.repository.begin_like().await?;

        match self.like_in_transaction(&mut tx, quote_id, user_ip, user_agent).await {
            Ok(quote) => {
                tx.commit().await?;
                info!(likes_count = quote.likes_count, "Quote liked");
                Ok(QuoteResponse::from_quote(quote, true))
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    error!("Like rollback failed: {}", rollback_err);
                }
                Err(err)
            }
        }
    }

    async fn like_in_transaction(
        &self,
        tx: &mut Box<dyn LikeTransaction>,
        quote_id: &str,
        user_ip: &str,
        user_agent: &str,
    ) -> Result<Quote, DomainError> {
        if tx.lock_like(quote_id, user_ip).await? {
            return Err(DomainError::AlreadyLiked);
        }

        let quote = tx.increment_like(quote_id).await?;

        let like = Like {
            id: self.ids.generate(),
            quote_id: quote.id.clone(),
            user_ip: user_ip.to_string(),
            user_agent: user_agent.to_string(),
            created_at: Utc::now(),
        };
        tx.insert_like_if_absent(&like).await?;

        Ok(quote)
    }

    pub async fn is_liked(&self, quote_id: &str, viewer_ip: &str) -> Result<bool, DomainError> {
        self.repository.is_liked(quote_id, viewer_ip).await
    }

    pub async fn liked_map(
        &self,
        quote_ids: &[String],
        viewer_ip: &str,
    ) -> Result<HashMap<String, bool>, DomainError> {
        if quote_ids.is_empty() {
            return Ok(HashMap::new());
        }
        self.repository.are_liked(quote_ids, viewer_ip).await
    }

    pub async fn top_weekly(&self, viewer_ip: &str) -> Result<QuoteResponse, DomainError> {
        let quote = self
            .repository
            .get_top_by_likes_since(Some(TimeDelta::days(WEEKLY_WINDOW_DAYS)))
            .await?;
        Ok(self.with_like_state(quote, viewer_ip).await)
    }

    pub async fn top_all_time(&self, viewer_ip: &str) -> Result<QuoteResponse, DomainError> {
        let quote = self.repository.get_top_by_likes_since(None).await?;
        Ok(self.with_like_state(quote, viewer_ip).await)
    }

    #[instrument(skip(self))]
    pub async fn reset_likes(&self) -> Result<LikesReset, DomainError> {
        let summary = self.repository.reset_all_likes().await?;
        info!(
            quotes_reset = summary.quotes_reset,
            likes_removed = summary.likes_removed,
            "All likes reset"
        );
        Ok(summary)
    }

    /// A failed like lookup degrades to "not liked" rather than failing the read.
    async fn with_like_state(&self, quote: Quote, viewer_ip: &str) -> QuoteResponse {
        let is_liked = match self.repository.is_liked(&quote.id, viewer_ip).await {
            Ok(liked) => liked,
            Err(e) => {
                warn!(quote_id = %quote.id, "Like lookup failed: {}", e);
                false
            }
        };
        QuoteResponse::from_quote(quote, is_liked)
    }
}

fn validation_error(errors: ValidationErrors) -> DomainError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let message = fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect::<Vec<_>>()
        .join("; ");

    DomainError::ValidationError(message)
}
