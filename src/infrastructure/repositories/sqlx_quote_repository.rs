use crate::domain::quote::{
    entity::{LikesReset, Quote},
    errors::DomainError,
    like::Like,
    repository::{LikeTransaction, QuoteRepository},
};
use crate::domain::shared::pagination::PageQuery;
use async_trait::async_trait;
use chrono::{NaiveDateTime, TimeDelta, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Transaction};
use std::collections::HashMap;
use tracing::{debug, error, info, instrument};

/// Timestamps are read as `timestamp` so `TIMESTAMP` and `TIMESTAMPTZ`
/// columns decode alike; pooled sessions run with `TimeZone=UTC`.
const QUOTE_COLUMNS: &str = "id, text, author, likes_count, \
     created_at::timestamp AS created_at, updated_at::timestamp AS updated_at";

#[derive(FromRow)]
struct QuoteRow {
    id: String,
    text: String,
    author: String,
    likes_count: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl From<QuoteRow> for Quote {
    fn from(r: QuoteRow) -> Self {
        Quote {
            id: r.id,
            text: r.text,
            author: r.author,
            likes_count: r.likes_count.max(0),
            created_at: r.created_at.and_utc(),
            updated_at: r.updated_at.and_utc(),
        }
    }
}

fn storage_error(err: sqlx::Error) -> DomainError {
    error!(database_error = %err);
    DomainError::Storage(err.to_string())
}

/// `%term%` with LIKE wildcards in `term` escaped, so the search is a
/// literal substring match.
fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_search_filter(qb: &mut QueryBuilder<'_, Postgres>, search: Option<&str>) {
    if let Some(term) = search {
        let pattern = contains_pattern(term);
        qb.push(" WHERE (text ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR author ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

pub struct SqlxQuoteRepository {
    pub pool: PgPool,
}

impl SqlxQuoteRepository {
    pub fn new(pool: PgPool) -> Self {
        info!("Initializing SqlxQuoteRepository with connection pool");
        Self { pool }
    }
}

#[async_trait]
impl QuoteRepository for SqlxQuoteRepository {
    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    async fn get_random(&self) -> Result<Quote, DomainError> {
        let row = sqlx::query_as::<_, QuoteRow>(&format!(
            "SELECT {} FROM quotes ORDER BY RANDOM() LIMIT 1",
            QUOTE_COLUMNS
        ))
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        row.map(Into::into)
            .ok_or_else(|| DomainError::NotFound("no quotes found".into()))
    }

    #[instrument(skip(self), fields(page = query.page.page(), page_size = query.page.page_size()))]
    async fn get_page(&self, query: &PageQuery) -> Result<(Vec<Quote>, i64), DomainError> {
        let search = query.search.as_deref();

        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM quotes");
        push_search_filter(&mut count_qb, search);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;

        let mut data_qb =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM quotes", QUOTE_COLUMNS));
        push_search_filter(&mut data_qb, search);
        data_qb
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(query.page.page_size())
            .push(" OFFSET ")
            .push_bind(query.page.offset());

        let rows: Vec<QuoteRow> = data_qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(storage_error)?;

        debug!("Quote page query matched {} rows in total", total);
        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn get_by_id(&self, id: &str) -> Result<Quote, DomainError> {
        let row = sqlx::query_as::<_, QuoteRow>(&format!(
            "SELECT {} FROM quotes WHERE id = $1",
            QUOTE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        row.map(Into::into).ok_or_else(DomainError::quote_not_found)
    }

    #[instrument(skip(self, quote), fields(quote_id = %quote.id))]
    async fn insert(&self, quote: &Quote) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO quotes (id, text, author, likes_count, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&quote.id)
        .bind(&quote.text)
        .bind(&quote.author)
        .bind(quote.likes_count)
        .bind(quote.created_at)
        .bind(quote.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;
        Ok(())
    }

    #[instrument(skip(self, text, author))]
    async fn update(&self, id: &str, text: &str, author: &str) -> Result<Quote, DomainError> {
        let row = sqlx::query_as::<_, QuoteRow>(&format!(
            "UPDATE quotes
             SET text = $1, author = $2, updated_at = GREATEST(NOW(), created_at)
             WHERE id = $3
             RETURNING {}",
            QUOTE_COLUMNS
        ))
        .bind(text)
        .bind(author)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        row.map(Into::into).ok_or_else(DomainError::quote_not_found)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let likes = sqlx::query("DELETE FROM likes WHERE quote_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;

        let result = sqlx::query("DELETE FROM quotes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            tx.rollback().await.map_err(storage_error)?;
            return Err(DomainError::quote_not_found());
        }

        tx.commit().await.map_err(storage_error)?;
        debug!("Removed {} likes together with quote", likes.rows_affected());
        Ok(())
    }

    async fn is_liked(&self, quote_id: &str, user_ip: &str) -> Result<bool, DomainError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM likes WHERE quote_id = $1 AND user_ip = $2)",
        )
        .bind(quote_id)
        .bind(user_ip)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;
        Ok(exists)
    }

    async fn are_liked(
        &self,
        quote_ids: &[String],
        user_ip: &str,
    ) -> Result<HashMap<String, bool>, DomainError> {
        if quote_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let liked: Vec<String> = sqlx::query_scalar(
            "SELECT quote_id FROM likes WHERE quote_id = ANY($1) AND user_ip = $2",
        )
        .bind(quote_ids)
        .bind(user_ip)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        let mut result: HashMap<String, bool> =
            quote_ids.iter().map(|id| (id.clone(), false)).collect();
        for id in liked {
            result.insert(id, true);
        }
        Ok(result)
    }

    async fn get_top_by_likes_since(
        &self,
        since: Option<TimeDelta>,
    ) -> Result<Quote, DomainError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM quotes", QUOTE_COLUMNS));
        if let Some(window) = since {
            qb.push(" WHERE created_at >= ").push_bind(Utc::now() - window);
        }
        qb.push(" ORDER BY likes_count DESC, created_at DESC LIMIT 1");

        let row: Option<QuoteRow> = qb
            .build_query_as()
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.map(Into::into).ok_or_else(|| match since {
            Some(_) => DomainError::NotFound("no quotes found in the requested period".into()),
            None => DomainError::NotFound("no quotes found".into()),
        })
    }

    #[instrument(skip(self))]
    async fn reset_all_likes(&self) -> Result<LikesReset, DomainError> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let quotes = sqlx::query(
            "UPDATE quotes SET likes_count = 0, updated_at = GREATEST(NOW(), created_at)",
        )
        .execute(&mut *tx)
        .await
        .map_err(storage_error)?;

        let likes = sqlx::query("DELETE FROM likes")
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;

        tx.commit().await.map_err(storage_error)?;

        Ok(LikesReset {
            quotes_reset: quotes.rows_affected(),
            likes_removed: likes.rows_affected(),
        })
    }

    async fn begin_like(&self) -> Result<Box<dyn LikeTransaction>, DomainError> {
        let tx = self.pool.begin().await.map_err(storage_error)?;
        Ok(Box::new(SqlxLikeTransaction { tx: Some(tx) }))
    }
}

/// Like transaction on a pooled connection. The connection returns to the
/// pool on commit, rollback or drop (which rolls back).
pub struct SqlxLikeTransaction {
    tx: Option<Transaction<'static, Postgres>>,
}

impl SqlxLikeTransaction {
    fn active(&mut self) -> Result<&mut Transaction<'static, Postgres>, DomainError> {
        self.tx
            .as_mut()
            .ok_or_else(|| DomainError::Storage("like transaction already finished".into()))
    }
}

#[async_trait]
impl LikeTransaction for SqlxLikeTransaction {
    async fn lock_like(&mut self, quote_id: &str, user_ip: &str) -> Result<bool, DomainError> {
        let tx = self.active()?;

        // Row locks cannot cover a like row that does not exist yet, so the
        // pair itself is locked until the transaction ends.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!("{}|{}", quote_id, user_ip))
            .execute(&mut **tx)
            .await
            .map_err(storage_error)?;

        let existing = sqlx::query_scalar::<_, String>(
            "SELECT id FROM likes WHERE quote_id = $1 AND user_ip = $2 FOR UPDATE",
        )
        .bind(quote_id)
        .bind(user_ip)
        .fetch_optional(&mut **tx)
        .await
        .map_err(storage_error)?;

        Ok(existing.is_some())
    }

    async fn increment_like(&mut self, quote_id: &str) -> Result<Quote, DomainError> {
        let tx = self.active()?;

        let row = sqlx::query_as::<_, QuoteRow>(&format!(
            "UPDATE quotes
             SET likes_count = likes_count + 1, updated_at = GREATEST(NOW(), created_at)
             WHERE id = $1
             RETURNING {}",
            QUOTE_COLUMNS
        ))
        .bind(quote_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(storage_error)?;

        row.map(Into::into).ok_or_else(DomainError::quote_not_found)
    }

    async fn insert_like_if_absent(&mut self, like: &Like) -> Result<(), DomainError> {
        let tx = self.active()?;

        let result = sqlx::query(
            "INSERT INTO likes (id, quote_id, user_ip, user_agent, created_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (quote_id, user_ip) DO NOTHING",
        )
        .bind(&like.id)
        .bind(&like.quote_id)
        .bind(&like.user_ip)
        .bind(&like.user_agent)
        .bind(like.created_at)
        .execute(&mut **tx)
        .await
        .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            debug!(quote_id = %like.quote_id, "Like row already present, insert skipped");
        }
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), DomainError> {
        match self.tx.take() {
            Some(tx) => tx.commit().await.map_err(storage_error),
            None => Err(DomainError::Storage("like transaction already finished".into())),
        }
    }

    async fn rollback(&mut self) -> Result<(), DomainError> {
        match self.tx.take() {
            Some(tx) => tx.rollback().await.map_err(storage_error),
            None => Ok(()),
        }
    }
}
