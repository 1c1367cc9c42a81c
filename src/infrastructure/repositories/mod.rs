pub mod sqlx_quote_repository;
