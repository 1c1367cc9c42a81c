pub mod fallback;
pub mod health;
pub mod likes;
pub mod quotes;
