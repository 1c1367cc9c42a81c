pub mod database;
pub mod ids;
pub mod repositories;
