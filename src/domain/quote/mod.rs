pub mod entity;
pub mod errors;
pub mod id_generator;
pub mod like;
pub mod repository;
