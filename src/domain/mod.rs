pub mod quote;
pub mod shared;
