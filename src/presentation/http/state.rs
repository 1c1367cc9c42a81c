use crate::{application::quotes::use_case::QuotesUseCase, config::Config};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub quotes: Arc<QuotesUseCase>,
}
