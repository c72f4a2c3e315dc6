use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::TicketStore;

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub store: Arc<dyn TicketStore>,
}

impl AppContext {
    pub fn new(config: AppConfig, store: Arc<dyn TicketStore>) -> Self {
        Self { config, store }
    }
}
