use crate::Config;
use crate::bird::BirdClient;
use std::sync::Arc;

/// Shared, cloneable per-request dependencies. The only cross-request
/// resource is the pooled HTTP client inside [`BirdClient`].
#[derive(Clone)]
pub struct AppState {
    pub bird: Arc<BirdClient>,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let bird = Arc::new(BirdClient::new(config)?);
        Ok(Self { bird })
    }
}
