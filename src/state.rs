//! Shared application state for all routes. Model, codec and settings are fixed at startup.

use crate::config::{CriteriaSettings, ResolvedModel};
use crate::error::ConfigError;
use crate::hashid::HashIdCodec;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub model: Arc<ResolvedModel>,
    pub codec: Arc<HashIdCodec>,
    pub settings: Arc<CriteriaSettings>,
}

impl AppState {
    /// Builds the codec from `settings`; fails on an invalid alphabet.
    pub fn new(pool: PgPool, model: ResolvedModel, settings: CriteriaSettings) -> Result<Self, ConfigError> {
        let codec = settings.codec()?;
        Ok(AppState {
            pool,
            model: Arc::new(model),
            codec: Arc::new(codec),
            settings: Arc::new(settings),
        })
    }
}
