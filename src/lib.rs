//! Criteria SDK: request-criteria compiler and hashed identifier codec for configuration-driven REST backends.

pub mod config;
pub mod criteria;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod hashid;
pub mod query;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;

pub use config::{
    load_from_path, load_from_pool, load_from_str, resolve, CriteriaFile, CriteriaSettings, ResolvedContainer,
    ResolvedModel,
};
pub use criteria::{CompiledCriteria, CriteriaParams, RequestCriteria};
pub use error::{AppError, ConfigError};
pub use extractors::CriteriaQuery;
pub use hashid::{decode_route_id, HashIdCodec, IdPath, PayloadWalker};
pub use query::{ConditionTarget, QueryTarget, RecordedQuery, SqlSelect};
pub use response::{success_many, success_one};
pub use routes::{app, common_routes, common_routes_with_ready, container_routes};
pub use service::CriteriaService;
pub use state::AppState;

/// Install a `tracing` subscriber honouring `RUST_LOG`. Without it, `criteria_sdk=info`
/// plus `extra_directives` (e.g. `"my_service=info"`) apply.
pub fn init_tracing(extra_directives: &str) {
    let default = if extra_directives.is_empty() {
        "criteria_sdk=info".to_string()
    } else {
        format!("criteria_sdk=info,{}", extra_directives)
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .try_init();
}
