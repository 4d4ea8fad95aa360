pub mod common;
pub mod container;

pub use common::{common_routes, common_routes_with_ready};
pub use container::container_routes;

use crate::state::AppState;
use axum::Router;

/// Health, readiness, version and container routes in one router.
pub fn app(state: AppState) -> Router {
    common_routes_with_ready(state.clone()).merge(container_routes(state))
}
