pub mod config;
pub mod error;
pub mod routes;

use axum::Router;
use db::DBService;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    db: DBService,
}

impl AppState {
    pub fn new(db: DBService) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::health::router())
        .merge(routes::clients::router())
        .merge(routes::news::router())
        .merge(routes::events::router())
        .merge(routes::blogs::router())
        .merge(routes::tailor::router());

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
