pub mod health;
pub mod items;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::{Config, DEFAULT_BODY_LIMIT_BYTES};
use crate::error::AppError;
use crate::services::ItemsService;

/// Shared handler state. Cloned per request; the service behind it is shared.
#[derive(Clone)]
pub struct AppState {
    pub items: Arc<ItemsService>,
}

impl AppState {
    pub fn new(items: ItemsService) -> Self {
        Self {
            items: Arc::new(items),
        }
    }
}

#[derive(Clone, Debug)]
pub struct HttpOptions {
    /// Directory of the browser frontend. `None` disables static serving.
    pub static_dir: Option<PathBuf>,
    pub body_limit_bytes: usize,
}

impl HttpOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            static_dir: Some(PathBuf::from(&config.static_dir)),
            body_limit_bytes: config.body_limit_bytes,
        }
    }
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            static_dir: None,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

pub fn router(state: AppState, options: &HttpOptions) -> Router {
    let api = Router::new()
        .route("/items", get(items::list_items).post(items::create_item))
        .route(
            "/items/:code",
            get(items::get_item)
                .put(items::update_item)
                .delete(items::delete_item),
        )
        .route("/items/:code/quantity", patch(items::update_quantity))
        .route("/health", get(health::check))
        .with_state(state);

    // Unknown paths fall through to the frontend, whose index.html handles client-side routes.
    let app = match &options.static_dir {
        Some(dir) => api.fallback_service(
            ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html"))),
        ),
        None => api.fallback(not_found),
    };

    // Any origin, no credentials.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any)
        .expose_headers(Any);

    app.layer(DefaultBodyLimit::max(options.body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}
