//! In-memory todo list served over HTTP.
//!
//! # Overview
//! `TodoStore` holds every item behind a single async mutex; `routes` maps
//! `/v1/todos` requests onto it. The store is built by the caller and handed
//! to the router as shared state, so tests and the binary each own their own
//! instance.

pub mod config;
pub mod error;
pub mod routes;
pub mod store;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub use config::ServerConfig;
pub use error::TodoError;
pub use store::{TodoId, TodoItem, TodoStore};

/// Router with a fresh, empty store and the default configuration.
pub fn app() -> Router {
    router(Arc::new(TodoStore::new()), &ServerConfig::default())
}

/// Router over an existing store.
pub fn router(store: Arc<TodoStore>, config: &ServerConfig) -> Router {
    let with_slash = format!("{}/", routes::TODOS_PATH);
    Router::new()
        .route(routes::TODOS_PATH, routes::todo_routes())
        .route(&with_slash, routes::todo_routes())
        .fallback(routes::not_found)
        .layer(cors_layer(&config.cors_origin))
        .with_state(store)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = match origin.parse::<HeaderValue>() {
        Ok(value) => AllowOrigin::exact(value),
        Err(_) => {
            log::warn!("ignoring invalid CORS origin {origin:?}");
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

pub async fn run(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}
