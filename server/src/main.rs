use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use log::info;
use tokio::net::TcpListener;
use todo_server::{ServerConfig, TodoStore};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::parse();
    let addr = config.socket_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("listening on {addr}");
    info!("allowing browser requests from {}", config.cors_origin);

    let store = Arc::new(TodoStore::new());
    todo_server::run(listener, todo_server::router(store, &config))
        .await
        .context("server exited with an error")
}
