pub mod adapters;
mod app;
pub mod config;
pub mod error;
pub mod ports;
pub mod push;
pub mod state;
pub mod types;
pub mod worker;

#[cfg(test)]
mod testing;

pub use app::{app, router};
pub use push::generate_vapid_credentials;

pub async fn serve(config: config::AppConfig) -> std::io::Result<()> {
    let addr = config.bind;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(app = %config.app_name, "listening on http://{addr}");
    axum::serve(listener, app(config)).await
}
