use crate::config;
use crate::ports::{PushSender, SubscriptionStore};
use crate::push as push_service;
use crate::state;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::{get, post, put};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod push;
mod subscriptions;

pub fn app(config: config::AppConfig) -> Router {
    let sender = push_service::build_sender(&config);
    router(state::AppState::new(config, sender))
}

pub fn router<S: PushSender>(state: state::AppState<S>) -> Router {
    let api = Router::new()
        .route(
            "/subscriptions",
            post(subscriptions::subscribe::<S>).delete(subscriptions::unsubscribe::<S>),
        )
        .route(
            "/subscriptions/preferences",
            put(subscriptions::update_preferences::<S>),
        )
        .route("/notifications/test", post(push::push_test::<S>))
        .route("/notifications/broadcast", post(push::push_broadcast::<S>))
        .route("/vapid-public-key", get(push::push_public_key::<S>));

    Router::new()
        .nest("/api", api)
        .route("/health", get(health::<S>))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(Serialize, Deserialize)]
pub(crate) struct HealthResponse {
    pub(crate) status: String,
    pub(crate) subscriptions: usize,
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) timestamp: OffsetDateTime,
}

pub(crate) async fn health<S: PushSender>(
    State(state): State<state::AppState<S>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        subscriptions: state.registry.len(),
        timestamp: OffsetDateTime::now_utc(),
    })
}
