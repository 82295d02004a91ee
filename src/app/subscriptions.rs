use crate::error::AppError;
use crate::ports::{PushSender, SubscriptionStore};
use crate::state::AppState;
use crate::types::preferences::PreferencesPatch;
use crate::types::push::PushEndpoint;

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::USER_AGENT;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct SubscribeRequest {
    pub(crate) subscription: PushEndpoint,
    #[serde(default)]
    pub(crate) preferences: PreferencesPatch,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UnsubscribeRequest {
    pub(crate) endpoint: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PreferencesRequest {
    pub(crate) endpoint: String,
    pub(crate) preferences: PreferencesPatch,
}

#[derive(Serialize)]
pub(crate) struct SuccessResponse {
    pub(crate) success: bool,
    pub(crate) message: &'static str,
}

impl SuccessResponse {
    pub(crate) fn new(message: &'static str) -> Json<Self> {
        Json(Self {
            success: true,
            message,
        })
    }
}

fn require_endpoint(endpoint: &str) -> Result<(), AppError> {
    if endpoint.trim().is_empty() {
        return Err(AppError::BadRequest("endpoint is required.".to_string()));
    }
    Ok(())
}

pub(crate) async fn subscribe<S: PushSender>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Json(request): Json<SubscribeRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    require_endpoint(&request.subscription.endpoint)?;
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let subscription = state
        .registry
        .upsert(request.subscription, &request.preferences, user_agent);
    tracing::info!(
        id = %subscription.id,
        endpoint = %subscription.endpoint,
        "subscription saved"
    );

    Ok(SuccessResponse::new("Subscription saved"))
}

pub(crate) async fn unsubscribe<S: PushSender>(
    State(state): State<AppState<S>>,
    Json(request): Json<UnsubscribeRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    require_endpoint(&request.endpoint)?;
    if state.registry.remove(&request.endpoint) {
        tracing::info!(endpoint = %request.endpoint, "subscription removed");
    }
    Ok(SuccessResponse::new("Subscription removed"))
}

pub(crate) async fn update_preferences<S: PushSender>(
    State(state): State<AppState<S>>,
    Json(request): Json<PreferencesRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    require_endpoint(&request.endpoint)?;
    if state
        .registry
        .update_preferences(&request.endpoint, &request.preferences)
    {
        tracing::info!(endpoint = %request.endpoint, "preferences updated");
    } else {
        tracing::warn!(
            endpoint = %request.endpoint,
            "preference update for unknown subscription ignored"
        );
    }
    Ok(SuccessResponse::new("Preferences updated"))
}
