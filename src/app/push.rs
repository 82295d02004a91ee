use crate::error::AppError;
use crate::ports::{PushSender, SubscriptionStore};
use crate::push as push_service;
use crate::state::AppState;
use crate::types::preferences::DEFAULT_CATEGORY;
use crate::types::push::{NotificationPayload, SubscriptionId};

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::subscriptions::SuccessResponse;

#[derive(Serialize)]
pub(crate) struct PublicKeyResponse {
    #[serde(rename = "publicKey")]
    pub(crate) public_key: String,
}

pub(crate) async fn push_public_key<S: PushSender>(
    State(state): State<AppState<S>>,
) -> Result<Json<PublicKeyResponse>, AppError> {
    let vapid = match push_service::load_vapid_config(&state.config) {
        push_service::VapidConfigStatus::Ready(vapid) => vapid,
        push_service::VapidConfigStatus::Incomplete | push_service::VapidConfigStatus::Missing => {
            return Err(AppError::PushUnavailable);
        }
    };

    Ok(Json(PublicKeyResponse {
        public_key: vapid.public_key,
    }))
}

#[derive(Debug, Deserialize)]
pub(crate) struct TestPushRequest {
    pub(crate) endpoint: String,
}

pub(crate) async fn push_test<S: PushSender>(
    State(state): State<AppState<S>>,
    Json(request): Json<TestPushRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    if request.endpoint.trim().is_empty() {
        return Err(AppError::BadRequest("endpoint is required.".to_string()));
    }
    if state.registry.find(&request.endpoint).is_none() {
        return Err(AppError::NotFound("Subscription not found".to_string()));
    }
    let dispatcher = state.dispatcher.as_ref().ok_or(AppError::PushUnavailable)?;

    dispatcher
        .send_to_endpoint(&request.endpoint, &NotificationPayload::flash_sale())
        .await?;

    Ok(SuccessResponse::new("Test notification sent"))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BroadcastRequest {
    #[serde(default)]
    pub(crate) payload: Option<NotificationPayload>,
    #[serde(default)]
    pub(crate) categories: Option<BTreeSet<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BroadcastResponse {
    pub(crate) sent: usize,
    pub(crate) failed: usize,
    pub(crate) evicted: usize,
    pub(crate) results: Vec<DeliveryResult>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeliveryResult {
    pub(crate) subscription_id: SubscriptionId,
    pub(crate) endpoint: String,
    pub(crate) ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) permanent: Option<bool>,
}

/// Fans a flash sale out to every eligible subscriber. Eviction of gone
/// endpoints is decided here, not in the dispatcher.
pub(crate) async fn push_broadcast<S: PushSender>(
    State(state): State<AppState<S>>,
    Json(request): Json<BroadcastRequest>,
) -> Result<Json<BroadcastResponse>, AppError> {
    let dispatcher = state.dispatcher.as_ref().ok_or(AppError::PushUnavailable)?;
    let payload = request.payload.unwrap_or_else(NotificationPayload::flash_sale);
    let categories = request
        .categories
        .unwrap_or_else(|| BTreeSet::from([DEFAULT_CATEGORY.to_string()]));

    let reports = dispatcher.broadcast_flash_sale(&payload, categories).await?;

    let mut evicted = 0;
    let results: Vec<DeliveryResult> = reports
        .into_iter()
        .map(|report| {
            let permanent = report.result.as_ref().err().map(|err| err.is_permanent());
            if permanent == Some(true)
                && state.config.evict_gone_subscriptions
                && state
                    .registry
                    .remove_if(&report.endpoint, &report.subscription_id)
            {
                tracing::info!(endpoint = %report.endpoint, "evicted gone subscription");
                evicted += 1;
            }
            DeliveryResult {
                subscription_id: report.subscription_id,
                endpoint: report.endpoint,
                ok: report.result.is_ok(),
                error: report.result.err().map(|err| err.to_string()),
                permanent,
            }
        })
        .collect();
    let sent = results.iter().filter(|result| result.ok).count();
    tracing::info!(sent, failed = results.len() - sent, evicted, "broadcast finished");

    Ok(Json(BroadcastResponse {
        sent,
        failed: results.len() - sent,
        evicted,
        results,
    }))
}
