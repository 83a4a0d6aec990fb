//! Shipment records and admin status updates.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::{
    Delivery, DeliveryListResponse, DeliveryResponse, DeliveryStatus, UpdateDeliveryRequest,
    UpdateDeliveryResponse,
};
use persistence::entities::DonationStatusDb;
use persistence::repositories::{DeliveryRepository, DeliveryUpdate};
use shared::validation::non_blank;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AdminUser;
use crate::middleware::metrics::record_delivery_update;
use crate::middleware::SessionUser;

fn delivery_not_found() -> ApiError {
    ApiError::NotFound("배송 정보를 찾을 수 없습니다.".to_string())
}

/// Admins see every shipment, donors their own.
///
/// GET /api/deliveries
pub async fn list_deliveries(
    State(state): State<AppState>,
    session: SessionUser,
) -> Result<Json<DeliveryListResponse>, ApiError> {
    let repo = DeliveryRepository::new(state.pool.clone());
    let entities = if session.is_admin() {
        repo.list_all().await?
    } else {
        repo.list_for_donor(session.user_id).await?
    };

    let deliveries: Vec<DeliveryResponse> = entities
        .into_iter()
        .map(|e| DeliveryResponse::from(Delivery::from(e)))
        .collect();
    let count = deliveries.len();
    Ok(Json(DeliveryListResponse { deliveries, count }))
}

/// GET /api/deliveries/:id
pub async fn get_delivery(
    State(state): State<AppState>,
    session: SessionUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeliveryResponse>, ApiError> {
    let delivery: Delivery = DeliveryRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(delivery_not_found)?
        .into();

    if !session.is_admin() && delivery.donor_id != session.user_id {
        return Err(ApiError::Forbidden(
            "본인의 배송 정보만 조회할 수 있습니다.".to_string(),
        ));
    }

    Ok(Json(delivery.into()))
}

/// Move a shipment forward and carry the donation along.
///
/// PUT /api/admin/deliveries/:id
pub async fn update_delivery(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDeliveryRequest>,
) -> Result<Json<UpdateDeliveryResponse>, ApiError> {
    let next = non_blank(request.status.as_deref())
        .ok_or_else(|| ApiError::Validation("배송 상태를 입력해주세요.".to_string()))?
        .parse::<DeliveryStatus>()
        .map_err(ApiError::Validation)?;

    let repo = DeliveryRepository::new(state.pool.clone());
    let current: Delivery = repo
        .find_by_id(id)
        .await?
        .ok_or_else(delivery_not_found)?
        .into();

    if !current.status.can_transition_to(next) {
        return Err(ApiError::Conflict(format!(
            "'{}' 상태에서 '{}' 상태로 변경할 수 없습니다.",
            current.status.label(),
            next.label()
        )));
    }

    let carrier = non_blank(request.carrier.as_deref());
    let tracking_number = non_blank(request.tracking_number.as_deref());
    let updated = repo
        .update_status(
            id,
            &DeliveryUpdate {
                expected: current.status.into(),
                next: next.into(),
                carrier: carrier.as_deref(),
                tracking_number: tracking_number.as_deref(),
                donation_status: next.donation_status().map(DonationStatusDb::from),
            },
        )
        .await?;
    if !updated {
        return Err(ApiError::Conflict(
            "배송 상태가 이미 변경되었습니다. 새로고침 후 다시 시도해주세요.".to_string(),
        ));
    }

    let delivery: Delivery = repo
        .find_by_id(id)
        .await?
        .ok_or_else(delivery_not_found)?
        .into();

    record_delivery_update(next.as_str());
    tracing::info!(
        delivery_id = %id,
        donation_id = %delivery.donation_id,
        user_id = %admin.user_id,
        status = next.as_str(),
        "Delivery status updated"
    );

    Ok(Json(UpdateDeliveryResponse {
        success: true,
        message: format!("배송 상태가 '{}'(으)로 변경되었습니다.", next.label()),
        delivery: delivery.into(),
    }))
}
