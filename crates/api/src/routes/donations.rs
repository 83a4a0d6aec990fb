//! Donor-facing donation routes: registration, status page and cancellation.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use domain::models::{
    ActionResponse, CancelDonationRequest, CreateDonationResponse, DonationFormError,
    DonationMethod, DonationSummary, NewDonation, Organization, User,
};
use domain::services::{
    build_status_response, donor_status::DonationStatusResponse, ensure_cancellable,
    DonorIdentity, ShipmentRecord,
};
use persistence::repositories::{
    DeliveryRepository, DonationRepository, NewDonationRecord, OrganizationRepository,
    UserRepository,
};
use shared::crypto::generate_reference_code;
use shared::validation::non_blank;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::DonorUser;
use crate::middleware::metrics::{record_donation_registered, record_transition};
use crate::services::uploads::PendingUpload;

const REFERENCE_CODE_ATTEMPTS: usize = 5;

fn is_media_field(name: &str) -> bool {
    matches!(name, "images" | "images[]" | "image" | "files")
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge("업로드 용량이 너무 큽니다.".to_string())
    } else {
        tracing::debug!("Malformed multipart body: {}", err);
        ApiError::Validation("잘못된 요청 형식입니다.".to_string())
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "on" | "yes" | "y"
    )
}

/// Copies one text part of the registration form into `form`.
///
/// Unknown parts are ignored; blank optional parts stay `None`.
pub(crate) fn apply_form_field(
    form: &mut NewDonation,
    name: &str,
    value: &str,
) -> Result<(), DonationFormError> {
    let trimmed = value.trim();
    match name {
        "genderType" => form.gender_type = trimmed.to_string(),
        "mainCategory" => form.main_category = trimmed.to_string(),
        "detailCategory" => form.detail_category = non_blank(Some(value)),
        "size" => form.size = trimmed.to_string(),
        "condition" => form.condition = non_blank(Some(value)),
        "description" => form.description = trimmed.to_string(),
        "quantity" => {
            form.quantity = if trimmed.is_empty() {
                1
            } else {
                trimmed
                    .parse()
                    .map_err(|_| DonationFormError::InvalidQuantity)?
            }
        }
        "matchType" | "donationMethod" => {
            form.donation_method = if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.parse()?)
            }
        }
        "deliveryMethod" => {
            form.delivery_method = if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.parse()?)
            }
        }
        "isAnonymous" => form.is_anonymous = parse_flag(trimmed),
        "organId" | "targetOrganizationId" => {
            form.target_organization_id = if trimmed.is_empty() {
                None
            } else {
                Some(Uuid::parse_str(trimmed).map_err(|_| {
                    DonationFormError::InvalidValue("기관 ID 형식이 올바르지 않습니다.".to_string())
                })?)
            }
        }
        "contact" => form.contact = non_blank(Some(value)),
        "desiredDate" => {
            form.desired_date = if trimmed.is_empty() {
                None
            } else {
                Some(NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
                    DonationFormError::InvalidValue("희망 날짜 형식이 올바르지 않습니다.".to_string())
                })?)
            }
        }
        "memo" => form.memo = non_blank(Some(value)),
        other => tracing::debug!(field = %other, "Ignoring unknown donation form field"),
    }
    Ok(())
}

/// Register a donation with its photos.
///
/// POST /api/donations (multipart)
pub async fn create_donation(
    State(state): State<AppState>,
    DonorUser(session): DonorUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CreateDonationResponse>), ApiError> {
    let mut form = NewDonation {
        quantity: 1,
        ..Default::default()
    };
    let mut uploads: Vec<PendingUpload> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if is_media_field(&name) {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(multipart_error)?;
            // Browsers send an empty part when no file was picked.
            if bytes.is_empty() && file_name.as_deref().map_or(true, str::is_empty) {
                continue;
            }
            uploads.push(state.uploads.inspect(
                uploads.len(),
                file_name.as_deref(),
                content_type.as_deref(),
                bytes.to_vec(),
            )?);
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            apply_form_field(&mut form, &name, &value)?;
        }
    }

    form.check(uploads.len())?;
    // check() guarantees both methods are present.
    let (Some(donation_method), Some(delivery_method)) =
        (form.donation_method, form.delivery_method)
    else {
        return Err(DonationFormError::MatchTypeRequired.into());
    };

    let target_organization_id = match donation_method {
        DonationMethod::DirectMatch => form.target_organization_id,
        DonationMethod::AutoMatch => None,
    };
    if let Some(target_id) = target_organization_id {
        let organization = OrganizationRepository::new(state.pool.clone())
            .find_by_id(target_id)
            .await?
            .map(Organization::from);
        if !organization.is_some_and(|o| o.is_approved()) {
            return Err(ApiError::Validation(
                "승인된 기관만 선택할 수 있습니다.".to_string(),
            ));
        }
    }

    let repo = DonationRepository::new(state.pool.clone());
    let mut reference_code = None;
    for _ in 0..REFERENCE_CODE_ATTEMPTS {
        let candidate = generate_reference_code();
        if !repo.reference_code_taken(&candidate).await? {
            reference_code = Some(candidate);
            break;
        }
    }
    let reference_code = reference_code.ok_or_else(|| {
        ApiError::Internal("Could not allocate a donation reference code".to_string())
    })?;

    let stored = state.uploads.store(&uploads).await?;
    let media = &stored.media;

    let created = repo
        .create(
            &NewDonationRecord {
                reference_code: &reference_code,
                owner_id: session.user_id,
                gender_type: &form.gender_type,
                main_category: &form.main_category,
                detail_category: form.detail_category.as_deref(),
                size: &form.size,
                condition: form.condition.as_deref(),
                description: &form.description,
                quantity: form.quantity,
                donation_method: donation_method.into(),
                target_organization_id,
                delivery_method: delivery_method.into(),
                contact: form.contact.as_deref(),
                desired_date: form.desired_date,
                memo: form.memo.as_deref(),
                is_anonymous: form.is_anonymous,
            },
            media,
        )
        .await;
    let id = match created {
        Ok(id) => id,
        Err(e) => {
            state.uploads.discard(&stored).await;
            return Err(e.into());
        }
    };

    let item = repo
        .find_item(id)
        .await?
        .ok_or_else(|| ApiError::Internal("Donation vanished after insert".to_string()))?;

    record_donation_registered(match donation_method {
        DonationMethod::AutoMatch => "AUTO_MATCH",
        DonationMethod::DirectMatch => "DIRECT_MATCH",
    });
    tracing::info!(
        donation_id = %item.id,
        user_id = %session.user_id,
        reference_code = %item.reference_code,
        images = media.len(),
        "Donation registered"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateDonationResponse {
            ok: true,
            message: "기부 신청이 완료되었습니다.".to_string(),
            donation: DonationSummary::from(&item),
        }),
    ))
}

/// Names a shipment sender may be recorded under for this donor.
fn sender_names(user: &User) -> Vec<String> {
    let mut names: Vec<String> = [
        Some(user.name.as_str()),
        user.nickname.as_deref(),
        Some(user.username.as_str()),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .filter(|n| !n.is_empty())
    .map(str::to_string)
    .collect();
    names.dedup();
    names
}

/// The donor's status page.
///
/// GET /api/donations/status
pub async fn donation_status(
    State(state): State<AppState>,
    DonorUser(session): DonorUser,
) -> Result<Json<DonationStatusResponse>, ApiError> {
    let user: User = UserRepository::new(state.pool.clone())
        .find_by_id(session.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("사용자를 찾을 수 없습니다.".to_string()))?
        .into();

    let repo = DonationRepository::new(state.pool.clone());
    let items = repo.hydrate(repo.list_by_owner(user.id).await?).await?;

    let shipments: Vec<ShipmentRecord> = DeliveryRepository::new(state.pool.clone())
        .list_delivered_by_senders(&sender_names(&user))
        .await?
        .into_iter()
        .map(|entity| {
            let delivery = domain::models::Delivery::from(entity);
            ShipmentRecord {
                donation_id: delivery.donation_id,
                sender_name: delivery.sender.name,
                status_label: delivery.status.label().to_string(),
                items: delivery.item_name,
                organization: delivery.receiver.name,
                date: delivery.delivered_at,
            }
        })
        .collect();

    let identity = DonorIdentity {
        name: user.name,
        nickname: user.nickname,
        username: user.username,
    };

    Ok(Json(build_status_response(&items, &shipments, &identity)))
}

/// Withdraw a donation before it is matched.
///
/// PUT /api/donations/:id/cancel
pub async fn cancel_donation(
    State(state): State<AppState>,
    DonorUser(session): DonorUser,
    Path(id): Path<Uuid>,
    body: Option<Json<CancelDonationRequest>>,
) -> Result<Json<ActionResponse>, ApiError> {
    let repo = DonationRepository::new(state.pool.clone());
    let item = repo
        .find_item(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("기부 내역을 찾을 수 없습니다.".to_string()))?;

    if item.owner_id != session.user_id {
        return Err(ApiError::Forbidden(
            "본인의 기부만 취소할 수 있습니다.".to_string(),
        ));
    }

    ensure_cancellable(&item)?;

    let reason = body.and_then(|Json(b)| non_blank(b.reason.as_deref()));
    if !repo.cancel(id, session.user_id, reason.as_deref()).await? {
        return Err(domain::services::LifecycleError::NotCancellable.into());
    }

    record_transition("cancel");
    tracing::info!(donation_id = %id, user_id = %session.user_id, "Donation cancelled by donor");
    Ok(Json(ActionResponse::ok("기부 신청이 취소되었습니다.")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::{DeliveryMethod, UserRole};

    fn form() -> NewDonation {
        NewDonation {
            quantity: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_form_fields_fill_new_donation() {
        let mut f = form();
        let organ = Uuid::new_v4();
        for (name, value) in [
            ("genderType", " 아동 의류 "),
            ("mainCategory", "상의"),
            ("detailCategory", "  "),
            ("size", "M"),
            ("quantity", "3"),
            ("matchType", "DIRECT"),
            ("deliveryMethod", "PARCEL"),
            ("isAnonymous", "true"),
            ("organId", &organ.to_string()),
            ("desiredDate", "2026-11-02"),
            ("unknown", "ignored"),
        ] {
            apply_form_field(&mut f, name, value).unwrap();
        }

        assert_eq!(f.gender_type, "아동 의류");
        assert_eq!(f.detail_category, None);
        assert_eq!(f.quantity, 3);
        assert_eq!(f.donation_method, Some(DonationMethod::DirectMatch));
        assert_eq!(f.delivery_method, Some(DeliveryMethod::Parcel));
        assert!(f.is_anonymous);
        assert_eq!(f.target_organization_id, Some(organ));
        assert_eq!(
            f.desired_date,
            NaiveDate::from_ymd_opt(2026, 11, 2)
        );
    }

    #[test]
    fn test_form_rejects_malformed_values() {
        let mut f = form();
        assert_eq!(
            apply_form_field(&mut f, "quantity", "many"),
            Err(DonationFormError::InvalidQuantity)
        );
        assert!(apply_form_field(&mut f, "organId", "not-a-uuid").is_err());
        assert!(apply_form_field(&mut f, "desiredDate", "11/02/2026").is_err());
        assert!(apply_form_field(&mut f, "matchType", "SOMETIMES").is_err());
    }

    #[test]
    fn test_blank_quantity_defaults_to_one() {
        let mut f = form();
        apply_form_field(&mut f, "quantity", "").unwrap();
        assert_eq!(f.quantity, 1);
    }

    #[test]
    fn test_media_field_names() {
        assert!(is_media_field("images"));
        assert!(is_media_field("images[]"));
        assert!(!is_media_field("description"));
    }

    #[test]
    fn test_sender_names_skip_blank_nickname() {
        let now = chrono::Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: "donor01".into(),
            password_hash: String::new(),
            name: " 홍길동 ".into(),
            nickname: Some("  ".into()),
            email: None,
            phone: None,
            address: None,
            role: UserRole::Donor,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(sender_names(&user), vec!["홍길동", "donor01"]);
    }
}
