//! Contact group REST endpoints consumed by the campaign-creation flow.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use mailreach_core::types::{CacheStatus, Contact};
use mailreach_segmentation::ContactGroup;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::rest::{ApiResponse, AppState, ErrorResponse};

/// Maximum number of group ids accepted in one recipients request.
const MAX_GROUP_IDS: usize = 32;

#[derive(Serialize)]
pub struct GroupsResponse {
    pub success: bool,
    pub data: Vec<ContactGroup>,
    /// Why counts are all zero, when the pass was degraded.
    pub degraded: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientsRequest {
    pub group_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientsResponse {
    pub emails: Vec<String>,
    /// Sum of group counts; overlapping members are counted once per group.
    pub estimated_total: usize,
}

/// GET /v1/contact-groups: every dynamic group with its live count.
pub async fn handle_list_groups(State(state): State<AppState>) -> Json<GroupsResponse> {
    let outcome = state.engine.evaluate_groups().await;
    metrics::counter!("api.contact_groups.list").increment(1);
    Json(GroupsResponse {
        success: true,
        data: outcome.groups,
        degraded: outcome.degraded.map(|reason| reason.to_string()),
    })
}

/// GET /v1/contact-groups/:id/contacts: members of one group.
pub async fn handle_group_contacts(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> Json<ApiResponse<Vec<Contact>>> {
    let contacts = state.engine.get_contacts_for_group(&group_id).await;
    Json(ApiResponse::ok(contacts))
}

/// POST /v1/contact-groups/recipients: deduplicated send list plus the
/// quick estimate shown next to the group picker.
pub async fn handle_resolve_recipients(
    State(state): State<AppState>,
    Json(request): Json<RecipientsRequest>,
) -> Result<Json<ApiResponse<RecipientsResponse>>, ErrorResponse> {
    if request.group_ids.len() > MAX_GROUP_IDS {
        warn!(
            group_ids = request.group_ids.len(),
            "Recipients request validation failed"
        );
        metrics::counter!("api.validation_errors").increment(1);
        return Err(ErrorResponse::new(
            "invalid_recipients_request",
            format!("at most {MAX_GROUP_IDS} group ids may be requested"),
        ));
    }

    let emails = state
        .engine
        .get_contact_emails_for_groups(request.group_ids.as_slice())
        .await;
    let estimated_total = state
        .engine
        .get_total_recipients_for_groups(request.group_ids.as_slice());
    metrics::counter!("api.contact_groups.recipients").increment(1);

    Ok(Json(ApiResponse::ok(RecipientsResponse {
        emails,
        estimated_total,
    })))
}

/// POST /v1/contact-groups/refresh: drop the cached roster.
pub async fn handle_refresh_cache(State(state): State<AppState>) -> StatusCode {
    state.engine.refresh_cache();
    StatusCode::NO_CONTENT
}

/// GET /v1/contact-groups/cache: roster cache introspection.
pub async fn handle_cache_status(State(state): State<AppState>) -> Json<CacheStatus> {
    Json(state.engine.get_cache_status())
}
