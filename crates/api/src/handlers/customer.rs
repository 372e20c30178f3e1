//! Handlers for the `/customers` resource.
//!
//! Registration and profile-image reads are public; every other handler
//! requires a valid access token via [`AuthCustomer`].

use axum::extract::{Multipart, Path, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use crm_core::customer::{CustomerDto, CustomerRegistration, CustomerUpdate};
use crm_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::handlers::auth::issue_token;
use crate::middleware::auth::AuthCustomer;
use crate::state::AppState;

/// Multipart field that carries the image bytes.
const PROFILE_IMAGE_FIELD: &str = "file";

/// Profile images are served as JPEG.
const PROFILE_IMAGE_CONTENT_TYPE: &str = "image/jpeg";

/// GET /api/v1/customers
pub async fn list_customers(
    State(state): State<AppState>,
    auth: AuthCustomer,
) -> AppResult<Json<Vec<CustomerDto>>> {
    let customers = state.customers.list_customers().await?;
    tracing::debug!(actor_id = auth.customer_id, count = customers.len(), "Listed customers");
    Ok(Json(customers))
}

/// GET /api/v1/customers/{id}
pub async fn get_customer(
    State(state): State<AppState>,
    auth: AuthCustomer,
    Path(id): Path<DbId>,
) -> AppResult<Json<CustomerDto>> {
    tracing::debug!(actor_id = auth.customer_id, customer_id = id, "Fetching customer");
    let customer = state.customers.get_customer(id).await?;
    Ok(Json(customer))
}

/// POST /api/v1/customers
///
/// Register a new customer. Returns 201 Created with the customer and a
/// freshly issued access token in the `Authorization` header.
pub async fn register_customer(
    State(state): State<AppState>,
    Json(input): Json<CustomerRegistration>,
) -> AppResult<(StatusCode, HeaderMap, Json<CustomerDto>)> {
    let customer = state.customers.register(input).await?;

    let token = issue_token(&state, &customer)?;
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&token)
            .map_err(|e| AppError::InternalError(format!("Invalid token header: {e}")))?,
    );

    Ok((StatusCode::CREATED, headers, Json(customer)))
}

/// PUT /api/v1/customers/{id}
///
/// Partial update: omitted or `null` fields are left unchanged.
pub async fn update_customer(
    State(state): State<AppState>,
    auth: AuthCustomer,
    Path(id): Path<DbId>,
    Json(input): Json<CustomerUpdate>,
) -> AppResult<Json<CustomerDto>> {
    let customer = state.customers.update_customer(id, input).await?;
    tracing::info!(
        actor_id = auth.customer_id,
        actor = %auth.email,
        customer_id = id,
        "Customer update applied"
    );
    Ok(Json(customer))
}

/// DELETE /api/v1/customers/{id}
///
/// Returns 204 No Content.
pub async fn delete_customer(
    State(state): State<AppState>,
    auth: AuthCustomer,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.customers.delete_customer(id).await?;
    tracing::info!(
        actor_id = auth.customer_id,
        actor = %auth.email,
        customer_id = id,
        "Customer removed"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/customers/{id}/profile-image
///
/// Accept a multipart upload with the image in the `file` field. Returns
/// 204 No Content once the image is stored and recorded.
pub async fn upload_profile_image(
    State(state): State<AppState>,
    auth: AuthCustomer,
    Path(id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<StatusCode> {
    // Unknown customers get 404 whatever the body holds.
    state.customers.get_customer(id).await?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(PROFILE_IMAGE_FIELD) {
            continue;
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let profile_image_id = state.customers.upload_profile_image(id, &data).await?;
        tracing::info!(
            actor_id = auth.customer_id,
            customer_id = id,
            %profile_image_id,
            "Profile image replaced"
        );
        return Ok(StatusCode::NO_CONTENT);
    }

    Err(AppError::BadRequest(format!(
        "Multipart field '{PROFILE_IMAGE_FIELD}' is required"
    )))
}

/// GET /api/v1/customers/{id}/profile-image
pub async fn get_profile_image(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let bytes = state.customers.download_profile_image(id).await?;
    Ok(([(CONTENT_TYPE, PROFILE_IMAGE_CONTENT_TYPE)], bytes))
}
