//! Route definitions for the `/customers` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;

use crate::handlers::customer;
use crate::state::AppState;

/// Largest accepted profile-image request body (10 MiB).
const MAX_PROFILE_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Routes mounted at `/customers`.
///
/// ```text
/// GET    /                      -> list_customers (auth)
/// POST   /                      -> register_customer
/// GET    /{id}                  -> get_customer (auth)
/// PUT    /{id}                  -> update_customer (auth)
/// DELETE /{id}                  -> delete_customer (auth)
/// GET    /{id}/profile-image    -> get_profile_image
/// POST   /{id}/profile-image    -> upload_profile_image (auth, multipart)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(customer::list_customers).post(customer::register_customer),
        )
        .route(
            "/{id}",
            get(customer::get_customer)
                .put(customer::update_customer)
                .delete(customer::delete_customer),
        )
        .route(
            "/{id}/profile-image",
            get(customer::get_profile_image)
                .post(customer::upload_profile_image)
                .layer(DefaultBodyLimit::max(MAX_PROFILE_IMAGE_BYTES)),
        )
}
