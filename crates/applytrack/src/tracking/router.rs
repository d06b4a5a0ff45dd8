use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;

use super::domain::{ApplicationId, UserId};
use super::engine::FilterError;
use super::lookup::ApplicationLookup;
use super::service::{ApplicationListingService, ListingError};

/// Router builder exposing the application listing endpoints.
pub fn application_router<L>(service: Arc<ApplicationListingService<L>>) -> Router
where
    L: ApplicationLookup + 'static,
{
    Router::new()
        .route(
            "/api/v1/users/:user_id/applications",
            get(list_handler::<L>),
        )
        .route(
            "/api/v1/users/:user_id/applications/:application_id",
            get(detail_handler::<L>),
        )
        .with_state(service)
}

pub(crate) async fn list_handler<L>(
    State(service): State<Arc<ApplicationListingService<L>>>,
    Path(user_id): Path<u64>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response
where
    L: ApplicationLookup + 'static,
{
    match service.list_from_pairs(UserId(user_id), pairs).await {
        Ok(listing) => (StatusCode::OK, axum::Json(listing)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn detail_handler<L>(
    State(service): State<Arc<ApplicationListingService<L>>>,
    Path((user_id, application_id)): Path<(u64, u64)>,
) -> Response
where
    L: ApplicationLookup + 'static,
{
    match service
        .get(UserId(user_id), ApplicationId(application_id))
        .await
    {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) fn error_status(error: &ListingError) -> StatusCode {
    match error {
        ListingError::Criteria(_) | ListingError::Filter(FilterError::InvalidUser) => {
            StatusCode::BAD_REQUEST
        }
        ListingError::Filter(FilterError::UserNotFound(_))
        | ListingError::Filter(FilterError::ApplicationNotFound(_)) => StatusCode::NOT_FOUND,
        ListingError::Filter(FilterError::LookupFailure { .. }) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(error: ListingError) -> Response {
    let status = error_status(&error);
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
