//! Customer handlers.
//!
//! Visibility comes from the caller's groups: the collection endpoint uses
//! the union rule, the per-id GET the first-match rule.

use axum::{
    extract::{Extension, Path, State},
    response::Json,
    routing::get,
    Router,
};
use axum_extra::extract::WithRejection;
use serde_json::Value;

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{Customer, CustomerInput};
use crate::errors::{AppError, AppResult};
use crate::types::{Created, NoContent};

/// Create customer routes
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/customers/", get(list_customers).post(create_customer))
        .route(
            "/customers/:id/",
            get(list_customers_by_team)
                .put(update_customer)
                .delete(delete_customer),
        )
}

/// List customers visible to the caller's branch groups
#[utoipa::path(
    get,
    path = "/cms/customers/",
    tag = "Customers",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Visible active customers", body = Vec<Customer>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_customers(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Customer>>> {
    let filter = state.access_policy.list_filter(&current_user.groups);
    tracing::debug!(user = %current_user.username, ?filter, "Listing customers");

    let customers = state.customer_service.list_customers(&filter).await?;
    Ok(Json(customers))
}

/// Create a customer
#[utoipa::path(
    post,
    path = "/cms/customers/",
    tag = "Customers",
    security(("bearer_auth" = [])),
    request_body = CustomerInput,
    responses(
        (status = 201, description = "Customer created", body = Customer),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn create_customer(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<Value>, AppError>,
) -> AppResult<Created<Customer>> {
    let payload = CustomerInput::from_json(body);
    let customer = state.customer_service.create_customer(payload).await?;
    Ok(Created(customer))
}

/// List customers visible to the caller's team group.
///
/// The id segment is accepted but does not select a record.
#[utoipa::path(
    get,
    path = "/cms/customers/{id}/",
    tag = "Customers",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Customer ID (not used for selection)")
    ),
    responses(
        (status = 200, description = "Visible active customers", body = Vec<Customer>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_customers_by_team(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    WithRejection(Path(_id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<Json<Vec<Customer>>> {
    let filter = state.access_policy.detail_filter(&current_user.groups);
    tracing::debug!(user = %current_user.username, ?filter, "Listing customers by team");

    let customers = state.customer_service.list_customers(&filter).await?;
    Ok(Json(customers))
}

/// Replace every field of a customer
#[utoipa::path(
    put,
    path = "/cms/customers/{id}/",
    tag = "Customers",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Customer ID")
    ),
    request_body = CustomerInput,
    responses(
        (status = 200, description = "Customer updated", body = Customer),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn update_customer(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(body), _): WithRejection<Json<Value>, AppError>,
) -> AppResult<Json<Customer>> {
    let payload = CustomerInput::from_json(body);
    let customer = state.customer_service.update_customer(id, payload).await?;
    Ok(Json(customer))
}

/// Soft delete a customer
#[utoipa::path(
    delete,
    path = "/cms/customers/{id}/",
    tag = "Customers",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Customer ID")
    ),
    responses(
        (status = 204, description = "Customer deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
) -> AppResult<NoContent> {
    state.customer_service.delete_customer(id).await?;
    Ok(NoContent)
}
