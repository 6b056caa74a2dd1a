use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Extension, Json,
};

use crate::{
    error::AppError,
    middleware::Identity,
    models::order::{MessageResponse, Order, OrderPayload, OrderStatusPayload},
    AppState,
};

pub async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(state.orders.list().await?))
}

pub async fn create_order(
    State(state): State<AppState>,
    Extension(Identity(username)): Extension<Identity>,
    payload: Result<Json<OrderPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let Json(payload) = payload?;
    let new_order = payload.validate()?;

    // Tokens are stateless; the identity may no longer name a user.
    let customer = state
        .credentials
        .find_by_username(&username)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Token identity {} has no matching user", username);
            AppError::Unauthenticated
        })?;

    let order = state.orders.create(customer.id, new_order).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn get_order(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Order>, AppError> {
    let Path(order_id) = path?;
    Ok(Json(state.orders.get(order_id).await?))
}

pub async fn update_order(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<OrderPayload>, JsonRejection>,
) -> Result<Json<Order>, AppError> {
    let Path(order_id) = path?;
    let Json(payload) = payload?;
    let order = state.orders.update(order_id, payload.validate()?).await?;
    Ok(Json(order))
}

pub async fn delete_order(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(order_id) = path?;
    state.orders.delete(order_id).await?;
    Ok(Json(MessageResponse {
        message: "Deleted Successfully".to_string(),
    }))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<OrderStatusPayload>, JsonRejection>,
) -> Result<Json<Order>, AppError> {
    let Path(order_id) = path?;
    let Json(payload) = payload?;
    let order = state
        .orders
        .update_status(order_id, payload.validate()?)
        .await?;
    Ok(Json(order))
}

pub async fn user_orders(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<Order>>, AppError> {
    let Path(user_id) = path?;
    let user = state
        .credentials
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(state.orders.list_for_customer(user.id).await?))
}

pub async fn user_order(
    State(state): State<AppState>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<Json<Order>, AppError> {
    let Path((user_id, order_id)) = path?;
    let user = state
        .credentials
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(state.orders.get_for_customer(user.id, order_id).await?))
}
