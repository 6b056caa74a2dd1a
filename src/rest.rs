use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
    Router,
};

use crate::{
    error::AppError,
    handlers::{auth, orders},
    middleware::{
        json_method_not_allowed, request_logging, require_access_token, require_refresh_token,
    },
    AppState,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/auth", auth_routes(state.clone()))
        .nest("/orders", order_routes(state.clone()))
        .fallback(not_found)
        .layer(from_fn(json_method_not_allowed))
        .layer(from_fn(request_logging))
        .with_state(state)
}

fn auth_routes(state: AppState) -> Router<AppState> {
    let refresh = Router::new()
        .route("/refresh", post(auth::refresh))
        .route_layer(from_fn_with_state(state, require_refresh_token));

    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .merge(refresh)
}

fn order_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/orders", get(orders::list_orders).post(orders::create_order))
        .route(
            "/order/:order_id",
            get(orders::get_order)
                .put(orders::update_order)
                .delete(orders::delete_order),
        )
        .route("/order/status/:order_id", patch(orders::update_order_status))
        .route("/user/:user_id/orders", get(orders::user_orders))
        .route("/user/:user_id/order/:order_id", get(orders::user_order))
        .route_layer(from_fn_with_state(state, require_access_token))
}

async fn not_found() -> AppError {
    AppError::NotFound
}
