//! Application router configuration.

use axum::{
    Json, Router,
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::cors::CorsLayer;

use crate::{
    AppState, ErrorBody,
    dashboard::{
        get_category_chart, get_combined_report, get_price_range_chart, get_statistics_endpoint,
    },
    endpoints,
    seed::get_seed,
    transaction::get_transaction_list,
};

/// Return a router with all the app's routes.
///
/// If `allowed_origin` is given, browsers on that origin may call the API.
pub fn build_router(state: AppState, allowed_origin: Option<HeaderValue>) -> Router {
    let transaction_routes = Router::new()
        .route(endpoints::SEED, get(get_seed))
        .route(endpoints::LIST, get(get_transaction_list))
        .route(endpoints::STATISTICS, get(get_statistics_endpoint))
        .route(endpoints::BARCHART, get(get_price_range_chart))
        .route(endpoints::PIECHART, get(get_category_chart))
        .route(endpoints::COMBINED, get(get_combined_report));

    let router = Router::new()
        .nest(endpoints::TRANSACTIONS, transaction_routes)
        .fallback(get_404_not_found)
        .with_state(state);

    match allowed_origin {
        Some(origin) => router.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET]),
        ),
        None => router,
    }
}

async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "Not found".to_owned(),
            details: None,
        }),
    )
        .into_response()
}
