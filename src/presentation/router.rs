use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::header::{self, HeaderName};
use axum::http::{HeaderValue, Method, Uri};
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::infrastructure::observability::{REQUEST_ID_HEADER, request_id_middleware};
use crate::presentation::config::{CorsSettings, Settings};
use crate::presentation::error::ApiError;
use crate::presentation::handlers::{
    account_balance_handler, account_transactions_handler, categorize_transaction_handler,
    create_account_handler, create_transaction_handler, delete_account_handler,
    delete_transaction_handler, generate_report_handler, get_account_handler,
    get_transaction_handler, health_handler, history_handler, list_accounts_handler,
    list_transactions_handler, process_command_handler, suggestions_handler,
    update_account_handler, update_transaction_handler, voice_command_handler,
};
use crate::presentation::middleware::{
    Feature, RateLimiter, feature_gate, rate_limit_middleware, require_auth,
};
use crate::presentation::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let settings = Arc::clone(&state.settings);
    let limiter = Arc::new(RateLimiter::from_settings(&settings.rate_limit));

    let api = Router::new()
        .nest("/commands", command_routes(&settings))
        .merge(accounting_routes())
        .layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler))
        .nest(&settings.api_prefix(), api)
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(settings.server.max_upload_bytes))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(cors_layer(&settings.cors))
        .with_state(state)
}

fn command_routes(settings: &Settings) -> Router<AppState> {
    let features = &settings.features;
    let voice = Feature::new("voice commands", features.voice_commands);
    let suggestions = Feature::new("suggestions", features.suggestions);
    let history = Feature::new("history", features.history);

    Router::new()
        .route("/process", post(process_command_handler))
        .route(
            "/voice",
            post(voice_command_handler)
                .route_layer(middleware::from_fn_with_state(voice, feature_gate)),
        )
        .route(
            "/suggestions",
            get(suggestions_handler)
                .route_layer(middleware::from_fn_with_state(suggestions, feature_gate)),
        )
        .route(
            "/history",
            get(history_handler)
                .route_layer(middleware::from_fn_with_state(history, feature_gate)),
        )
}

fn accounting_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/accounts",
            get(list_accounts_handler).post(create_account_handler),
        )
        .route(
            "/accounts/{id}",
            get(get_account_handler)
                .put(update_account_handler)
                .delete(delete_account_handler),
        )
        .route(
            "/accounts/{id}/transactions",
            get(account_transactions_handler),
        )
        .route("/accounts/{id}/balance", get(account_balance_handler))
        .route(
            "/transactions",
            get(list_transactions_handler).post(create_transaction_handler),
        )
        .route(
            "/transactions/{id}",
            get(get_transaction_handler)
                .put(update_transaction_handler)
                .delete(delete_transaction_handler),
        )
        .route(
            "/transactions/{id}/categorize",
            post(categorize_transaction_handler),
        )
        .route("/reports", post(generate_report_handler))
        .route_layer(middleware::from_fn(require_auth))
}

fn cors_layer(settings: &CorsSettings) -> CorsLayer {
    let origins = if settings.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            settings
                .allowed_origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        )
    };

    let methods: Vec<Method> = settings
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .allow_credentials(settings.allow_credentials)
}

async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("Route {} not found", uri.path()))
}
