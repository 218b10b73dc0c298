pub mod handlers;
pub mod state;
pub mod types;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{Next, from_fn_with_state},
    response::Response,
    routing::{get, patch, post, put},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use state::AppState;
use types::CurrentCaller;

/// Resolve `Authorization: Bearer <token>` into a [`CurrentCaller`]
///
/// Never rejects: a missing, malformed or unknown token yields an anonymous
/// caller, and the access policy answers `Unauthorized` where it matters.
async fn resolve_caller_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned);

    let caller = match token {
        Some(token) => {
            let caller = state.identity.current_user(&token).await;
            if caller.is_none() {
                tracing::debug!(provider = state.identity.name(), "Unknown bearer token");
            }
            caller
        }
        None => None,
    };

    request.extensions_mut().insert(CurrentCaller(caller));
    next.run(request).await
}

/// Build the `/api/v1` router
pub fn router(state: Arc<AppState>) -> Router {
    let user_routes = Router::new()
        .route("/rates", get(handlers::list_rates))
        .route("/rates/{country}", get(handlers::get_rate))
        .route("/quote", post(handlers::quote))
        .route(
            "/transactions",
            get(handlers::list_my_transactions).post(handlers::create_transaction),
        )
        .route("/transactions/{id}", get(handlers::get_transaction));

    let admin_routes = Router::new()
        .route("/transactions", get(handlers::list_all_transactions))
        .route(
            "/transactions/{id}/state",
            patch(handlers::set_transaction_state),
        )
        .route("/transactions/{id}/audit", get(handlers::audit_trail))
        .route("/rates/{country}", put(handlers::update_rate))
        .route("/stats", get(handlers::stats));

    let api = user_routes
        .nest("/admin", admin_routes)
        .layer(from_fn_with_state(state.clone(), resolve_caller_middleware))
        .route("/health", get(handlers::health_check));

    Router::new().nest("/api/v1", api).with_state(state)
}

/// Start HTTP Gateway server
pub async fn run_server(
    config: &GatewayConfig,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
