//! Router assembly and the serving loop.

use std::any::Any;

use axum::{
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{self, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::{authenticate, require_article_owner, resolve_article, translate_errors};
use crate::state::AppState;

/// Build the full application router.
///
/// Per-route chains run outermost first: authenticate, resolve, owner check.
/// The error translator wraps everything so every error body follows one policy.
pub fn router(state: AppState, security: &SecurityConfig) -> Router {
    let authenticated = from_fn_with_state(state.clone(), authenticate);
    let resolved = from_fn_with_state(state.clone(), resolve_article);

    let articles = get(public::list_articles)
        .merge(post(protected::create_article).route_layer(authenticated.clone()));

    let article = get(public::get_article).route_layer(resolved.clone()).merge(
        patch(protected::update_article)
            .delete(protected::delete_article)
            .route_layer(from_fn(require_article_owner))
            .route_layer(resolved)
            .route_layer(authenticated.clone()),
    );

    let mut router = Router::new()
        .route("/health", get(public::health))
        .route("/auth/signup", post(public::signup))
        .route("/auth/login", post(public::login))
        .route("/auth/me", get(protected::me).route_layer(authenticated))
        .route("/articles", articles)
        .route("/articles/:slug", article)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(from_fn_with_state(state.translator, translate_errors))
        .with_state(state);

    if let Some(cors) = cors_layer(security) {
        router = router.layer(cors);
    }

    router.layer(TraceLayer::new_for_http())
}

/// Serve until Ctrl-C or SIGTERM, then drain in-flight requests.
pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Listening on http://{}", addr);
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }

    if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(cors::Any)
            .allow_headers(cors::Any),
    )
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    tracing::error!("Handler panicked: {}", detail);
    ApiError::fatal(detail).into_response()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to register SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
