use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{
    config::Config,
    error::{ProxyError, Result},
    resolver::{PathResolver, Resolution},
};

#[derive(Clone)]
struct AppState {
    resolver: Arc<PathResolver>,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("err: {}\n", self),
        )
            .into_response()
    }
}

/// Build the router; every method and path goes to the same handler
pub fn router(resolver: Arc<PathResolver>) -> Router {
    Router::new()
        .fallback(handle_request)
        .with_state(AppState { resolver })
        .layer(TraceLayer::new_for_http())
}

/// Bind the configured address and serve until Ctrl-C or SIGTERM
pub async fn serve(config: &Config, resolver: Arc<PathResolver>) -> Result<()> {
    let listener = TcpListener::bind(config.listen_addr).await?;
    info!(
        addr = %listener.local_addr()?,
        source = %resolver.source().identifier(),
        "listening"
    );

    axum::serve(listener, router(resolver))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn handle_request(State(state): State<AppState>, uri: Uri) -> Response {
    let path = uri.path();
    info!(path, "request");

    match respond(&state.resolver, path).await {
        Ok(response) => response,
        Err(e) => {
            warn!(path, error = %e, "request failed");
            e.into_response()
        }
    }
}

async fn respond(resolver: &PathResolver, path: &str) -> Result<Response> {
    let response = match resolver.resolve(path).await? {
        Resolution::Proxy {
            download_url,
            content_type,
        } => {
            let body = resolver.open(&download_url).await?;
            (
                [(header::CONTENT_TYPE, content_type)],
                Body::from_stream(body),
            )
                .into_response()
        }
        Resolution::Redirect {
            download_url,
            content_type,
        } => {
            let mut response =
                (StatusCode::FOUND, [(header::LOCATION, download_url)]).into_response();
            if let Some(content_type) = content_type {
                response
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
            }
            response
        }
        Resolution::NotFound { .. } => (StatusCode::NOT_FOUND, "not found\n").into_response(),
    };
    Ok(response)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
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
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
