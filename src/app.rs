use std::net::SocketAddr;
use std::path::Path;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::images::services::{POST_IMAGES_DIR, PROFILE_IMAGES_DIR};
use crate::state::AppState;
use crate::{auth, comments, goals, guru, likes, posts, steps, users};

pub fn build_app(state: AppState) -> Router {
    let images_root = Path::new(&state.config.images_root).to_path_buf();

    Router::new()
        .merge(auth::router())
        .merge(users::router())
        .merge(posts::router())
        .merge(likes::router())
        .merge(comments::router())
        .merge(goals::router())
        .merge(steps::router())
        .merge(guru::router())
        .route("/health", get(|| async { "ok" }))
        .nest_service("/images", ServeDir::new(images_root.join(POST_IMAGES_DIR)))
        .nest_service(
            "/profile_images",
            ServeDir::new(images_root.join(PROFILE_IMAGES_DIR)),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
