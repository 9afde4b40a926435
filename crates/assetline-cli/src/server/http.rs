// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! HTTP server for development with live reload.
//!
//! Static files come straight from `dist`. HTML responses get a small client
//! script that connects to `/__livereload` and reacts to reload messages.

use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{State, WebSocketUpgrade},
    http::header,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use super::livereload::handle_websocket;
use super::registry::SessionRegistry;

/// Path of the live reload WebSocket endpoint.
pub const LIVERELOAD_PATH: &str = "/__livereload";

const LIVERELOAD_SCRIPT: &str = r#"
<script>
(function() {
    const protocol = window.location.protocol === 'https:' ? 'wss:' : 'ws:';
    const ws = new WebSocket(protocol + '//' + window.location.host + '/__livereload');
    ws.onmessage = function(event) {
        if (event.data === 'css') {
            document.querySelectorAll('link[rel="stylesheet"]').forEach(function(link) {
                const url = new URL(link.href);
                url.searchParams.set('v', Date.now());
                link.href = url.toString();
            });
        } else if (event.data === 'reload') {
            console.log('[assetline] Reloading...');
            window.location.reload();
        }
    };
    ws.onclose = function() {
        console.log('[assetline] Connection lost, attempting to reconnect...');
        setTimeout(function() {
            window.location.reload();
        }, 1000);
    };
    ws.onerror = function(error) {
        console.error('[assetline] WebSocket error:', error);
    };
})();
</script>
"#;

/// Builds the dev server routes over `dist`.
pub fn router(dist: &Path, registry: Arc<SessionRegistry>) -> Router {
    let static_files = ServeDir::new(dist).append_index_html_on_directories(true);

    Router::new()
        .route(LIVERELOAD_PATH, get(livereload_handler))
        .fallback_service(static_files)
        .layer(middleware::map_response(inject_livereload))
        .with_state(registry)
}

/// Binds `addr` and serves `dist` until Ctrl+C.
pub async fn create_server(
    addr: &str,
    dist: &Path,
    registry: Arc<SessionRegistry>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Serving {} on http://{}", dist.display(), listener.local_addr()?);
    serve(listener, router(dist, registry)).await
}

/// Serves a router on an already bound listener until Ctrl+C.
pub async fn serve(listener: TcpListener, app: Router) -> anyhow::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Could not listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(registry): State<Arc<SessionRegistry>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, registry))
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"))
}

async fn inject_livereload(response: Response) -> Response {
    if !is_html(&response) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Could not read HTML body: {}", e);
            return Response::from_parts(parts, Body::empty());
        }
    };

    let html = match String::from_utf8(bytes.to_vec()) {
        Ok(html) => inject_livereload_script(&html),
        Err(_) => return Response::from_parts(parts, Body::from(bytes)),
    };

    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(html))
}

fn inject_livereload_script(html: &str) -> String {
    let lower = html.to_ascii_lowercase();
    let pos = lower.rfind("</body>").or_else(|| lower.rfind("</html>"));
    match pos {
        Some(pos) => {
            let mut result = html.to_string();
            result.insert_str(pos, LIVERELOAD_SCRIPT);
            result
        }
        None => format!("{}{}", html, LIVERELOAD_SCRIPT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_goes_before_body_close() {
        let html = inject_livereload_script("<html><body><p>x</p></BODY></html>");
        let script = html.find("<script>").unwrap();
        assert!(script < html.find("</BODY>").unwrap());
        assert!(html.contains(LIVERELOAD_PATH));
    }

    #[test]
    fn test_script_appended_to_fragment() {
        let html = inject_livereload_script("<p>fragment</p>");
        assert!(html.starts_with("<p>fragment</p>"));
        assert!(html.trim_end().ends_with("</script>"));
    }
}
