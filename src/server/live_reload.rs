// src/server/live_reload.rs

//! HTTP side of the dev server: static files, SSE reload stream, and HTML
//! injection of the reload client.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_stream::Stream;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tower_http::services::ServeDir;
use tracing::{debug, info, warn};

use crate::config::ServerSettings;
use crate::errors::{AssetflowError, Result};
use crate::server::inject::{CLIENT_SCRIPT, EVENTS_PATH, SCRIPT_PATH, inject_script};
use crate::server::{HubMessage, ReloadHub};
use crate::types::Reload;

/// Pages larger than this are served without the reload client.
const MAX_INJECT_BYTES: usize = 16 * 1024 * 1024;

/// A running dev server.
#[derive(Debug)]
pub struct LiveReloadServer {
    local_addr: SocketAddr,
    hub: ReloadHub,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl LiveReloadServer {
    /// Bind `settings.address()` and start serving `root`.
    pub async fn start(settings: &ServerSettings, root: impl Into<PathBuf>, hub: ReloadHub) -> Result<Self> {
        let address = settings.address();
        let listener = tokio::net::TcpListener::bind(&address)
            .await
            .map_err(|e| AssetflowError::Server(format!("cannot bind {address}: {e}")))?;
        let local_addr = listener.local_addr()?;

        let app = router(root.into(), hub.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        info!(url = %format!("http://{local_addr}"), "dev server listening");
        Ok(Self {
            local_addr,
            hub,
            shutdown: Some(shutdown_tx),
            handle,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn hub(&self) -> &ReloadHub {
        &self.hub
    }

    /// Close reload streams, stop accepting connections, and wait for the
    /// server task to finish.
    pub async fn stop(mut self) -> anyhow::Result<()> {
        self.hub.close();
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle
            .await
            .context("dev server task panicked")?
            .context("dev server failed")?;
        info!("dev server stopped");
        Ok(())
    }
}

/// Routes: the SSE stream, the client script, and the output tree for
/// everything else. HTML responses get the client injected.
pub fn router(root: PathBuf, hub: ReloadHub) -> Router {
    Router::new()
        .route(EVENTS_PATH, get(reload_events))
        .route(SCRIPT_PATH, get(client_script))
        .fallback_service(ServeDir::new(root).append_index_html_on_directories(true))
        .layer(axum::middleware::map_response(inject_live_reload))
        .with_state(hub)
}

async fn reload_events(
    State(hub): State<ReloadHub>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    debug!("live-reload client connected");
    let stream = BroadcastStream::new(hub.subscribe()).map_while(|msg| match msg {
        Ok(HubMessage::Reload(reload)) => Some(Ok(sse_event(reload))),
        Ok(HubMessage::Closed) => None,
        // A lagging client missed something; a full reload resynchronises it.
        Err(_) => Some(Ok(sse_event(Reload::Page))),
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn sse_event(reload: Reload) -> Event {
    Event::default()
        .event(reload.event_name())
        .data(reload.event_name())
}

async fn client_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        CLIENT_SCRIPT,
    )
}

async fn inject_live_reload(response: Response) -> Response {
    let is_html = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"));
    if !is_html {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_INJECT_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(error = %err, "could not buffer page for live-reload injection");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let page = inject_script(&String::from_utf8_lossy(&bytes));
    parts.headers.remove(header::CONTENT_LENGTH);
    parts
        .headers
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    Response::from_parts(parts, Body::from(page))
}
