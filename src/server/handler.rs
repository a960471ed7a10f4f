// Axum request handler — translates frame requests into sequencer lookups.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::engine::sequencer::{FrameSequencer, Outcome};
use crate::error::FrameError;

pub type SharedSequencer = Arc<FrameSequencer>;

const FRAME_INDEX_HEADER: &str = "x-frame-index";

/// Image ids under `_frame_relay/` are reserved for the server's own routes.
pub const STATS_PATH: &str = "/_frame_relay/stats";

pub struct FrameServer {
    addr: SocketAddr,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    task: JoinHandle<std::io::Result<()>>,
}

impl FrameServer {
    /// Bind `addr` and start serving frames, returning a handle.
    /// Port 0 picks a free port.
    pub async fn start(sequencer: SharedSequencer, addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let app = router(sequencer);

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            task,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Build a URL for requesting frames of `image_id`.
    pub fn url_for_image(&self, image_id: &str) -> String {
        format!("http://{}/{}", self.addr, image_id)
    }

    pub fn stats_url(&self) -> String {
        format!("http://{}{}", self.addr, STATS_PATH)
    }

    /// Wait for the serving loop to exit on its own.
    pub async fn wait(&mut self) -> Result<()> {
        (&mut self.task).await??;
        Ok(())
    }

    /// Shutdown the server gracefully and wait for in-flight requests.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.task.await??;
        Ok(())
    }
}

pub fn router(sequencer: SharedSequencer) -> Router {
    Router::new()
        .route(STATS_PATH, get(stats_handler))
        .route("/{*image_id}", get(frame_handler))
        .with_state(sequencer)
}

#[derive(Debug, Default, Deserialize)]
pub struct FrameQuery {
    /// Tracking key; defaults to the image id.
    key: Option<String>,
    show: Option<String>,
}

/// Parse a `show` query value. Unrecognised values count as "show".
fn parse_show(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}

/// GET /{image_id}?key=..&show=.. — serve the next frame.
async fn frame_handler(
    State(sequencer): State<SharedSequencer>,
    Path(image_id): Path<String>,
    Query(query): Query<FrameQuery>,
) -> Response {
    let show = query.show.as_deref().map(parse_show);
    debug!(
        "frame request image={} key={:?} show={:?}",
        image_id, query.key, show
    );

    match sequencer
        .lookup(&image_id, query.key.as_deref(), show)
        .await
    {
        Ok(frame) => {
            let status = match frame.outcome {
                Outcome::Unavailable => StatusCode::NOT_FOUND,
                _ => StatusCode::OK,
            };

            let mut resp_headers = HeaderMap::new();
            resp_headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(frame.media_type),
            );
            resp_headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
            if let Outcome::Frame { index, .. } = frame.outcome {
                resp_headers.insert(
                    HeaderName::from_static(FRAME_INDEX_HEADER),
                    HeaderValue::from(index),
                );
            }

            (status, resp_headers, frame.body).into_response()
        }
        Err(e) => {
            let status = match e {
                FrameError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            error!("frame request for {} failed: {}", image_id, e);
            (status, format!("error: {}", e)).into_response()
        }
    }
}

/// GET /_frame_relay/stats — engine counters as JSON.
async fn stats_handler(State(sequencer): State<SharedSequencer>) -> Response {
    Json(sequencer.stats()).into_response()
}
