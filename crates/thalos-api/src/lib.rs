//! ---
//! thalos_section: "05-networking-external-interfaces"
//! thalos_subsection: "module"
//! thalos_type: "source"
//! thalos_scope: "code"
//! thalos_description: "Networking API surface for external integrations."
//! thalos_version: "v1.0.0"
//! thalos_owner: "core"
//! ---
//! Request routing and the HTTP server in front of it.
//!
//! [`RequestRouter`] is transport independent and returns an [`Envelope`] for
//! every request. [`spawn_api_server`] feeds every HTTP request into the
//! router and replies with the envelope under the matching status code.

use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::Value;
use thalos_core::SharedOrchestrator;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

mod router;

pub use router::{status_for, Envelope, EnvelopeStatus, RequestRouter};

/// Handle to the running API server.
#[derive(Debug)]
pub struct ApiServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<()>>,
}

impl ApiServer {
    /// Bound address. Differs from the requested one when port 0 was used.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.task.await {
            Ok(result) => result,
            Err(err) => Err(err.into()),
        }
    }
}

/// Serve the orchestrator over HTTP until [`ApiServer::shutdown`] is called.
pub fn spawn_api_server(orchestrator: SharedOrchestrator, addr: SocketAddr) -> Result<ApiServer> {
    let router = Arc::new(RequestRouter::new(orchestrator));
    let app = Router::new()
        .fallback(dispatch)
        .with_state(router)
        .layer(TraceLayer::new_for_http());

    let listener = StdTcpListener::bind(addr)
        .with_context(|| format!("failed to bind API listener {addr}"))?;
    listener
        .set_nonblocking(true)
        .context("failed to configure API listener as non-blocking")?;
    let bound = listener
        .local_addr()
        .context("failed to read bound API address")?;
    let tcp_listener =
        TcpListener::from_std(listener).context("failed to create tokio listener")?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle: JoinHandle<Result<()>> = tokio::spawn(async move {
        info!(address = %bound, "api server listening");
        if let Err(err) = axum::serve(tcp_listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
        {
            error!(address = %bound, error = %err, "api server exited with error");
            return Err(err.into());
        }
        info!(address = %bound, "api server stopped");
        Ok(())
    });

    Ok(ApiServer {
        addr: bound,
        shutdown: Some(shutdown_tx),
        task: handle,
    })
}

async fn dispatch(
    State(router): State<Arc<RequestRouter>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let payload = if body.is_empty() {
        None
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(value) => Some(value),
            Err(err) => {
                let envelope = Envelope::error(
                    StatusCode::BAD_REQUEST,
                    "bad-request",
                    format!("request body is not valid JSON: {err}"),
                );
                return (envelope.status_code(), Json(envelope)).into_response();
            }
        }
    };

    let envelope = router.handle(&method, uri.path(), payload.as_ref());
    (envelope.status_code(), Json(envelope)).into_response()
}
