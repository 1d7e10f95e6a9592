use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::path::Path as FsPath;
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use tracing::{debug, error, info};

use crate::conductor::CurrentBar;
use crate::error::{Error, VoteError};
use crate::model::{Bar, BarId};
use crate::votes::VoteStore;

#[derive(Clone)]
pub struct AppState {
    pub current_bar: CurrentBar,
    pub votes: Arc<VoteStore>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteReceipt {
    pub id: BarId,
    pub votes: u32,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

struct ApiError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

impl From<VoteError> for ApiError {
    fn from(err: VoteError) -> Self {
        match err {
            VoteError::UnknownBar(_) => Self {
                status: StatusCode::NOT_FOUND,
                message: err.to_string(),
            },
        }
    }
}

pub fn router(state: AppState, static_dir: &FsPath) -> Router {
    Router::new()
        .route("/bar", get(current_bar_handler))
        .route("/vote/{bar_id}", get(vote_handler))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
}

async fn current_bar_handler(State(state): State<AppState>) -> Json<Bar> {
    Json(Bar::clone(&state.current_bar.load()))
}

async fn vote_handler(
    State(state): State<AppState>,
    Path(bar_id): Path<String>,
) -> Result<Json<VoteReceipt>, ApiError> {
    let id: BarId = bar_id.parse().map_err(|_| ApiError {
        status: StatusCode::BAD_REQUEST,
        message: format!("malformed bar id {:?}", bar_id),
    })?;
    let votes = state.votes.increment(id).inspect_err(|err| {
        debug!(error = %err, "vote rejected");
    })?;
    debug!(bar = %id, votes, "vote counted");
    Ok(Json(VoteReceipt { id, votes }))
}

pub async fn serve(addr: SocketAddr, state: AppState, static_dir: &FsPath) -> Result<(), Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state, static_dir))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    wait_for_signal(tokio::signal::ctrl_c()).await
}

/// Resolves when `signal` fires. If the signal handler cannot be installed
/// the server keeps running until the process is killed.
async fn wait_for_signal(signal: impl Future<Output = io::Result<()>>) {
    match signal.await {
        Ok(()) => info!("shutdown requested"),
        Err(err) => {
            error!(error = %err, "could not listen for ctrl-c, running until killed");
            std::future::pending::<()>().await
        }
    }
}
