use crate::api::api_error::APIError;
use crate::api::model::{ChallengeAction, ChallengePayload, ChallengeResponse};
use crate::api::server::AppState;
use crate::error::Error;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use serde_json::json;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub(super) fn new(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(health_check))
        .route("/apis/:group/v1alpha1/:solver", post(solve))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.api_timeout))
        .with_state(state)
}

#[allow(clippy::unused_async)]
async fn health_check() -> impl IntoResponse {
    Json(json!({"ok":"healthy"}))
}

async fn solve(
    State(state): State<AppState>,
    Path((group, solver)): Path<(String, String)>,
    WithRejection(Json(payload), _): WithRejection<Json<ChallengePayload>, APIError>,
) -> Result<Json<ChallengePayload>, APIError> {
    if group != state.group_name.as_str() || solver != state.solver.name() {
        tracing::debug!("rejected challenge for unknown solver \"{group}/{solver}\"");
        return Err(Error::UnknownSolver { group, solver }.into());
    }
    let Some(request) = payload.request else {
        return Err(Error::MissingChallengeRequest.into());
    };

    let ch = request.to_challenge();
    // Cancelled on process shutdown, or when the request future is dropped by the timeout.
    let cancel = state.shutdown.child_token();
    let _guard = cancel.clone().drop_guard();
    let res = match request.action {
        ChallengeAction::Present => state.solver.present(&ch, &cancel).await,
        ChallengeAction::CleanUp => state.solver.clean_up(&ch, &cancel).await,
    };

    Ok(Json(ChallengePayload {
        api_version: payload.api_version,
        kind: payload.kind,
        request: None,
        response: Some(ChallengeResponse::from_result(request.uid, &res)),
    }))
}
