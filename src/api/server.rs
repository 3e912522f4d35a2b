use crate::api::routes;
use crate::config::Shared;
use crate::solver::Solver;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub(super) struct AppState {
    pub config: Shared,
    pub group_name: Arc<String>,
    pub solver: Arc<dyn Solver>,
    pub shutdown: CancellationToken,
}

/// Bind the webhook API. The returned future serves until `shutdown` is cancelled, at which
/// point in-flight challenges are cancelled too.
///
/// # Errors
///
/// Returns an error if [`Config::api_bind_addr`][crate::config::Config::api_bind_addr] can't be
/// bound.
pub fn new(
    config: Shared,
    group_name: String,
    solver: Arc<dyn Solver>,
    shutdown: CancellationToken,
) -> anyhow::Result<impl Future<Output = hyper::Result<()>>> {
    let builder = axum::Server::try_bind(&config.api_bind_addr)?;
    let stop = shutdown.clone();
    let state = AppState {
        config,
        group_name: Arc::new(group_name),
        solver,
        shutdown,
    };
    Ok(builder
        .serve(routes::new(state).into_make_service())
        .with_graceful_shutdown(async move { stop.cancelled().await }))
}
