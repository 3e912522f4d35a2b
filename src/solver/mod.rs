//! ACME DNS-01 challenge solving.
//!
//! A [`Solver`] turns challenge requests into the lifecycle of a single
//! [`DnsRecord`][crate::record_store::DnsRecord]: [`Solver::present`] makes sure a `TXT` record
//! holding the challenge key exists, [`Solver::clean_up`] removes it again. Both are idempotent,
//! since the calling side retries them freely.
//!
//! The record's identity is derived from the challenge alone (see [`name::derive_record_name`])
//! so that repeated calls for the same challenge always land on the same record.

use crate::config::StoreConfig;
use crate::error::Error;
use tokio_util::sync::CancellationToken;

pub mod name;
pub mod reconciler;
pub mod solver_config;

pub use reconciler::RecordSolver;
pub use solver_config::SolverConfig;

/// A single DNS-01 challenge, as handed to a [`Solver`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChallengeRequest {
    /// Request id, only used to correlate log lines.
    pub uid: String,
    /// Fully qualified name the key must be published under, usually with a trailing dot.
    pub resolved_fqdn: String,
    /// The challenge key to publish.
    pub key: String,
    /// Namespace of the resource that requested the challenge. Records are created here.
    pub resource_namespace: String,
    /// Raw per-issuer solver config, see [`SolverConfig`].
    pub config: Option<Vec<u8>>,
}

/// The interface a DNS-01 solver implementation offers to the webhook.
#[async_trait::async_trait]
pub trait Solver: Send + Sync {
    /// Name of the solver, unique within its API group.
    fn name(&self) -> &str;

    /// One-time setup, called before any challenge is handled.
    async fn initialize(&mut self, store: &StoreConfig) -> Result<(), Error>;

    /// Publish the challenge key. Must tolerate being called repeatedly with the same request.
    async fn present(&self, ch: &ChallengeRequest, cancel: &CancellationToken)
        -> Result<(), Error>;

    /// Remove what [`Solver::present`] published. Succeeds if there's nothing to remove.
    async fn clean_up(
        &self,
        ch: &ChallengeRequest,
        cancel: &CancellationToken,
    ) -> Result<(), Error>;
}
