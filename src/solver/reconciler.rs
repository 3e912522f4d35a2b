//! Maps challenges onto [`DnsRecord`]s.
//!
//! `present` is an upsert keyed by `(resource namespace, derived record name)`: the record is
//! created when absent and overwritten in place otherwise. `clean_up` deletes whatever lives at
//! the same key, without checking its value. Two overlapping challenges for the same domain in
//! the same namespace therefore share (and race on) one record.
//!
//! Store calls are not retried here. Write conflicts reported by the store surface as
//! [`Error::StoreWrite`] and the caller retries the whole operation.

use crate::config::StoreConfig;
use crate::error::{Error, StoreError};
use crate::record_store::{self, DnsRecord, DynRecordStore, Lookup, ObjectKey, RecordSpec, TXT};
use crate::solver::name::{derive_record_name, published_name};
use crate::solver::{ChallengeRequest, Solver, SolverConfig};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Name the solver is registered under within its API group.
pub const SOLVER_NAME: &str = "recordcrab";

/// A [`Solver`] that publishes challenge keys as [`DnsRecord`]s in a [`RecordStore`].
///
/// [`RecordStore`]: crate::record_store::RecordStore
#[derive(Default, Clone)]
pub struct RecordSolver {
    store: Option<DynRecordStore>,
}

impl RecordSolver {
    /// A solver that still needs [`Solver::initialize`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A solver using an already connected store.
    pub fn with_store(store: DynRecordStore) -> Self {
        Self { store: Some(store) }
    }

    fn store(&self) -> Result<&DynRecordStore, Error> {
        self.store.as_ref().ok_or(Error::NotInitialized)
    }

    async fn upsert(&self, ch: &ChallengeRequest, cancel: &CancellationToken) -> Result<(), Error> {
        let key = record_key(ch);
        let config = SolverConfig::load(ch.config.as_deref())?;
        let store = self.store()?;

        let lookup = cancellable(cancel, store.get(&key), Error::StoreRead).await?;

        let spec = RecordSpec {
            name: published_name(&ch.resolved_fqdn).to_string(),
            record_type: TXT.to_string(),
            value: ch.key.clone(),
            extra: config.extra,
        };

        match lookup {
            Lookup::NotFound => {
                let record = DnsRecord::new(key, config.labels, spec);
                let created = cancellable(cancel, store.create(record), Error::StoreWrite).await?;
                tracing::debug!(
                    record = %created.key(),
                    uid = %created.metadata.uid,
                    "created DNS record"
                );
            }
            Lookup::Found(mut record) => {
                record.metadata.namespace = ch.resource_namespace.clone();
                record.metadata.labels = config.labels;
                record.spec = spec;
                let updated = cancellable(cancel, store.update(record), Error::StoreWrite).await?;
                tracing::debug!(
                    record = %updated.key(),
                    version = updated.metadata.resource_version,
                    "updated DNS record"
                );
            }
        }
        Ok(())
    }

    async fn remove(&self, ch: &ChallengeRequest, cancel: &CancellationToken) -> Result<(), Error> {
        let key = record_key(ch);
        let store = self.store()?;

        match cancellable(cancel, store.get(&key), Error::StoreRead).await? {
            Lookup::NotFound => {
                tracing::debug!(record = %key, "DNS record already gone");
                Ok(())
            }
            Lookup::Found(_) => {
                cancellable(cancel, store.delete(&key), Error::StoreDelete).await?;
                tracing::debug!(record = %key, "deleted DNS record");
                Ok(())
            }
        }
    }
}

#[async_trait::async_trait]
impl Solver for RecordSolver {
    fn name(&self) -> &str {
        SOLVER_NAME
    }

    async fn initialize(&mut self, store: &StoreConfig) -> Result<(), Error> {
        self.store = Some(record_store::connect(store).await?);
        tracing::info!("initialized DNS record solver");
        Ok(())
    }

    async fn present(
        &self,
        ch: &ChallengeRequest,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        tracing::info!(
            fqdn = %ch.resolved_fqdn,
            uid = %ch.uid,
            namespace = %ch.resource_namespace,
            "presenting DNS-01 challenge"
        );
        let res = self.upsert(ch, cancel).await;
        if let Err(err) = &res {
            tracing::error!(
                error = ?err,
                fqdn = %ch.resolved_fqdn,
                uid = %ch.uid,
                namespace = %ch.resource_namespace,
                "failed to present DNS-01 challenge"
            );
        }
        res
    }

    async fn clean_up(
        &self,
        ch: &ChallengeRequest,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        tracing::info!(
            fqdn = %ch.resolved_fqdn,
            uid = %ch.uid,
            namespace = %ch.resource_namespace,
            "cleaning up DNS-01 challenge"
        );
        let res = self.remove(ch, cancel).await;
        if let Err(err) = &res {
            tracing::error!(
                error = ?err,
                fqdn = %ch.resolved_fqdn,
                uid = %ch.uid,
                namespace = %ch.resource_namespace,
                "failed to clean up DNS record"
            );
        }
        res
    }
}

fn record_key(ch: &ChallengeRequest) -> ObjectKey {
    ObjectKey::new(
        &ch.resource_namespace,
        derive_record_name(&ch.resolved_fqdn),
    )
}

/// Run a store operation unless `cancel` fires first.
async fn cancellable<T>(
    cancel: &CancellationToken,
    op: impl Future<Output = Result<T, StoreError>>,
    wrap: fn(StoreError) -> Error,
) -> Result<T, Error> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(Error::Cancelled),
        res = op => res.map_err(wrap),
    }
}
