//! Error types.

use crate::record_store::ObjectKey;

/// Error enumerates the possible solver error states.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when a challenge carries a per-request config blob that isn't a JSON object
    /// of the form `{"labels": {..}, "extra": {..}}`. Always raised before the store is touched.
    #[error("error decoding solver config")]
    ConfigDecode(#[source] serde_json::Error),

    /// Returned when fetching the current record fails for any reason other than absence.
    #[error("failed to read DNS record")]
    StoreRead(#[source] StoreError),

    /// Returned when creating or updating a record fails, including optimistic concurrency
    /// conflicts. The caller is expected to retry the whole `Present`.
    #[error("failed to write DNS record")]
    StoreWrite(#[source] StoreError),

    /// Returned when deleting an existing record fails.
    #[error("failed to delete DNS record")]
    StoreDelete(#[source] StoreError),

    /// Returned when the [record store][crate::record_store::connect] can't be initialized.
    /// Fatal at startup.
    #[error("failed to initialize record store")]
    Init(#[source] StoreError),

    /// Returned when the caller's cancellation token fires while a store operation is pending.
    #[error("operation cancelled")]
    Cancelled,

    /// Returned when `Present` or `CleanUp` is called before `Initialize`.
    #[error("solver has not been initialized")]
    NotInitialized,

    /// Returned at startup when the `GROUP_NAME` environment variable is unset or empty.
    #[error("GROUP_NAME must be specified")]
    MissingGroupName,

    /// Returned by the [HTTP API][crate::api] when a challenge is addressed to a group or
    /// solver name that this process doesn't serve.
    #[error("no solver \"{solver}\" registered in group \"{group}\"")]
    UnknownSolver { group: String, solver: String },

    /// Returned by the [HTTP API][crate::api] when a `ChallengePayload` carries no `request`.
    #[error("challenge payload has no request")]
    MissingChallengeRequest,

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when the process [`Config`][crate::config::Config] file isn't valid JSON.
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),
}

/// `StoreError` enumerates the failures a [`RecordStore`][crate::record_store::RecordStore]
/// implementation can report.
#[derive(thiserror::Error, Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum StoreError {
    #[error("record {0} not found")]
    NotFound(ObjectKey),

    #[error("record {0} already exists")]
    AlreadyExists(ObjectKey),

    /// The presence token or resource version carried by an update doesn't match the stored
    /// record, i.e. someone else wrote it first.
    #[error("conflicting write to record {key}: expected {expected}, found {actual}")]
    Conflict {
        key: ObjectKey,
        expected: String,
        actual: String,
    },

    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),
}
