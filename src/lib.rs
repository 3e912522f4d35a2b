//! Record Crab
//!
//! An [RFC-8555][RFC-8555] [DNS-01] challenge solver that doesn't talk to a DNS provider at
//! all. Instead, each challenge is reconciled onto a declarative [`DnsRecord`] resource in a
//! [record store][record_store], leaving publication to whatever watches that store.
//!
//! The solver is served as an HTTP webhook (see [`api`]) registered under an API group taken
//! from the `GROUP_NAME` environment variable.
//!
//! [RFC-8555]: https://www.rfc-editor.org/rfc/rfc8555
//! [DNS-01]: https://www.rfc-editor.org/rfc/rfc8555#section-8.4
//!
#![warn(clippy::pedantic)]

pub mod api;
pub mod config;
pub mod error;
pub mod record_store;
pub mod solver;

pub use config::{Config, Shared, StoreConfig};
pub use record_store::{DnsRecord, FileRecordStore, InMemoryRecordStore};
pub use solver::{ChallengeRequest, RecordSolver, Solver};
