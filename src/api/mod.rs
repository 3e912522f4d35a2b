//! HTTP API exposing the [solver][crate::solver] as a DNS-01 webhook.
//!
//! # API Endpoints
//!
//! ## `/healthcheck` (GET)
//!
//!   Returns HTTP 200 (OK) and the JSON body `{"ok":"healthy"}` when the service is operational.
//!
//! ## `/apis/{group}/v1alpha1/{solver}` (POST)
//!
//!   `group` must match the `GROUP_NAME` the process was started with and `solver` the
//!   solver's [name][crate::solver::Solver::name], otherwise HTTP 404 (Not Found) is returned.
//!
//!   Expects a JSON request body of the form:
//!
//!   ```json
//!   {
//!     "apiVersion": "acme.cert-manager.io/v1alpha1",
//!     "kind": "ChallengePayload",
//!     "request": {
//!       "uid": "6f3c...",
//!       "action": "Present",
//!       "type": "dns-01",
//!       "dnsName": "foo.example.com",
//!       "key": "XXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX",
//!       "resourceNamespace": "default",
//!       "resolvedFQDN": "_acme-challenge.foo.example.com.",
//!       "resolvedZone": "example.com.",
//!       "config": { "labels": { "zone": "public" } }
//!     }
//!   }
//!   ```
//!
//!   `action` is either `Present` or `CleanUp`. The response echoes `apiVersion` and `kind` and
//!   reports the outcome under `response`:
//!
//!   ```json
//!   { "uid": "6f3c...", "success": false, "status": { "status": "Failure", "message": "..." } }
//!   ```
//!
//!   Solver failures are reported with HTTP 200 and `"success": false`. The caller retries
//!   them. Malformed payloads get HTTP 400, 415 or 422.

mod api_error;
mod model;
mod routes;
pub mod server;

pub use server::new;
