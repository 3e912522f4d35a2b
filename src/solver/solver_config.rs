use crate::error::Error;
use serde::Deserialize;
use serde_with::{serde_as, DefaultOnNull};
use std::collections::HashMap;

/// Per-issuer solver configuration, decoded from the challenge's `config` blob.
///
/// ```json
/// { "labels": { "dns.example.com/zone": "public" }, "extra": { "ttl": "60" } }
/// ```
///
/// `labels` are copied onto the record's metadata, `extra` onto its spec. Unknown fields are
/// ignored.
#[serde_as]
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SolverConfig {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub extra: HashMap<String, String>,
}

impl SolverConfig {
    /// Decode the raw config blob. No blob means the default (empty) config.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigDecode`] if `raw` is present but doesn't decode.
    pub fn load(raw: Option<&[u8]>) -> Result<Self, Error> {
        let Some(raw) = raw else {
            return Ok(Self::default());
        };
        // A JSON `null` blob is treated like a missing one.
        serde_json::from_slice::<Option<Self>>(raw)
            .map(Option::unwrap_or_default)
            .map_err(Error::ConfigDecode)
    }
}
